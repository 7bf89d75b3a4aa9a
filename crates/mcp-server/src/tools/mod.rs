//! Tool generation and execution

mod binding;
mod executor;
mod generator;
mod registry;

pub use binding::{bind_arguments, BindError, BoundArguments};
pub use executor::{OperationTool, ToolExecutor};
pub use generator::ToolGenerator;
pub use registry::{FnTool, ToolHandler, ToolRegistry};
