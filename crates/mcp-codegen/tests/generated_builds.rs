//! Generated servers must build against the `mcp-server` runtime

use std::path::{Path, PathBuf};
use std::process::Command;

use mcp_codegen::{ServerAssembler, Variant};
use openapi_parser::OpenApiParser;

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .unwrap()
        .to_path_buf()
}

/// Manifest of a throwaway crate with one binary per variant
fn manifest(runtime: &Path) -> String {
    let mut manifest = format!(
        r#"[package]
name = "generated-servers"
version = "0.0.0"
edition = "2021"
publish = false

[workspace]

[dependencies]
mcp-server = {{ path = {runtime:?} }}
serde = {{ version = "1", features = ["derive"] }}
tokio = {{ version = "1", features = ["full"] }}
anyhow = "1"
tracing-subscriber = {{ version = "0.3", features = ["env-filter"] }}
"#
    );
    for variant in Variant::ALL {
        manifest.push_str(&format!(
            "\n[[bin]]\nname = \"{0}\"\npath = \"src/{0}.rs\"\n",
            variant.as_str()
        ));
    }
    manifest
}

#[test]
fn generated_variants_compile() {
    let root = workspace_root();
    let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/financial_reports.yaml");
    let spec = OpenApiParser::load_file(&fixture).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let src = dir.path().join("src");
    let assembler = ServerAssembler::new().unwrap();
    for variant in Variant::ALL {
        assembler
            .write(&spec, variant, &fixture.display().to_string(), &src)
            .unwrap();
    }

    let runtime = root.join("crates/mcp-server");
    std::fs::write(dir.path().join("Cargo.toml"), manifest(&runtime)).unwrap();
    // Pin the scratch crate to the versions the workspace already resolved
    let lock = root.join("Cargo.lock");
    if lock.exists() {
        std::fs::copy(&lock, dir.path().join("Cargo.lock")).unwrap();
    }

    // A separate target dir keeps clear of the lock held by the running test build
    let target = std::env::var_os("CARGO_TARGET_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|| root.join("target"))
        .join("generated-servers");

    let output = Command::new(env!("CARGO"))
        .current_dir(dir.path())
        .args(["check", "--offline", "--bins", "--quiet"])
        .env("CARGO_TARGET_DIR", &target)
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "generated servers failed to compile:\n{}",
        String::from_utf8_lossy(&output.stderr)
    );
}
