//! Query-string and path-placeholder building for outbound requests

use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use thiserror::Error;

/// Render a scalar argument the way it appears in a URL
fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Query-string entries; absent (`None`/null) values are never added
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an argument.
    ///
    /// `None` is dropped, arrays repeat the key once per element, objects are
    /// sent as compact JSON.
    pub fn push<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => self.push_value(name, &value),
            Err(e) => tracing::warn!("Dropping query parameter {}: {}", name, e),
        }
    }

    /// Add an already-converted JSON argument
    pub fn push_value(&mut self, name: &str, value: &Value) {
        match value {
            Value::Null => {}
            Value::Array(items) => {
                for item in items.iter().filter(|v| !v.is_null()) {
                    self.pairs.push((name.to_string(), render_scalar(item)));
                }
            }
            other => self.pairs.push((name.to_string(), render_scalar(other))),
        }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

/// A path argument that would address a different endpoint once the URL is
/// normalised
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("path parameter '{name}' cannot be {value:?}")]
pub struct InvalidPathValue {
    pub name: String,
    pub value: String,
}

/// Encode a value as exactly one path segment
fn encode_segment<'a>(name: &str, value: &'a str) -> Result<Cow<'a, str>, InvalidPathValue> {
    // Dot segments are resolved by URL parsers even when percent-encoded
    if value == "." || value == ".." {
        return Err(InvalidPathValue {
            name: name.to_string(),
            value: value.to_string(),
        });
    }
    Ok(urlencoding::encode(value))
}

/// Values substituted into `{name}` placeholders of a URL template
#[derive(Debug, Clone, Default)]
pub struct PathParams {
    values: Vec<(String, String)>,
}

impl PathParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a placeholder name to a value
    pub fn push<T: Serialize + ?Sized>(&mut self, name: &str, value: &T) {
        match serde_json::to_value(value) {
            Ok(value) => self.push_value(name, &value),
            Err(e) => tracing::warn!("Dropping path parameter {}: {}", name, e),
        }
    }

    /// Bind a placeholder name to a JSON value
    pub fn push_value(&mut self, name: &str, value: &Value) {
        self.values.push((name.to_string(), render_scalar(value)));
    }

    /// Substitute bound placeholders by exact name in one pass.
    ///
    /// Each value is percent-encoded as a single segment, so `/`, `?` and `#`
    /// stay inside it. Placeholders without a value are left as written.
    pub fn render(&self, template: &str) -> Result<String, InvalidPathValue> {
        let mut url = String::with_capacity(template.len());
        let mut rest = template;

        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start..].find('}') else {
                break;
            };
            let name = &rest[start + 1..start + len];
            url.push_str(&rest[..start]);
            match self.values.iter().find(|(n, _)| n == name) {
                Some((_, value)) => url.push_str(&encode_segment(name, value)?),
                None => url.push_str(&rest[start..=start + len]),
            }
            rest = &rest[start + len + 1..];
        }
        url.push_str(rest);

        Ok(url)
    }
}
