use serde_json::{Map, Value};

use crate::domain::DomainError;

/// Normalized tool-call arguments.
///
/// The model may emit arguments as a keyed object, a positional array, or a
/// JSON-encoded string of either; older providers also send bare null for
/// zero-argument calls. All shapes are normalized here, at the catalog
/// boundary, so executors never branch on wire format.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolArguments {
    Named(Map<String, Value>),
    Positional(Vec<Value>),
}

impl ToolArguments {
    pub fn empty() -> Self {
        Self::Named(Map::new())
    }

    pub fn from_value(raw: Value) -> Result<Self, DomainError> {
        match raw {
            Value::Object(map) => Ok(Self::Named(map)),
            Value::Array(items) => Ok(Self::Positional(items)),
            Value::Null => Ok(Self::empty()),
            Value::String(encoded) => {
                let inner: Value = serde_json::from_str(&encoded).map_err(|e| {
                    DomainError::invalid_input(format!("unparseable tool arguments: {}", e))
                })?;
                // One level of string encoding is the provider convention;
                // refuse to recurse further.
                match inner {
                    Value::Object(map) => Ok(Self::Named(map)),
                    Value::Array(items) => Ok(Self::Positional(items)),
                    Value::Null => Ok(Self::empty()),
                    other => Err(DomainError::invalid_input(format!(
                        "tool arguments must be an object or array, got {}",
                        value_kind(&other)
                    ))),
                }
            }
            other => Err(DomainError::invalid_input(format!(
                "tool arguments must be an object or array, got {}",
                value_kind(&other)
            ))),
        }
    }

    /// Fetch an argument by name, falling back to its declared position
    pub fn get(&self, name: &str, position: usize) -> Option<&Value> {
        match self {
            Self::Named(map) => map.get(name),
            Self::Positional(items) => items.get(position),
        }
    }

    /// Required string argument
    pub fn require_str(&self, name: &str, position: usize) -> Result<&str, DomainError> {
        self.get(name, position)
            .and_then(Value::as_str)
            .ok_or_else(|| {
                DomainError::invalid_input(format!("missing string argument '{}'", name))
            })
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Self::Named(map) => map.is_empty(),
            Self::Positional(items) => items.is_empty(),
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
