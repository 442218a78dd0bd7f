use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::registry::SchemaDef;
use crate::domain::llm::Usage;
use crate::domain::DomainError;

/// A named, schema-validated record produced by one model call.
///
/// Construction goes through [`StructuredExtraction::validated`], so a value
/// of this type always conformed to its contract at creation time. The same
/// contract re-validates identically on read; there is no silent coercion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredExtraction {
    pub schema: String,
    pub value: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
}

impl StructuredExtraction {
    /// Validate `value` against `schema` and wrap it
    pub fn validated(schema: &SchemaDef, value: Value) -> Result<Self, DomainError> {
        schema.validate(&value)?;
        Ok(Self {
            schema: schema.name().to_string(),
            value,
            usage: None,
        })
    }

    pub fn with_usage(mut self, usage: Usage) -> Self {
        self.usage = Some(usage);
        self
    }

    /// Re-check this extraction against its contract (consumer side)
    pub fn revalidate(&self, schema: &SchemaDef) -> Result<(), DomainError> {
        if schema.name() != self.schema {
            return Err(DomainError::schema_violation(
                schema.name(),
                format!("extraction was produced for schema '{}'", self.schema),
            ));
        }
        schema.validate(&self.value)
    }

    /// Deserialize the validated payload into a typed record
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, DomainError> {
        serde_json::from_value(self.value.clone())
            .map_err(|e| DomainError::schema_violation(&self.schema, e.to_string()))
    }

    pub fn field(&self, name: &str) -> Option<&Value> {
        self.value.get(name)
    }

    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(Value::as_str)
    }

    /// The model-reported confidence, when the contract carries one
    pub fn confidence_score(&self) -> Option<f64> {
        self.field("confidence_score").and_then(Value::as_f64)
    }
}
