use std::collections::HashMap;

use serde_json::{json, Map, Value};

use crate::domain::DomainError;

/// Value constraint for one schema field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    String,
    Boolean,
    Integer,
    /// Floating-point number with optional inclusive bounds
    Number { min: Option<f64>, max: Option<f64> },
    /// String restricted to a fixed set of values
    Enum(Vec<String>),
    StringArray,
}

impl FieldKind {
    fn type_name(&self) -> &'static str {
        match self {
            Self::String | Self::Enum(_) => "string",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Number { .. } => "number",
            Self::StringArray => "array",
        }
    }

    fn check(&self, field: &str, value: &Value, violations: &mut Vec<String>) {
        match self {
            Self::String => {
                if !value.is_string() {
                    violations.push(format!("field '{}' must be a string", field));
                }
            }
            Self::Boolean => {
                if !value.is_boolean() {
                    violations.push(format!("field '{}' must be a boolean", field));
                }
            }
            Self::Integer => {
                if !value.is_i64() && !value.is_u64() {
                    violations.push(format!("field '{}' must be an integer", field));
                }
            }
            Self::Number { min, max } => match value.as_f64() {
                Some(n) => {
                    if let Some(min) = min {
                        if n < *min {
                            violations.push(format!("field '{}' must be >= {}", field, min));
                        }
                    }
                    if let Some(max) = max {
                        if n > *max {
                            violations.push(format!("field '{}' must be <= {}", field, max));
                        }
                    }
                }
                None => violations.push(format!("field '{}' must be a number", field)),
            },
            Self::Enum(allowed) => match value.as_str() {
                Some(s) if allowed.iter().any(|a| a == s) => {}
                Some(s) => violations.push(format!(
                    "field '{}' must be one of [{}], got '{}'",
                    field,
                    allowed.join(", "),
                    s
                )),
                None => violations.push(format!("field '{}' must be a string", field)),
            },
            Self::StringArray => match value.as_array() {
                Some(items) => {
                    if items.iter().any(|i| !i.is_string()) {
                        violations.push(format!("field '{}' must contain only strings", field));
                    }
                }
                None => violations.push(format!("field '{}' must be an array", field)),
            },
        }
    }

    fn to_json_schema(&self) -> Value {
        match self {
            Self::Enum(allowed) => json!({"type": "string", "enum": allowed}),
            Self::Number { min, max } => {
                let mut schema = Map::new();
                schema.insert("type".into(), json!("number"));
                if let Some(min) = min {
                    schema.insert("minimum".into(), json!(min));
                }
                if let Some(max) = max {
                    schema.insert("maximum".into(), json!(max));
                }
                Value::Object(schema)
            }
            Self::StringArray => json!({"type": "array", "items": {"type": "string"}}),
            other => json!({"type": other.type_name()}),
        }
    }
}

/// One field of a structured-output contract
#[derive(Debug, Clone)]
pub struct FieldDef {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub description: String,
}

impl FieldDef {
    pub fn required(name: impl Into<String>, kind: FieldKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            description: description.into(),
        }
    }

    pub fn optional(name: impl Into<String>, kind: FieldKind, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            description: description.into(),
        }
    }
}

/// A named structured-output contract
#[derive(Debug, Clone)]
pub struct SchemaDef {
    name: String,
    description: String,
    fields: Vec<FieldDef>,
}

impl SchemaDef {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            fields: Vec::new(),
        }
    }

    pub fn field(mut self, field: FieldDef) -> Self {
        self.fields.push(field);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Validate a value against this contract.
    ///
    /// All violations are collected into a single error message. Unknown
    /// extra fields are tolerated; models routinely add them.
    pub fn validate(&self, value: &Value) -> Result<(), DomainError> {
        let object = match value.as_object() {
            Some(object) => object,
            None => {
                return Err(DomainError::schema_violation(
                    &self.name,
                    "expected a JSON object",
                ));
            }
        };

        let mut violations = Vec::new();
        for field in &self.fields {
            match object.get(&field.name) {
                Some(Value::Null) | None if field.required => {
                    violations.push(format!("missing required field '{}'", field.name));
                }
                Some(Value::Null) | None => {}
                Some(value) => field.kind.check(&field.name, value, &mut violations),
            }
        }

        if violations.is_empty() {
            Ok(())
        } else {
            Err(DomainError::schema_violation(&self.name, violations.join("; ")))
        }
    }

    /// Render the provider-facing JSON Schema for this contract
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::new();

        for field in &self.fields {
            let mut prop = field.kind.to_json_schema();
            if let Some(obj) = prop.as_object_mut() {
                obj.insert("description".into(), json!(field.description));
            }
            properties.insert(field.name.clone(), prop);
            if field.required {
                required.push(field.name.clone());
            }
        }

        json!({
            "type": "object",
            "description": self.description,
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}

/// Registry of named structured-output contracts
#[derive(Debug, Default)]
pub struct SchemaRegistry {
    schemas: HashMap<String, SchemaDef>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-loaded with the contracts the built-in workflows use
    pub fn with_defaults() -> Self {
        use super::names;

        let mut registry = Self::new();

        registry.register(
            SchemaDef::new(
                names::EVENT_CLASSIFICATION,
                "Whether the input describes a calendar event request",
            )
            .field(FieldDef::required(
                "request_type",
                FieldKind::Enum(vec!["calendar-event".into(), "other".into()]),
                "Category of the request",
            ))
            .field(FieldDef::required(
                "confidence_score",
                FieldKind::Number { min: Some(0.0), max: Some(1.0) },
                "Confidence in the classification",
            ))
            .field(FieldDef::required(
                "description",
                FieldKind::String,
                "Cleaned-up description of the request",
            )),
        );

        registry.register(
            SchemaDef::new(names::EVENT_DETAILS, "Concrete details of a calendar event")
                .field(FieldDef::required("name", FieldKind::String, "Event title"))
                .field(FieldDef::required(
                    "date",
                    FieldKind::String,
                    "ISO 8601 date and time of the event",
                ))
                .field(FieldDef::optional(
                    "duration_minutes",
                    FieldKind::Integer,
                    "Expected duration in minutes",
                ))
                .field(FieldDef::required(
                    "participants",
                    FieldKind::StringArray,
                    "Names of the participants",
                )),
        );

        registry.register(
            SchemaDef::new(
                names::EVENT_CONFIRMATION,
                "Natural-language confirmation of a created event",
            )
            .field(FieldDef::required(
                "confirmation_message",
                FieldKind::String,
                "Message confirming the event to the user",
            )),
        );

        registry.register(
            SchemaDef::new(
                names::EVENT_MODIFICATION,
                "A requested change to an existing event",
            )
            .field(FieldDef::required(
                "target_event",
                FieldKind::String,
                "Which event the user wants to change",
            ))
            .field(FieldDef::required(
                "requested_change",
                FieldKind::String,
                "What should change about it",
            )),
        );

        registry.register(
            SchemaDef::new(names::ROUTE_DECISION, "Which sub-flow should handle the input")
                .field(FieldDef::required(
                    "category",
                    FieldKind::Enum(vec![
                        "new-event".into(),
                        "modify-event".into(),
                        "other".into(),
                    ]),
                    "Branch label for the request",
                ))
                .field(FieldDef::required(
                    "confidence_score",
                    FieldKind::Number { min: Some(0.0), max: Some(1.0) },
                    "Confidence in the routing decision",
                ))
                .field(FieldDef::required(
                    "reasoning",
                    FieldKind::String,
                    "Why this branch was chosen",
                )),
        );

        registry.register(
            SchemaDef::new(
                names::SECURITY_ASSESSMENT,
                "Whether the input attempts prompt injection or abuse",
            )
            .field(FieldDef::required(
                "is_harmful",
                FieldKind::Boolean,
                "True when the input should be refused",
            ))
            .field(FieldDef::required(
                "threat_level",
                FieldKind::Enum(vec![
                    "none".into(),
                    "low".into(),
                    "medium".into(),
                    "high".into(),
                ]),
                "Severity of the detected threat",
            ))
            .field(FieldDef::required(
                "description",
                FieldKind::String,
                "Short rationale for the assessment",
            )),
        );

        registry.register(
            SchemaDef::new(names::WEATHER_REPORT, "Current weather at a location")
                .field(FieldDef::required("location", FieldKind::String, "Resolved place name"))
                .field(FieldDef::required(
                    "temperature_celsius",
                    FieldKind::Number { min: None, max: None },
                    "Current temperature in degrees Celsius",
                ))
                .field(FieldDef::optional(
                    "conditions",
                    FieldKind::String,
                    "Human-readable conditions summary",
                )),
        );

        registry.register(
            SchemaDef::new(names::KB_ANSWER, "Result of a knowledge-base lookup")
                .field(FieldDef::required(
                    "found",
                    FieldKind::Boolean,
                    "Whether any record matched",
                ))
                .field(FieldDef::optional("answer", FieldKind::String, "Text of the matched record"))
                .field(FieldDef::optional(
                    "matched_question",
                    FieldKind::String,
                    "Question of the matched record",
                )),
        );

        registry
    }

    pub fn register(&mut self, schema: SchemaDef) {
        self.schemas.insert(schema.name().to_string(), schema);
    }

    pub fn get(&self, name: &str) -> Option<&SchemaDef> {
        self.schemas.get(name)
    }

    /// Look up a schema, failing with a configuration error when absent
    pub fn require(&self, name: &str) -> Result<&SchemaDef, DomainError> {
        self.get(name).ok_or_else(|| {
            DomainError::configuration(format!("schema '{}' is not registered", name))
        })
    }

    pub fn names(&self) -> Vec<&str> {
        self.schemas.keys().map(String::as_str).collect()
    }
}
