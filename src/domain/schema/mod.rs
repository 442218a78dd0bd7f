//! Named structured-output contracts and their validation rules

mod extraction;
mod registry;

pub use extraction::StructuredExtraction;
pub use registry::{FieldDef, FieldKind, SchemaDef, SchemaRegistry};

/// Schema names registered by default
pub mod names {
    pub const EVENT_CLASSIFICATION: &str = "event-classification";
    pub const EVENT_DETAILS: &str = "event-details";
    pub const EVENT_CONFIRMATION: &str = "event-confirmation";
    pub const EVENT_MODIFICATION: &str = "event-modification";
    pub const ROUTE_DECISION: &str = "route-decision";
    pub const SECURITY_ASSESSMENT: &str = "security-assessment";
    pub const WEATHER_REPORT: &str = "weather-report";
    pub const KB_ANSWER: &str = "kb-answer";
}
