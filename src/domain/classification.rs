//! Input classification with a fixed confidence gate
//!
//! One classification attempt per run; a provider failure here is fatal to
//! the run, and a sub-threshold confidence must halt dependent stages.

use std::sync::Arc;

use tracing::debug;

use crate::domain::llm::{Message, ModelGateway};
use crate::domain::schema::{SchemaRegistry, StructuredExtraction};
use crate::domain::DomainError;

/// Category, confidence, and rationale extracted from raw input
#[derive(Debug, Clone)]
pub struct Classification {
    pub category: String,
    pub confidence: f64,
    pub rationale: String,
    pub extraction: StructuredExtraction,
}

/// Classifies raw input against a registered contract.
///
/// The contract's category and rationale field names are configurable since
/// different stages reuse this shape under different names.
#[derive(Debug)]
pub struct ClassificationStage {
    gateway: Arc<dyn ModelGateway>,
    registry: Arc<SchemaRegistry>,
    schema_name: String,
    category_field: String,
    rationale_field: String,
    threshold: f64,
}

impl ClassificationStage {
    pub fn new(
        gateway: Arc<dyn ModelGateway>,
        registry: Arc<SchemaRegistry>,
        schema_name: impl Into<String>,
        category_field: impl Into<String>,
        rationale_field: impl Into<String>,
        threshold: f64,
    ) -> Self {
        Self {
            gateway,
            registry,
            schema_name: schema_name.into(),
            category_field: category_field.into(),
            rationale_field: rationale_field.into(),
            threshold,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Single classification attempt; never retried
    pub async fn classify(
        &self,
        model: &str,
        system_prompt: &str,
        input: &str,
    ) -> Result<Classification, DomainError> {
        let schema = self.registry.require(&self.schema_name)?;
        let messages = vec![Message::system(system_prompt), Message::user(input)];

        let extraction = self
            .gateway
            .request_structured(model, messages, schema)
            .await?;

        let category = extraction
            .str_field(&self.category_field)
            .ok_or_else(|| {
                DomainError::schema_violation(
                    &self.schema_name,
                    format!("missing category field '{}'", self.category_field),
                )
            })?
            .to_string();

        let confidence = extraction.confidence_score().ok_or_else(|| {
            DomainError::schema_violation(&self.schema_name, "missing field 'confidence_score'")
        })?;

        let rationale = extraction
            .str_field(&self.rationale_field)
            .unwrap_or_default()
            .to_string();

        debug!(
            schema = %self.schema_name,
            category = %category,
            confidence,
            "classified input"
        );

        Ok(Classification {
            category,
            confidence,
            rationale,
            extraction,
        })
    }

    pub fn meets_threshold(&self, classification: &Classification) -> bool {
        classification.confidence >= self.threshold
    }

    /// Gate for dependent stages: below-threshold confidence is a designed
    /// terminal outcome, surfaced as `LowConfidence`
    pub fn require_confident(&self, classification: &Classification) -> Result<(), DomainError> {
        if self.meets_threshold(classification) {
            Ok(())
        } else {
            Err(DomainError::low_confidence(
                classification.confidence,
                self.threshold,
            ))
        }
    }
}
