//! Per-request execution context and the terminal result it produces

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::llm::{Message, Transcript, Usage};
use crate::domain::schema::StructuredExtraction;

/// One step of the debug trace, in execution order
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceStep {
    pub index: usize,
    pub description: String,
    pub payload: Value,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OutcomeKind {
    /// Full strategy completed
    Completed,
    /// Classification confidence below the gate; dependent stages skipped
    LowConfidence,
    /// A mid-chain stage failed; the furthest-reached artifact is returned
    Partial,
    /// Input failed the security screen
    Refused,
}

/// Terminal result of one orchestration run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowOutcome {
    pub outcome: OutcomeKind,
    pub message: String,
    /// Structured artifacts keyed by stage name
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub artifacts: BTreeMap<String, StructuredExtraction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<Usage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub calendar_link: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<TraceStep>,
    pub completed_at: DateTime<Utc>,
}

/// Mutable context threaded through one end-to-end request.
///
/// Owned exclusively by the orchestrator for the duration of one run; never
/// shared across concurrent requests.
#[derive(Debug, Default)]
pub struct WorkflowRun {
    transcript: Transcript,
    artifacts: BTreeMap<String, StructuredExtraction>,
    usage: Usage,
    iterations: u32,
    trace: Vec<TraceStep>,
    confidence_score: Option<f64>,
    calendar_link: Option<String>,
}

impl WorkflowRun {
    /// Start a run from (possibly malformed) prior history.
    ///
    /// Malformed history is normalized to an empty transcript.
    pub fn new(prior: Vec<Message>) -> Self {
        Self {
            transcript: Transcript::from_prior(prior),
            ..Self::default()
        }
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn transcript_mut(&mut self) -> &mut Transcript {
        &mut self.transcript
    }

    /// Store a stage's validated artifact and absorb its usage
    pub fn record_artifact(&mut self, stage: impl Into<String>, extraction: StructuredExtraction) {
        if let Some(usage) = extraction.usage {
            self.usage.accumulate(&usage);
        }
        self.artifacts.insert(stage.into(), extraction);
    }

    pub fn artifact(&self, stage: &str) -> Option<&StructuredExtraction> {
        self.artifacts.get(stage)
    }

    pub fn absorb_usage(&mut self, usage: Option<Usage>) {
        if let Some(usage) = usage {
            self.usage.accumulate(&usage);
        }
    }

    /// Bump the iteration counter and return its new value
    pub fn next_iteration(&mut self) -> u32 {
        self.iterations += 1;
        self.iterations
    }

    pub fn iterations(&self) -> u32 {
        self.iterations
    }

    pub fn trace_step(&mut self, description: impl Into<String>, payload: Value) {
        let index = self.trace.len();
        self.trace.push(TraceStep {
            index,
            description: description.into(),
            payload,
        });
    }

    pub fn set_confidence_score(&mut self, score: f64) {
        self.confidence_score = Some(score);
    }

    pub fn set_calendar_link(&mut self, link: impl Into<String>) {
        self.calendar_link = Some(link.into());
    }

    /// Consume the run into its terminal outcome
    pub fn finish(self, outcome: OutcomeKind, message: impl Into<String>) -> WorkflowOutcome {
        let usage = if self.usage == Usage::default() {
            None
        } else {
            Some(self.usage)
        };

        WorkflowOutcome {
            outcome,
            message: message.into(),
            artifacts: self.artifacts,
            usage,
            confidence_score: self.confidence_score,
            calendar_link: self.calendar_link,
            trace: self.trace,
            completed_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::schema::{names, SchemaRegistry};
    use serde_json::json;

    fn extraction() -> StructuredExtraction {
        let registry = SchemaRegistry::with_defaults();
        StructuredExtraction::validated(
            registry.get(names::KB_ANSWER).unwrap(),
            json!({"found": true, "answer": "yes"}),
        )
        .unwrap()
        .with_usage(Usage::new(12, 4))
    }

    #[test]
    fn test_artifacts_accumulate_usage() {
        let mut run = WorkflowRun::new(vec![]);
        run.record_artifact("lookup", extraction());
        run.absorb_usage(Some(Usage::new(8, 2)));

        let outcome = run.finish(OutcomeKind::Completed, "done");
        let usage = outcome.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 20);
        assert_eq!(usage.completion_tokens, 6);
        assert!(outcome.artifacts.contains_key("lookup"));
    }

    #[test]
    fn test_zero_usage_serializes_as_absent() {
        let run = WorkflowRun::new(vec![]);
        let outcome = run.finish(OutcomeKind::Completed, "done");
        assert!(outcome.usage.is_none());

        let json = serde_json::to_string(&outcome).unwrap();
        assert!(!json.contains("usage"));
        assert!(!json.contains("trace"));
    }

    #[test]
    fn test_trace_steps_are_indexed_in_order() {
        let mut run = WorkflowRun::new(vec![]);
        run.trace_step("classify", json!({"confidence": 0.9}));
        run.trace_step("extract", json!({"name": "standup"}));

        let outcome = run.finish(OutcomeKind::Completed, "done");
        assert_eq!(outcome.trace.len(), 2);
        assert_eq!(outcome.trace[0].index, 0);
        assert_eq!(outcome.trace[0].description, "classify");
        assert_eq!(outcome.trace[1].index, 1);
    }

    #[test]
    fn test_iteration_counter() {
        let mut run = WorkflowRun::new(vec![]);
        assert_eq!(run.next_iteration(), 1);
        assert_eq!(run.next_iteration(), 2);
        assert_eq!(run.iterations(), 2);
    }

    #[test]
    fn test_prior_history_feeds_transcript() {
        let run = WorkflowRun::new(vec![Message::user("hi"), Message::assistant("hello")]);
        assert_eq!(run.transcript().len(), 2);
    }
}
