//! Workflow orchestration: strategy dispatch, run context, tool loop

mod entity;
mod orchestrator;
mod run;
mod tool_loop;

pub use entity::WorkflowKind;
pub use orchestrator::{OrchestratorConfig, WorkflowOrchestrator};
pub use run::{OutcomeKind, TraceStep, WorkflowOutcome, WorkflowRun};
pub use tool_loop::ToolExecutionLoop;
