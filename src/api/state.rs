//! Application state for shared services

use std::sync::Arc;

use crate::domain::schema::SchemaRegistry;
use crate::domain::tool::ToolCatalog;
use crate::domain::workflow::WorkflowOrchestrator;

/// Shared handles cloned into every request handler
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<WorkflowOrchestrator>,
    pub registry: Arc<SchemaRegistry>,
    pub catalog: Arc<ToolCatalog>,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<WorkflowOrchestrator>,
        registry: Arc<SchemaRegistry>,
        catalog: Arc<ToolCatalog>,
    ) -> Self {
        Self {
            orchestrator,
            registry,
            catalog,
        }
    }
}
