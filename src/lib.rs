//! Agent Workflow Gateway
//!
//! LLM agent-workflow orchestration patterns behind an HTTP API:
//! - single-call: one free-text completion
//! - chained: classification gate, detail extraction, confirmation
//! - routed: classification picks a specialized branch
//! - parallel: concurrent validation calls joined fail-fast
//! - tool-calling: bounded loop over model-requested tool invocations

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::AppState;
use domain::schema::SchemaRegistry;
use domain::tool::ToolCatalog;
use domain::workflow::WorkflowOrchestrator;
use infrastructure::llm::{HttpClient, OpenAiGateway};
use infrastructure::tools::{KnowledgeBaseTool, WeatherTool};

/// Wire up the gateway, registry, tool catalog, and orchestrator
pub fn create_app_state(config: &AppConfig) -> anyhow::Result<AppState> {
    let http_client = HttpClient::with_timeout(Duration::from_secs(config.provider.timeout_secs))?;

    let gateway = Arc::new(OpenAiGateway::with_base_url(
        http_client.clone(),
        config.provider.api_key.clone(),
        config.provider.base_url.clone(),
    ));

    let registry = Arc::new(SchemaRegistry::with_defaults());

    let mut catalog = ToolCatalog::new();
    catalog.register(Arc::new(WeatherTool::new(Arc::new(http_client))));
    catalog.register(Arc::new(KnowledgeBaseTool::bundled()?));
    let catalog = Arc::new(catalog);

    let orchestrator = Arc::new(WorkflowOrchestrator::new(
        gateway,
        registry.clone(),
        catalog.clone(),
        config.orchestrator.clone().into(),
    ));

    Ok(AppState::new(orchestrator, registry, catalog))
}
