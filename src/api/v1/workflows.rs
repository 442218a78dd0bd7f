//! Workflow execution endpoint

use axum::extract::{Path, State};
use tracing::info;
use uuid::Uuid;

use crate::api::state::AppState;
use crate::api::types::{ApiError, ExecuteWorkflowRequest, ExecuteWorkflowResponse, Json};
use crate::domain::workflow::WorkflowKind;

/// `POST /v1/workflows/{workflow}/execute`
pub async fn execute_workflow(
    State(state): State<AppState>,
    Path(workflow): Path<String>,
    Json(request): Json<ExecuteWorkflowRequest>,
) -> Result<Json<ExecuteWorkflowResponse>, ApiError> {
    let kind: WorkflowKind = workflow.parse().map_err(ApiError::from)?;
    let (input, prior, model, debug) = request.into_parts()?;

    let request_id = Uuid::new_v4();
    info!(%request_id, workflow = %kind, "received execution request");

    let outcome = state
        .orchestrator
        .execute(kind, &input, prior, model.as_deref())
        .await?;

    Ok(Json(ExecuteWorkflowResponse::new(
        request_id, kind, outcome, debug,
    )))
}
