//! v1 API endpoints

pub mod workflows;

use axum::{routing::post, Router};

use super::state::AppState;

pub fn create_v1_router() -> Router<AppState> {
    Router::new().route(
        "/workflows/{workflow}/execute",
        post(workflows::execute_workflow),
    )
}
