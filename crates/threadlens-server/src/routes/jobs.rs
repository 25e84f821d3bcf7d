//! Poll route.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};

use threadlens_runtime::poll;

use super::error_response;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/jobs/{id}", get(get_job))
}

/// GET /api/jobs/:id — `{status: pending}`, `{status: done, input, analysis}`
/// or `{status: error, error}`.
async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> (StatusCode, Json<serde_json::Value>) {
    match poll(&state.store, &job_id) {
        Ok(response) => (StatusCode::OK, Json(serde_json::json!(response))),
        Err(e) => error_response(e),
    }
}
