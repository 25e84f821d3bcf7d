//! HTTP route handlers.

pub mod analyses;
pub mod analyze;
pub mod engine;
pub mod extract;
pub mod jobs;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use threadlens_core::Error;

use crate::state::AppState;

/// Build the main Axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .merge(analyze::routes())
        .merge(jobs::routes())
        .merge(analyses::routes())
        .merge(extract::routes())
        .merge(engine::routes())
}

/// Map a core error to a status code and `{"error": ...}` body.
pub(crate) fn error_response(err: Error) -> (StatusCode, Json<serde_json::Value>) {
    let status = match &err {
        Error::Validation(_) => StatusCode::BAD_REQUEST,
        Error::NotFound(_) => StatusCode::NOT_FOUND,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        error!("Request failed: {}", err);
    }
    (status, Json(serde_json::json!({ "error": err.to_string() })))
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_mapping() {
        assert_eq!(
            error_response(Error::Validation("x".into())).0,
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            error_response(Error::NotFound("x".into())).0,
            StatusCode::NOT_FOUND
        );
        let (status, Json(body)) = error_response(Error::Database("locked".into()));
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Database error: locked");
    }
}
