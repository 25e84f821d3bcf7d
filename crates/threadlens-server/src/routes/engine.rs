//! Reasoning engine status and configuration.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};

use threadlens_reason::EngineConfigUpdate;

use super::error_response;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/engine/status", get(get_status))
        .route("/engine/config", put(update_config))
}

/// GET /api/engine/status
async fn get_status(State(state): State<Arc<AppState>>) -> (StatusCode, Json<serde_json::Value>) {
    let config = state.engine_config.read().to_response();
    let jobs = match state.store.stats() {
        Ok(stats) => stats,
        Err(e) => return error_response(e),
    };

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "engine": state.engine.name(),
            "config": config,
            "jobs": jobs,
            "limits": {
                "maxThreads": state.config.limits.max_threads,
                "maxQuestionsPerThread": state.config.limits.max_questions_per_thread,
                "engineTimeoutSecs": state.config.limits.engine_timeout.as_secs(),
                "maxConcurrentJobs": state.config.limits.max_concurrent_jobs,
            },
        })),
    )
}

/// PUT /api/engine/config — merge, persist, return the masked config.
async fn update_config(
    State(state): State<Arc<AppState>>,
    Json(update): Json<EngineConfigUpdate>,
) -> (StatusCode, Json<serde_json::Value>) {
    let mut config = state.engine_config.write();
    if let Err(e) = config.apply_update(&update) {
        return error_response(e);
    }

    if let Err(e) = config.save() {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": format!("Failed to save config: {}", e) })),
        );
    }

    (StatusCode::OK, Json(serde_json::json!(config.to_response())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{send, test_state};
    use serde_json::json;

    #[tokio::test]
    async fn test_status_defaults_to_heuristic() {
        let (state, _dir) = test_state();
        let (status, body) = send(&state, "GET", "/api/engine/status", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["engine"], "heuristic");
        assert_eq!(body["config"]["activeEngine"], "heuristic");
        assert_eq!(body["jobs"]["pending"], 0);
        assert_eq!(body["limits"]["maxThreads"], 5);
    }

    #[tokio::test]
    async fn test_update_persists_and_masks_keys() {
        let (state, _dir) = test_state();
        let (status, body) = send(
            &state,
            "PUT",
            "/api/engine/config",
            Some(json!({"preferredProvider": "groq", "groqApiKey": "gsk-secret"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["activeProvider"], "groq");
        assert!(!body.to_string().contains("gsk-secret"));
        assert!(state.config.data_paths.engine_config_file.exists());
        assert_eq!(state.engine.name(), "groq/llama-3.3-70b-versatile");

        let (status, _) = send(
            &state,
            "PUT",
            "/api/engine/config",
            Some(json!({"preferredProvider": "nope"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}
