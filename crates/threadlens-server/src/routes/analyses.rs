//! Stored analyses: list by owner, fetch by id, raw transcripts.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;

use threadlens_core::Error;

use super::error_response;
use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/analyses", get(list_analyses))
        .route("/analyses/{id}", get(get_analysis))
        .route("/analyses/{id}/threads/{thread}", get(get_transcript))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    owner: Option<String>,
}

/// GET /api/analyses?owner= — newest first.
async fn list_analyses(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> (StatusCode, Json<serde_json::Value>) {
    let Some(owner) = query.owner.filter(|o| !o.trim().is_empty()) else {
        return error_response(Error::Validation("owner is required".into()));
    };
    match state.store.list_by_owner(&owner) {
        Ok(listed) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "analyses": listed,
                "total": listed.len(),
            })),
        ),
        Err(e) => error_response(e),
    }
}

/// GET /api/analyses/:id — full job record.
async fn get_analysis(
    State(state): State<Arc<AppState>>,
    Path(job_id): Path<String>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state.store.get(&job_id) {
        Ok(job) => (StatusCode::OK, Json(serde_json::json!(job))),
        Err(e) => error_response(e),
    }
}

/// GET /api/analyses/:id/threads/:thread — raw submitted transcript.
async fn get_transcript(
    State(state): State<Arc<AppState>>,
    Path((job_id, thread_id)): Path<(String, String)>,
) -> (StatusCode, Json<serde_json::Value>) {
    match state.store.get_transcript(&job_id, &thread_id) {
        Ok(text) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "jobId": job_id,
                "threadId": thread_id,
                "text": text,
            })),
        ),
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{send, test_state};
    use threadlens_runtime::TranscriptBlob;

    #[tokio::test]
    async fn test_list_fetch_and_transcript() {
        let (state, _dir) = test_state();
        let receipt = state
            .coordinator
            .submit(
                "alice",
                vec![
                    TranscriptBlob::new("a.txt", "1. なぜ?\n"),
                    TranscriptBlob::new("b.txt", "デプロイは?\n"),
                ],
            )
            .unwrap();

        let (status, body) = send(&state, "GET", "/api/analyses?owner=alice", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 1);
        assert_eq!(body["analyses"][0]["id"], receipt.job_id.as_str());
        assert_eq!(body["analyses"][0]["title"], "a.txt b.txt");
        assert_eq!(body["analyses"][0]["status"], "pending");
        assert!(body["analyses"][0]["createdAt"].is_i64());

        let (status, body) =
            send(&state, "GET", &format!("/api/analyses/{}", receipt.job_id), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ownerTag"], "alice");
        assert_eq!(body["input"]["questionCount"], 2);

        let (status, body) = send(
            &state,
            "GET",
            &format!("/api/analyses/{}/threads/a.txt", receipt.job_id),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["text"], "1. なぜ?\n");
    }

    #[tokio::test]
    async fn test_missing_owner_and_ids() {
        let (state, _dir) = test_state();
        let (status, _) = send(&state, "GET", "/api/analyses", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&state, "GET", "/api/analyses/nope", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&state, "GET", "/api/analyses/nope/threads/a.txt", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
