//! Conversation question extraction.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use threadlens_ingest::extract_questions_from_conversation;

use crate::state::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/extract", post(extract))
}

#[derive(Debug, Deserialize)]
struct ExtractRequest {
    #[serde(default)]
    text: String,
}

/// POST /api/extract — questions from a pasted chat export.
async fn extract(Json(req): Json<ExtractRequest>) -> (StatusCode, Json<serde_json::Value>) {
    let questions = extract_questions_from_conversation(&req.text);
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "count": questions.len(),
            "questions": questions,
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes::test_support::{send, test_state};

    #[tokio::test]
    async fn test_extract() {
        let (state, _dir) = test_state();
        let (status, body) = send(
            &state,
            "POST",
            "/api/extract",
            Some(serde_json::json!({"text": "なぜ?\n12:03\nanswer\nなぜ?\n12:05\n"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["questions"][0], "なぜ?");
    }
}
