//! Submission routes: JSON and multipart job submission, plus the
//! synchronous heuristic analysis.

use std::sync::Arc;

use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::debug;

use threadlens_profile::{score_threads, summary_sentence, InputSummary};
use threadlens_runtime::TranscriptBlob;

use super::error_response;
use crate::state::AppState;

/// Owner tag used when the caller supplies none.
const DEFAULT_OWNER: &str = "guest";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/analyze", post(submit))
        .route("/analyze/upload", post(submit_upload))
        .route("/analyze/heuristic", post(analyze_heuristic))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnalyzeRequest {
    #[serde(default, alias = "deviceId")]
    owner_tag: Option<String>,
    #[serde(default)]
    transcripts: Vec<TranscriptBlob>,
}

fn owner_or_default(owner: Option<String>) -> String {
    owner
        .filter(|o| !o.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_OWNER.to_string())
}

/// POST /api/analyze — create a job and return its id without waiting.
async fn submit(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    let owner = owner_or_default(req.owner_tag);
    match state.coordinator.submit(&owner, req.transcripts) {
        Ok(receipt) => (StatusCode::ACCEPTED, Json(serde_json::json!(receipt))),
        Err(e) => error_response(e),
    }
}

/// POST /api/analyze/upload — multipart `files` parts plus an optional
/// `ownerTag` (or `deviceId`) field.
async fn submit_upload(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> (StatusCode, Json<serde_json::Value>) {
    let mut owner = None;
    let mut blobs = Vec::new();

    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({ "error": format!("Invalid multipart body: {}", e) })),
                )
            }
        };

        let name = field.name().unwrap_or("").to_string();
        let file_name = field.file_name().map(str::to_string);
        match (name.as_str(), file_name) {
            ("ownerTag" | "deviceId", _) => {
                owner = field.text().await.ok();
            }
            ("files", Some(file_name)) => match field.bytes().await {
                Ok(bytes) => {
                    debug!("Received {} ({} bytes)", file_name, bytes.len());
                    blobs.push(TranscriptBlob::new(
                        file_name,
                        String::from_utf8_lossy(&bytes).into_owned(),
                    ));
                }
                Err(e) => {
                    return (
                        StatusCode::BAD_REQUEST,
                        Json(serde_json::json!({ "error": format!("Read failed: {}", e) })),
                    )
                }
            },
            _ => continue,
        }
    }

    let owner = owner_or_default(owner);
    match state.coordinator.submit(&owner, blobs) {
        Ok(receipt) => (StatusCode::ACCEPTED, Json(serde_json::json!(receipt))),
        Err(e) => error_response(e),
    }
}

/// POST /api/analyze/heuristic — score immediately, no job.
async fn analyze_heuristic(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> (StatusCode, Json<serde_json::Value>) {
    let threads = match state.coordinator.normalize(&req.transcripts) {
        Ok(threads) => threads,
        Err(e) => return error_response(e),
    };

    let score = score_threads(&threads);
    (
        StatusCode::OK,
        Json(serde_json::json!({
            "input": InputSummary::from_threads(&threads),
            "analysis": { "radar_llm": score.radar },
            "summary": summary_sentence(&score.radar),
            "debug": score.breakdown,
        })),
    )
}
