//! Pipeline messages.

use serde::{Deserialize, Serialize};

use threadlens_ingest::Thread;
use threadlens_profile::InputSummary;

/// One uploaded transcript. `name` becomes the thread identifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptBlob {
    #[serde(default)]
    pub name: String,
    pub text: String,
}

impl TranscriptBlob {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Returned by a successful submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    pub job_id: String,
}

/// Work item handed from the coordinator to the worker.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub job_id: String,
    pub threads: Vec<Thread>,
    pub input: InputSummary,
}
