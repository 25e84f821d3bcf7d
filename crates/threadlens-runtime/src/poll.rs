//! Poll responder and the client-side poll loop.

use std::future::Future;

use serde::{Deserialize, Serialize};
use tracing::debug;

use threadlens_core::{Error, PollPolicy, Result};
use threadlens_profile::{AnalysisResult, InputSummary};
use threadlens_store::{AnalysisJob, JobStatus, SqliteStore};

/// Snapshot returned to a polling caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum PollResponse {
    Pending,
    Done {
        input: InputSummary,
        analysis: AnalysisResult,
    },
    Error {
        error: String,
    },
}

impl PollResponse {
    pub fn from_job(job: AnalysisJob) -> Result<Self> {
        match job.status {
            JobStatus::Pending => Ok(Self::Pending),
            JobStatus::Done => {
                let analysis = job.analysis.ok_or_else(|| {
                    Error::Internal(format!("job {} is done but has no result", job.id))
                })?;
                Ok(Self::Done {
                    input: job.input,
                    analysis,
                })
            }
            JobStatus::Error => Ok(Self::Error {
                error: job.error.unwrap_or_else(|| "Analysis failed".to_string()),
            }),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

/// Current state of a job. Read-only.
pub fn poll(store: &SqliteStore, job_id: &str) -> Result<PollResponse> {
    PollResponse::from_job(store.get(job_id)?)
}

/// Call `fetch` every `policy.interval` until it reports a terminal state.
///
/// Gives up with `Error::ClientTimeout` after `policy.max_attempts` calls.
/// That error means the caller stopped waiting, not that the job failed.
pub async fn wait_for_terminal<F, Fut>(
    job_id: &str,
    policy: PollPolicy,
    mut fetch: F,
) -> Result<PollResponse>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<PollResponse>>,
{
    for attempt in 1..=policy.max_attempts {
        let response = fetch().await?;
        if response.is_terminal() {
            return Ok(response);
        }
        debug!("Job {} still pending (attempt {})", job_id, attempt);
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.interval).await;
        }
    }

    Err(Error::ClientTimeout {
        job_id: job_id.to_string(),
        attempts: policy.max_attempts,
    })
}
