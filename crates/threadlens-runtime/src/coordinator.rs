//! Submission coordinator.

use std::collections::HashSet;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};

use threadlens_core::{AnalysisLimits, Error, Result};
use threadlens_ingest::Thread;
use threadlens_profile::InputSummary;
use threadlens_store::SqliteStore;

use crate::types::{AnalysisRequest, SubmitReceipt, TranscriptBlob};

pub struct Coordinator {
    store: Arc<SqliteStore>,
    limits: AnalysisLimits,
    tx: mpsc::UnboundedSender<AnalysisRequest>,
}

impl Coordinator {
    /// Create the coordinator and the receiving end the worker consumes.
    pub fn new(
        store: Arc<SqliteStore>,
        limits: AnalysisLimits,
    ) -> (Self, mpsc::UnboundedReceiver<AnalysisRequest>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { store, limits, tx }, rx)
    }

    pub fn limits(&self) -> &AnalysisLimits {
        &self.limits
    }

    /// Validate and normalize blobs into threads. No job is created.
    ///
    /// Blobs without a name get `thread_<n>` (1-based position).
    pub fn normalize(&self, blobs: &[TranscriptBlob]) -> Result<Vec<Thread>> {
        if blobs.is_empty() {
            return Err(Error::Validation(
                "At least one transcript is required".into(),
            ));
        }
        if blobs.len() > self.limits.max_threads {
            return Err(Error::Validation(format!(
                "At most {} transcripts can be analyzed at once, got {}",
                self.limits.max_threads,
                blobs.len()
            )));
        }

        let mut seen = HashSet::new();
        let mut threads = Vec::with_capacity(blobs.len());
        for (i, blob) in blobs.iter().enumerate() {
            let name = blob.name.trim();
            let thread_id = if name.is_empty() {
                format!("thread_{}", i + 1)
            } else {
                name.to_string()
            };
            if !seen.insert(thread_id.clone()) {
                return Err(Error::Validation(format!(
                    "Duplicate transcript name: {}",
                    thread_id
                )));
            }
            threads.push(Thread::from_transcript(
                thread_id,
                &blob.text,
                self.limits.max_questions_per_thread,
            ));
        }

        if threads.iter().all(Thread::is_empty) {
            return Err(Error::Validation(
                "No questions found in the submitted transcripts".into(),
            ));
        }
        Ok(threads)
    }

    /// Create a pending job and queue it. Returns as soon as the job exists.
    pub fn submit(&self, owner_tag: &str, blobs: Vec<TranscriptBlob>) -> Result<SubmitReceipt> {
        let owner_tag = owner_tag.trim();
        if owner_tag.is_empty() {
            return Err(Error::Validation("Owner tag is required".into()));
        }

        let threads = self.normalize(&blobs)?;
        let input = InputSummary::from_threads(&threads);

        let transcripts: Vec<(&str, &str)> = threads
            .iter()
            .zip(&blobs)
            .map(|(t, b)| (t.thread_id(), b.text.as_str()))
            .collect();
        let job_id = self
            .store
            .create_with_transcripts(owner_tag, &input, &transcripts)?;

        info!(
            "Queued job {} for {}: {} threads, {} questions",
            job_id,
            owner_tag,
            input.threads.len(),
            input.question_count
        );

        let request = AnalysisRequest {
            job_id: job_id.clone(),
            threads,
            input,
        };
        if self.tx.send(request).is_err() {
            error!("Analysis worker is not running; failing job {}", job_id);
            self.store
                .transition_to_error(&job_id, "Analysis worker is not running")?;
            return Err(Error::Internal("Analysis worker is not running".into()));
        }

        Ok(SubmitReceipt { job_id })
    }
}
