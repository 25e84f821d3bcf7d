//! Background analysis worker.
//!
//! Each job ends with exactly one store transition: `done` with a validated
//! result, or `error` with a message. Nothing is retried.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use threadlens_core::{AnalysisLimits, Error, Result};
use threadlens_profile::{score_threads, validate_analysis, AnalysisResult};
use threadlens_reason::ReasoningEngine;
use threadlens_store::{SqliteStore, Transition};

use crate::types::AnalysisRequest;

/// Per-axis gap between engine and heuristic radar that gets logged.
const DIVERGENCE_WARN: f64 = 0.5;

#[derive(Clone)]
pub struct Worker {
    store: Arc<SqliteStore>,
    engine: Arc<dyn ReasoningEngine>,
    limits: AnalysisLimits,
}

impl Worker {
    pub fn new(
        store: Arc<SqliteStore>,
        engine: Arc<dyn ReasoningEngine>,
        limits: AnalysisLimits,
    ) -> Self {
        Self {
            store,
            engine,
            limits,
        }
    }

    /// Run one job to its terminal state.
    ///
    /// A job that is already terminal (expired by the reaper, or finished by
    /// an earlier run) is left alone and the engine is not called. Errors
    /// returned here are store failures only; scoring failures are written
    /// to the job.
    pub async fn run_job(&self, request: AnalysisRequest) -> Result<Transition> {
        let current = {
            let job_id = request.job_id.clone();
            self.with_store(move |store| store.get(&job_id)).await?.status
        };
        if current.is_terminal() {
            info!("Skipping job {}: already {}", request.job_id, current);
            return Ok(Transition::AlreadyTerminal(current));
        }

        let started = Instant::now();
        let engine_name = self.engine.name();
        info!("Analyzing job {} with {}", request.job_id, engine_name);

        let job_id = request.job_id.clone();
        let transition = match self.score(&request).await {
            Ok(result) => {
                self.with_store(move |store| store.transition_to_done(&job_id, &result))
                    .await?
            }
            Err(e) => {
                warn!("Job {} failed: {}", request.job_id, e);
                let message = e.to_string();
                self.with_store(move |store| store.transition_to_error(&job_id, &message))
                    .await?
            }
        };

        info!(
            "Job {} finished in {}ms ({:?})",
            request.job_id,
            started.elapsed().as_millis(),
            transition
        );
        Ok(transition)
    }

    /// Run a store call on the blocking pool.
    async fn with_store<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&SqliteStore) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || f(&store))
            .await
            .map_err(|e| Error::Internal(format!("Store task failed: {}", e)))?
    }

    async fn score(&self, request: &AnalysisRequest) -> Result<AnalysisResult> {
        let heuristic = score_threads(&request.threads).radar;

        let candidate = tokio::time::timeout(
            self.limits.engine_timeout,
            self.engine.analyze(&request.threads),
        )
        .await
        .map_err(|_| {
            Error::Transport(format!(
                "Reasoning engine did not answer within {}s",
                self.limits.engine_timeout.as_secs()
            ))
        })??;

        let mut result = validate_analysis(&candidate, &request.input)?;

        let divergence = result.radar_llm.max_divergence(&heuristic);
        if divergence > DIVERGENCE_WARN {
            warn!(
                "Job {}: engine radar diverges from heuristic by {:.2}",
                request.job_id, divergence
            );
        }
        result.radar_heuristic = Some(heuristic);
        Ok(result)
    }
}

/// Start the dispatcher that drains `rx` and runs each job on its own task,
/// at most `max_concurrent_jobs` at a time.
pub fn start_analysis_worker(
    worker: Worker,
    mut rx: mpsc::UnboundedReceiver<AnalysisRequest>,
) -> JoinHandle<()> {
    let permits = Arc::new(Semaphore::new(worker.limits.max_concurrent_jobs.max(1)));

    tokio::spawn(async move {
        info!(
            "Analysis worker started (max {} concurrent jobs)",
            worker.limits.max_concurrent_jobs
        );
        while let Some(request) = rx.recv().await {
            let permit = match permits.clone().acquire_owned().await {
                Ok(p) => p,
                Err(_) => break,
            };
            let worker = worker.clone();
            tokio::spawn(async move {
                let _permit = permit;
                let job_id = request.job_id.clone();
                if let Err(e) = worker.run_job(request).await {
                    error!("Job {} could not be finalized: {}", job_id, e);
                }
            });
        }
        info!("Analysis worker stopped");
    })
}
