//! `threadlens submit` — upload transcripts to a running server and poll
//! until the job finishes.

use std::path::{Path, PathBuf};

use tracing::info;

use threadlens_core::{Error, PollPolicy, Result};
use threadlens_runtime::{wait_for_terminal, PollResponse, SubmitReceipt, TranscriptBlob};

/// Exit code when the job finished with an error.
pub const EXIT_JOB_FAILED: i32 = 1;
/// Exit code when polling gave up while the job was still pending.
pub const EXIT_STILL_PENDING: i32 = 2;

pub fn base_url() -> String {
    std::env::var("THREADLENS_URL").unwrap_or_else(|_| {
        let port = std::env::var("PORT").unwrap_or_else(|_| "3010".to_string());
        format!("http://localhost:{}", port)
    })
}

/// Read each file as one transcript, named after its file name.
pub fn read_transcripts(paths: &[PathBuf]) -> Result<Vec<TranscriptBlob>> {
    paths
        .iter()
        .map(|path| {
            let text = std::fs::read_to_string(path)?;
            Ok(TranscriptBlob::new(file_label(path), text))
        })
        .collect()
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Submit and wait. Returns the terminal poll response.
pub async fn submit_and_wait(
    base: &str,
    owner: &str,
    transcripts: Vec<TranscriptBlob>,
    policy: PollPolicy,
) -> Result<PollResponse> {
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{}/api/analyze", base))
        .json(&serde_json::json!({
            "ownerTag": owner,
            "transcripts": transcripts,
        }))
        .send()
        .await
        .map_err(|e| Error::Transport(format!("Submit failed: {}", e)))?;

    if !resp.status().is_success() {
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        return Err(Error::Validation(format!(
            "Server rejected submission ({}): {}",
            status, body
        )));
    }

    let receipt: SubmitReceipt = resp
        .json()
        .await
        .map_err(|e| Error::Transport(format!("Invalid submit response: {}", e)))?;
    info!("Submitted job {}", receipt.job_id);

    let url = format!("{}/api/jobs/{}", base, receipt.job_id);
    wait_for_terminal(&receipt.job_id, policy, || {
        let client = client.clone();
        let url = url.clone();
        async move { fetch_job(&client, &url).await }
    })
    .await
}

async fn fetch_job(client: &reqwest::Client, url: &str) -> Result<PollResponse> {
    let resp = client
        .get(url)
        .send()
        .await
        .map_err(|e| Error::Transport(format!("Poll failed: {}", e)))?;

    match resp.status() {
        reqwest::StatusCode::NOT_FOUND => Err(Error::NotFound(url.to_string())),
        status if !status.is_success() => {
            Err(Error::Transport(format!("Poll returned {}", status)))
        }
        _ => resp
            .json()
            .await
            .map_err(|e| Error::Transport(format!("Invalid poll response: {}", e))),
    }
}

/// Entry point for the `submit` subcommand. Returns the process exit code.
pub async fn run_submit(owner: &str, files: &[PathBuf]) -> i32 {
    let transcripts = match read_transcripts(files) {
        Ok(t) => t,
        Err(e) => {
            eprintln!("Failed to read transcripts: {}", e);
            return EXIT_JOB_FAILED;
        }
    };

    match submit_and_wait(&base_url(), owner, transcripts, PollPolicy::default()).await {
        Ok(PollResponse::Done { analysis, .. }) => {
            match serde_json::to_string_pretty(&analysis) {
                Ok(json) => println!("{}", json),
                Err(e) => eprintln!("Failed to print analysis: {}", e),
            }
            0
        }
        Ok(PollResponse::Error { error }) => {
            eprintln!("Analysis failed: {}", error);
            EXIT_JOB_FAILED
        }
        Ok(PollResponse::Pending) => EXIT_STILL_PENDING,
        Err(Error::ClientTimeout { job_id, .. }) => {
            eprintln!(
                "Job {} is still running. Check it later with GET /api/jobs/{}",
                job_id, job_id
            );
            EXIT_STILL_PENDING
        }
        Err(e) => {
            eprintln!("{}", e);
            EXIT_JOB_FAILED
        }
    }
}
