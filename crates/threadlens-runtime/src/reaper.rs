//! Expiry of jobs whose worker is gone.
//!
//! A pending job whose worker died with the process would otherwise stay
//! pending forever. At startup every pending job belongs to a previous
//! process and is failed at once. While running, jobs pending longer than
//! `stale_after` are failed on a timer.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{error, info};

use threadlens_core::{AnalysisLimits, Result};
use threadlens_store::SqliteStore;

pub const INTERRUPTED_MESSAGE: &str =
    "Analysis was interrupted by a server restart. Please submit again.";
pub const STALE_MESSAGE: &str = "Analysis did not finish in time. Please submit again.";

/// Fail every job left pending by a previous process.
pub fn expire_interrupted(store: &SqliteStore) -> Result<usize> {
    let expired = store.expire_all_pending(INTERRUPTED_MESSAGE)?;
    if !expired.is_empty() {
        info!("Expired {} jobs interrupted by restart", expired.len());
    }
    Ok(expired.len())
}

/// Periodically fail jobs pending longer than `limits.stale_after`.
pub fn start_reaper(store: Arc<SqliteStore>, limits: &AnalysisLimits) -> JoinHandle<()> {
    let stale_after = limits.stale_after;
    let period = (stale_after / 4).max(Duration::from_secs(1));

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        loop {
            ticker.tick().await;
            match store.expire_stale_pending(stale_after.as_millis() as i64, STALE_MESSAGE) {
                Ok(ids) if !ids.is_empty() => info!("Expired {} stale jobs", ids.len()),
                Ok(_) => {}
                Err(e) => error!("Stale job sweep failed: {}", e),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use threadlens_profile::InputSummary;
    use threadlens_store::JobStatus;

    fn input() -> InputSummary {
        InputSummary {
            threads: vec!["a.txt".into()],
            question_count: 1,
        }
    }

    #[test]
    fn test_expire_interrupted() {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(dir.path()).unwrap();
        let id = store.create("guest", &input()).unwrap();

        assert_eq!(expire_interrupted(&store).unwrap(), 1);
        let job = store.get(&id).unwrap();
        assert_eq!(job.status, JobStatus::Error);
        assert_eq!(job.error.as_deref(), Some(INTERRUPTED_MESSAGE));
        assert_eq!(expire_interrupted(&store).unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reaper_expires_stale_jobs() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(SqliteStore::open(dir.path()).unwrap());
        let id = store.create("guest", &input()).unwrap();

        let limits = AnalysisLimits {
            stale_after: Duration::from_millis(1),
            ..Default::default()
        };
        tokio::time::sleep(Duration::from_millis(5)).await;
        let handle = start_reaper(store.clone(), &limits);

        // The first tick fires immediately.
        for _ in 0..50 {
            if store.get(&id).unwrap().status != JobStatus::Pending {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        let job = store.get(&id).unwrap();
        assert_eq!(job.status, JobStatus::Error);
        assert_eq!(job.error.as_deref(), Some(STALE_MESSAGE));
    }
}
