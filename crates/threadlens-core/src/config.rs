//! Configuration and data directory management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Paths to all ThreadLens data files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPaths {
    /// Root data directory (e.g., `data/`).
    pub root: PathBuf,
    /// Job database directory (`data/db/`).
    pub db: PathBuf,
    /// Reasoning engine configuration (`data/engine-config.json`).
    pub engine_config_file: PathBuf,
}

impl DataPaths {
    /// Create data paths from a root directory. Creates directories if needed.
    pub fn new(root: impl AsRef<Path>) -> std::io::Result<Self> {
        let root = root.as_ref().to_path_buf();
        let paths = Self {
            db: root.join("db"),
            engine_config_file: root.join("engine-config.json"),
            root,
        };
        std::fs::create_dir_all(&paths.db)?;
        Ok(paths)
    }
}

/// Bounds applied to submissions and to the background worker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisLimits {
    /// Maximum transcripts accepted per submission.
    pub max_threads: usize,
    /// Questions kept per transcript; the rest are truncated.
    pub max_questions_per_thread: usize,
    /// Wall-clock ceiling on one reasoning engine call.
    pub engine_timeout: Duration,
    /// Pending jobs older than this are expired by the reaper.
    pub stale_after: Duration,
    /// Jobs analyzed concurrently by the worker.
    pub max_concurrent_jobs: usize,
}

impl Default for AnalysisLimits {
    fn default() -> Self {
        Self {
            max_threads: 5,
            max_questions_per_thread: 200,
            engine_timeout: Duration::from_secs(300),
            stale_after: Duration::from_secs(900),
            max_concurrent_jobs: 4,
        }
    }
}

impl AnalysisLimits {
    /// Defaults overridden by `THREADLENS_*` environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        let limits = Self {
            engine_timeout: env_secs("THREADLENS_ENGINE_TIMEOUT_SECS")
                .unwrap_or(defaults.engine_timeout),
            stale_after: env_secs("THREADLENS_STALE_JOB_SECS").unwrap_or(defaults.stale_after),
            max_concurrent_jobs: env_parse("THREADLENS_MAX_CONCURRENT_JOBS")
                .filter(|n| *n > 0)
                .unwrap_or(defaults.max_concurrent_jobs),
            ..defaults
        };

        if limits.stale_after <= limits.engine_timeout {
            warn!(
                "Stale job ceiling ({}s) does not exceed the engine timeout ({}s); \
                 slow jobs may be expired while still running",
                limits.stale_after.as_secs(),
                limits.engine_timeout.as_secs()
            );
        }
        limits
    }
}

/// Client-side polling schedule.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    /// Every 3 seconds, 60 times (180 seconds in total).
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(3),
            max_attempts: 60,
        }
    }
}

/// Top-level ThreadLens configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThreadLensConfig {
    /// HTTP server port.
    pub port: u16,
    /// Data directory paths.
    pub data_paths: DataPaths,
    pub limits: AnalysisLimits,
    pub poll: PollPolicy,
}

impl ThreadLensConfig {
    /// Create configuration from environment and defaults.
    pub fn from_env(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let port = env_parse("PORT").unwrap_or(3010);
        let data_paths = DataPaths::new(data_dir)?;

        Ok(Self {
            port,
            data_paths,
            limits: AnalysisLimits::from_env(),
            poll: PollPolicy::default(),
        })
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

fn env_secs(key: &str) -> Option<Duration> {
    env_parse::<u64>(key).map(Duration::from_secs)
}
