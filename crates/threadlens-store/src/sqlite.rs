//! SQLite-backed job store.
//!
//! Transitions are a single conditional `UPDATE ... WHERE status = 'pending'`,
//! so a job can leave `pending` at most once even if two workers race on it.

use std::path::{Path, PathBuf};

use parking_lot::Mutex;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, info, warn};

use crate::schema::SCHEMA_SQL;
use crate::types::*;
use threadlens_core::{Error, Result};
use threadlens_profile::{AnalysisResult, InputSummary};

pub struct SqliteStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

/// Raw column values of a `jobs` row before JSON decoding.
struct JobRow {
    id: String,
    owner_tag: String,
    status: String,
    input_json: String,
    result_json: Option<String>,
    error: Option<String>,
    created_at: i64,
    completed_at: Option<i64>,
}

impl JobRow {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            owner_tag: row.get("owner_tag")?,
            status: row.get("status")?,
            input_json: row.get("input_json")?,
            result_json: row.get("result_json")?,
            error: row.get("error")?,
            created_at: row.get("created_at")?,
            completed_at: row.get("completed_at")?,
        })
    }

    fn into_job(self) -> Result<AnalysisJob> {
        let status = JobStatus::parse(&self.status).ok_or_else(|| {
            Error::Database(format!("job {} has unknown status {:?}", self.id, self.status))
        })?;
        let input: InputSummary = serde_json::from_str(&self.input_json)?;
        let analysis: Option<AnalysisResult> = self
            .result_json
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        Ok(AnalysisJob {
            id: self.id,
            owner_tag: self.owner_tag,
            status,
            input,
            analysis,
            error: self.error,
            created_at: self.created_at,
            completed_at: self.completed_at,
        })
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl SqliteStore {
    /// Open or create the store. The file will be `db_dir/threadlens.db`.
    pub fn open(db_dir: impl AsRef<Path>) -> Result<Self> {
        let db_dir = db_dir.as_ref();
        std::fs::create_dir_all(db_dir)?;
        let db_path = db_dir.join("threadlens.db");

        let conn = Self::create_connection(&db_path)?;
        conn.execute_batch(SCHEMA_SQL)
            .map_err(|e| Error::Database(format!("Schema init failed: {}", e)))?;

        let store = Self {
            conn: Mutex::new(conn),
            db_path,
        };

        let stats = store.stats()?;
        info!(
            "SqliteStore initialized: {} pending, {} done, {} error, path={}",
            stats.pending,
            stats.done,
            stats.error,
            store.db_path.display()
        );
        Ok(store)
    }

    fn create_connection(db_path: &Path) -> Result<Connection> {
        let conn = Connection::open(db_path).map_err(|e| Error::Database(e.to_string()))?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA foreign_keys = ON;
             PRAGMA synchronous = NORMAL;",
        )
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(conn)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    // ---------------------------------------------------------------
    // Lifecycle
    // ---------------------------------------------------------------

    /// Create a pending job. Returns the new job id.
    pub fn create(&self, owner_tag: &str, input: &InputSummary) -> Result<String> {
        self.create_with_transcripts(owner_tag, input, &[])
    }

    /// Create a pending job together with the raw transcripts it was built
    /// from, in one transaction. `transcripts` holds `(thread_id, raw_text)`.
    pub fn create_with_transcripts(
        &self,
        owner_tag: &str,
        input: &InputSummary,
        transcripts: &[(&str, &str)],
    ) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let input_json = serde_json::to_string(input)?;
        let now = now_millis();

        let mut conn = self.conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::Database(e.to_string()))?;
        tx.prepare_cached(
            "INSERT INTO jobs (id, owner_tag, status, input_json, created_at)
             VALUES (?1, ?2, 'pending', ?3, ?4)",
        )
        .map_err(|e| Error::Database(e.to_string()))?
        .execute(params![id, owner_tag, input_json, now])
        .map_err(|e| Error::Database(e.to_string()))?;

        for (thread_id, raw_text) in transcripts {
            tx.prepare_cached(
                "INSERT INTO transcripts (job_id, thread_id, raw_text) VALUES (?1, ?2, ?3)",
            )
            .map_err(|e| Error::Database(e.to_string()))?
            .execute(params![id, thread_id, raw_text])
            .map_err(|e| Error::Database(e.to_string()))?;
        }
        tx.commit().map_err(|e| Error::Database(e.to_string()))?;

        debug!(
            "Created job {} for {} ({} threads, {} questions)",
            id,
            owner_tag,
            input.threads.len(),
            input.question_count
        );
        Ok(id)
    }

    /// Move a pending job to `done` with its validated result.
    pub fn transition_to_done(&self, job_id: &str, result: &AnalysisResult) -> Result<Transition> {
        let result_json = serde_json::to_string(result)?;
        self.transition(job_id, JobStatus::Done, Some(result_json), None)
    }

    /// Move a pending job to `error` with a message.
    pub fn transition_to_error(&self, job_id: &str, message: &str) -> Result<Transition> {
        self.transition(job_id, JobStatus::Error, None, Some(message))
    }

    fn transition(
        &self,
        job_id: &str,
        to: JobStatus,
        result_json: Option<String>,
        error: Option<&str>,
    ) -> Result<Transition> {
        let now = now_millis();
        let conn = self.conn.lock();
        let changed = conn
            .prepare_cached(
                "UPDATE jobs SET status = ?1, result_json = ?2, error = ?3, completed_at = ?4
                 WHERE id = ?5 AND status = 'pending'",
            )
            .map_err(|e| Error::Database(e.to_string()))?
            .execute(params![to.as_str(), result_json, error, now, job_id])
            .map_err(|e| Error::Database(e.to_string()))?;

        if changed > 0 {
            info!("Job {} -> {}", job_id, to);
            return Ok(Transition::Applied);
        }

        let current: Option<String> = conn
            .prepare_cached("SELECT status FROM jobs WHERE id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![job_id], |row| row.get(0))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;

        match current {
            None => Err(Error::NotFound(format!("job {}", job_id))),
            Some(status) => {
                let status = JobStatus::parse(&status).unwrap_or(JobStatus::Error);
                warn!(
                    "Ignoring transition of job {} to {}: already {}",
                    job_id, to, status
                );
                Ok(Transition::AlreadyTerminal(status))
            }
        }
    }

    // ---------------------------------------------------------------
    // Reads
    // ---------------------------------------------------------------

    pub fn get(&self, job_id: &str) -> Result<AnalysisJob> {
        let conn = self.conn.lock();
        let row = conn
            .prepare_cached("SELECT * FROM jobs WHERE id = ?1")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![job_id], JobRow::from_row)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        drop(conn);

        row.ok_or_else(|| Error::NotFound(format!("job {}", job_id)))?
            .into_job()
    }

    /// Jobs of one owner, newest first.
    pub fn list_by_owner(&self, owner_tag: &str) -> Result<Vec<JobListing>> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "SELECT id, status, input_json, created_at FROM jobs
                 WHERE owner_tag = ?1 ORDER BY created_at DESC, rowid DESC",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let rows = stmt
            .query_map(params![owner_tag], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })
            .map_err(|e| Error::Database(e.to_string()))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::Database(e.to_string()))?;

        rows.into_iter()
            .map(|(id, status, input_json, created_at)| {
                let input: InputSummary = serde_json::from_str(&input_json)?;
                Ok(JobListing {
                    title: input.title(),
                    status: JobStatus::parse(&status).unwrap_or(JobStatus::Error),
                    id,
                    created_at,
                })
            })
            .collect()
    }

    /// Raw transcript text submitted for one thread of a job.
    pub fn get_transcript(&self, job_id: &str, thread_id: &str) -> Result<String> {
        let conn = self.conn.lock();
        let text: Option<String> = conn
            .prepare_cached("SELECT raw_text FROM transcripts WHERE job_id = ?1 AND thread_id = ?2")
            .map_err(|e| Error::Database(e.to_string()))?
            .query_row(params![job_id, thread_id], |row| row.get(0))
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;

        text.ok_or_else(|| Error::NotFound(format!("thread {} of job {}", thread_id, job_id)))
    }

    pub fn stats(&self) -> Result<StoreStats> {
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached("SELECT status, COUNT(*) FROM jobs GROUP BY status")
            .map_err(|e| Error::Database(e.to_string()))?;
        let counts = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut stats = StoreStats {
            db_path: self.db_path.display().to_string(),
            ..Default::default()
        };
        for entry in counts {
            let (status, n) = entry.map_err(|e| Error::Database(e.to_string()))?;
            match JobStatus::parse(&status) {
                Some(JobStatus::Pending) => stats.pending = n,
                Some(JobStatus::Done) => stats.done = n,
                Some(JobStatus::Error) => stats.error = n,
                None => {}
            }
        }
        Ok(stats)
    }

    // ---------------------------------------------------------------
    // Expiry
    // ---------------------------------------------------------------

    /// Fail every job still pending that was created before `cutoff_ms`.
    /// Returns the ids that were expired.
    pub fn expire_pending_before(&self, cutoff_ms: i64, message: &str) -> Result<Vec<String>> {
        let now = now_millis();
        let conn = self.conn.lock();
        let mut stmt = conn
            .prepare_cached(
                "UPDATE jobs SET status = 'error', error = ?1, completed_at = ?2
                 WHERE status = 'pending' AND created_at < ?3
                 RETURNING id",
            )
            .map_err(|e| Error::Database(e.to_string()))?;
        let ids = stmt
            .query_map(params![message, now, cutoff_ms], |row| row.get::<_, String>(0))
            .map_err(|e| Error::Database(e.to_string()))?
            .collect::<rusqlite::Result<Vec<_>>>()
            .map_err(|e| Error::Database(e.to_string()))?;

        for id in &ids {
            warn!("Expired pending job {}: {}", id, message);
        }
        Ok(ids)
    }

    /// Fail pending jobs older than `max_age_ms`.
    pub fn expire_stale_pending(&self, max_age_ms: i64, message: &str) -> Result<Vec<String>> {
        self.expire_pending_before(now_millis() - max_age_ms, message)
    }

    /// Fail every pending job. Used at startup, when no worker from a
    /// previous process can still be running.
    pub fn expire_all_pending(&self, message: &str) -> Result<Vec<String>> {
        self.expire_pending_before(i64::MAX, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use threadlens_ingest::Thread;

    fn test_store() -> (SqliteStore, TempDir) {
        let dir = TempDir::new().unwrap();
        let store = SqliteStore::open(dir.path()).unwrap();
        (store, dir)
    }

    fn threads() -> Vec<Thread> {
        vec![
            Thread::from_questions("a.txt", vec!["なぜ落ちる?".into(), "次はどうする?".into()]),
            Thread::from_questions("b.txt", vec!["デプロイ先は?".into()]),
        ]
    }

    fn input() -> InputSummary {
        InputSummary::from_threads(&threads())
    }

    fn result() -> AnalysisResult {
        threadlens_profile::heuristic_analysis(&threads())
    }

    #[test]
    fn test_create_is_pending() {
        let (store, _dir) = test_store();
        let id = store.create("guest", &input()).unwrap();

        let job = store.get(&id).unwrap();
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.owner_tag, "guest");
        assert_eq!(job.input.question_count, 3);
        assert!(job.analysis.is_none());
        assert!(job.error.is_none());
        assert!(job.completed_at.is_none());
    }

    #[test]
    fn test_done_is_single_shot() {
        let (store, _dir) = test_store();
        let id = store.create("guest", &input()).unwrap();

        assert_eq!(store.transition_to_done(&id, &result()).unwrap(), Transition::Applied);
        assert_eq!(
            store.transition_to_error(&id, "late failure").unwrap(),
            Transition::AlreadyTerminal(JobStatus::Done)
        );
        assert_eq!(
            store.transition_to_done(&id, &result()).unwrap(),
            Transition::AlreadyTerminal(JobStatus::Done)
        );

        let job = store.get(&id).unwrap();
        assert_eq!(job.status, JobStatus::Done);
        assert!(job.error.is_none());
        assert!(job.completed_at.is_some());
        assert_eq!(
            job.analysis.unwrap().common_traits,
            result().common_traits
        );
    }

    #[test]
    fn test_error_is_single_shot() {
        let (store, _dir) = test_store();
        let id = store.create("guest", &input()).unwrap();

        store.transition_to_error(&id, "engine timed out").unwrap();
        assert_eq!(
            store.transition_to_done(&id, &result()).unwrap(),
            Transition::AlreadyTerminal(JobStatus::Error)
        );

        let job = store.get(&id).unwrap();
        assert_eq!(job.status, JobStatus::Error);
        assert_eq!(job.error.as_deref(), Some("engine timed out"));
        assert!(job.analysis.is_none());
    }

    #[test]
    fn test_missing_job() {
        let (store, _dir) = test_store();
        assert!(matches!(store.get("nope"), Err(Error::NotFound(_))));
        assert!(matches!(
            store.transition_to_error("nope", "x"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_list_by_owner() {
        let (store, _dir) = test_store();
        let first = store.create("alice", &input()).unwrap();
        let second = store.create("alice", &input()).unwrap();
        store.create("bob", &input()).unwrap();

        let listed = store.list_by_owner("alice").unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, second);
        assert_eq!(listed[1].id, first);
        assert_eq!(listed[0].title, "a.txt b.txt");
        assert!(store.list_by_owner("carol").unwrap().is_empty());
    }

    #[test]
    fn test_transcripts() {
        let (store, _dir) = test_store();
        let id = store
            .create_with_transcripts("guest", &input(), &[("a.txt", "1. なぜ落ちる?\n")])
            .unwrap();

        assert_eq!(store.get_transcript(&id, "a.txt").unwrap(), "1. なぜ落ちる?\n");
        assert!(matches!(
            store.get_transcript(&id, "b.txt"),
            Err(Error::NotFound(_))
        ));
    }

    #[test]
    fn test_expire_pending() {
        let (store, _dir) = test_store();
        let pending = store.create("guest", &input()).unwrap();
        let done = store.create("guest", &input()).unwrap();
        store.transition_to_done(&done, &result()).unwrap();

        // Nothing is older than an hour yet.
        assert!(store.expire_stale_pending(3_600_000, "stale").unwrap().is_empty());

        let expired = store.expire_all_pending("interrupted").unwrap();
        assert_eq!(expired, vec![pending.clone()]);
        assert_eq!(store.get(&pending).unwrap().error.as_deref(), Some("interrupted"));
        assert_eq!(store.get(&done).unwrap().status, JobStatus::Done);

        let stats = store.stats().unwrap();
        assert_eq!((stats.pending, stats.done, stats.error), (0, 1, 1));
    }

    #[test]
    fn test_racing_transitions_apply_once() {
        use std::sync::{Arc, Barrier};

        let (store, _dir) = test_store();
        let store = Arc::new(store);
        let id = store.create("guest", &input()).unwrap();
        let barrier = Arc::new(Barrier::new(2));

        let done = {
            let (store, id, barrier) = (store.clone(), id.clone(), barrier.clone());
            std::thread::spawn(move || {
                barrier.wait();
                store.transition_to_done(&id, &result()).unwrap()
            })
        };
        let failed = {
            let (store, id, barrier) = (store.clone(), id.clone(), barrier.clone());
            std::thread::spawn(move || {
                barrier.wait();
                store.transition_to_error(&id, "engine timed out").unwrap()
            })
        };

        let outcomes = [done.join().unwrap(), failed.join().unwrap()];
        let applied = outcomes
            .iter()
            .filter(|t| **t == Transition::Applied)
            .count();
        assert_eq!(applied, 1);

        let job = store.get(&id).unwrap();
        let winner = job.status;
        assert!(outcomes.contains(&Transition::AlreadyTerminal(winner)));
        match winner {
            JobStatus::Done => assert!(job.analysis.is_some() && job.error.is_none()),
            JobStatus::Error => assert!(job.analysis.is_none() && job.error.is_some()),
            JobStatus::Pending => panic!("job left pending"),
        }
    }

    #[test]
    fn test_survives_reopen() {
        let dir = TempDir::new().unwrap();
        let id = {
            let store = SqliteStore::open(dir.path()).unwrap();
            store.create("guest", &input()).unwrap()
        };
        let store = SqliteStore::open(dir.path()).unwrap();
        assert_eq!(store.get(&id).unwrap().status, JobStatus::Pending);
    }
}
