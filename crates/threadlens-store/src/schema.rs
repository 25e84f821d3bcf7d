//! Database schema SQL.

/// Jobs and the transcripts submitted with them.
pub const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS jobs (
    id TEXT PRIMARY KEY,
    owner_tag TEXT NOT NULL,
    status TEXT NOT NULL CHECK (status IN ('pending', 'done', 'error')),
    input_json TEXT NOT NULL,
    result_json TEXT,
    error TEXT,
    created_at INTEGER NOT NULL,
    completed_at INTEGER
);

CREATE INDEX IF NOT EXISTS idx_jobs_owner ON jobs(owner_tag, created_at);
CREATE INDEX IF NOT EXISTS idx_jobs_status ON jobs(status, created_at);

CREATE TABLE IF NOT EXISTS transcripts (
    job_id TEXT NOT NULL REFERENCES jobs(id) ON DELETE CASCADE,
    thread_id TEXT NOT NULL,
    raw_text TEXT NOT NULL,
    PRIMARY KEY (job_id, thread_id)
);
"#;
