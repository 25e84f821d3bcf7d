//! Error types for ThreadLens.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Empty or malformed submission. Raised before any job exists.
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Reasoning engine unreachable, errored, or exceeded its time ceiling.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Candidate analysis failed structural validation.
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    /// Polling ran out of attempts before the job reached a terminal state.
    /// Observed by the caller only; never written to a job record.
    #[error("Client timeout: job {job_id} still pending after {attempts} polls")]
    ClientTimeout { job_id: String, attempts: u32 },

    #[error("Database error: {0}")]
    Database(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error came from the analysis step itself (engine call or
    /// validation) rather than from infrastructure.
    pub fn is_scoring_failure(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::SchemaViolation(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_timeout_message() {
        let err = Error::ClientTimeout {
            job_id: "abc".into(),
            attempts: 60,
        };
        assert_eq!(
            err.to_string(),
            "Client timeout: job abc still pending after 60 polls"
        );
        assert!(!err.is_scoring_failure());
    }

    #[test]
    fn test_scoring_failures() {
        assert!(Error::Transport("timed out".into()).is_scoring_failure());
        assert!(Error::SchemaViolation("missing radar_llm".into()).is_scoring_failure());
        assert!(!Error::Validation("no files".into()).is_scoring_failure());
    }
}
