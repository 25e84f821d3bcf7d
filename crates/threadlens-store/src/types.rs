//! Job records as stored and served.

use serde::{Deserialize, Serialize};

use threadlens_profile::{AnalysisResult, InputSummary};

/// Job lifecycle state. `Done` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Done,
    Error,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Done => "done",
            Self::Error => "error",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "done" => Some(Self::Done),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one job row.
///
/// `analysis` is present iff `status` is `done`, `error` iff it is `error`,
/// and `completed_at` iff the job is terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisJob {
    pub id: String,
    pub owner_tag: String,
    pub status: JobStatus,
    pub input: InputSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<AnalysisResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Unix milliseconds.
    pub created_at: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<i64>,
}

/// Entry in an owner's job list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListing {
    pub id: String,
    /// Submitted thread identifiers joined by a space.
    pub title: String,
    pub status: JobStatus,
    pub created_at: i64,
}

/// Outcome of a transition request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The job moved from pending to the requested state.
    Applied,
    /// The job was already terminal; nothing changed.
    AlreadyTerminal(JobStatus),
}

/// Job counts by status.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreStats {
    pub pending: i64,
    pub done: i64,
    pub error: i64,
    pub db_path: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trip() {
        for status in [JobStatus::Pending, JobStatus::Done, JobStatus::Error] {
            assert_eq!(JobStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(JobStatus::parse("running"), None);
        assert!(!JobStatus::Pending.is_terminal());
        assert!(JobStatus::Error.is_terminal());
    }

    #[test]
    fn test_pending_job_omits_terminal_fields() {
        let job = AnalysisJob {
            id: "j1".into(),
            owner_tag: "guest".into(),
            status: JobStatus::Pending,
            input: InputSummary {
                threads: vec!["a.txt".into()],
                question_count: 2,
            },
            analysis: None,
            error: None,
            created_at: 1,
            completed_at: None,
        };
        let json = serde_json::to_value(&job).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["ownerTag"], "guest");
        assert!(json.get("analysis").is_none());
        assert!(json.get("completedAt").is_none());
    }
}
