//! Normalized thread: one transcript's questions under a stable identifier.

use serde::{Deserialize, Serialize};

use crate::normalize::normalize_transcript_with_limit;

/// One transcript, normalized. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thread {
    #[serde(rename = "threadId")]
    thread_id: String,
    questions: Vec<String>,
}

impl Thread {
    /// Normalize `raw` into a thread, keeping at most `max_questions`.
    pub fn from_transcript(thread_id: impl Into<String>, raw: &str, max_questions: usize) -> Self {
        Self {
            thread_id: thread_id.into(),
            questions: normalize_transcript_with_limit(raw, max_questions),
        }
    }

    /// Build a thread from questions that are already clean.
    pub fn from_questions(thread_id: impl Into<String>, questions: Vec<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            questions,
        }
    }

    pub fn thread_id(&self) -> &str {
        &self.thread_id
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// `(thread_id, question)` pairs in order.
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> {
        self.questions
            .iter()
            .map(move |q| (self.thread_id.as_str(), q.as_str()))
    }
}
