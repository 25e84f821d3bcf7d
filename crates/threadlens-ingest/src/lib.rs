//! ThreadLens Ingest — transcript normalization and question extraction.
//!
//! A transcript is one raw text blob holding a user's questions. The
//! normalizer turns it into an ordered list of cleaned questions; the
//! conversation extractor recovers questions from a full pasted
//! conversation where each question is followed by a timestamp line.

pub mod conversation;
pub mod normalize;
pub mod thread;

pub use conversation::extract_questions_from_conversation;
pub use normalize::{normalize_transcript, normalize_transcript_with_limit, MAX_QUESTIONS};
pub use thread::Thread;
