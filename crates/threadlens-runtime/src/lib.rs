//! ThreadLens Runtime — the submit / work / poll pipeline.
//!
//! Submission normalizes transcripts, creates a pending job and queues it on
//! an mpsc channel without waiting. A dispatcher task drains the channel and
//! runs each job on its own task under a concurrency limit. Callers learn
//! the outcome only by polling.

pub mod coordinator;
pub mod poll;
pub mod reaper;
pub mod types;
pub mod worker;

pub use coordinator::Coordinator;
pub use poll::{poll, wait_for_terminal, PollResponse};
pub use reaper::{expire_interrupted, start_reaper};
pub use types::*;
pub use worker::{start_analysis_worker, Worker};
