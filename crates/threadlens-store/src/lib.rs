//! ThreadLens Store — durable analysis jobs and their raw transcripts.
//!
//! A job is created `pending` and moves exactly once to `done` or `error`.
//! The conditional update in [`SqliteStore`] is the only place that
//! transition happens.

pub mod schema;
pub mod sqlite;
pub mod types;

pub use sqlite::SqliteStore;
pub use types::*;
