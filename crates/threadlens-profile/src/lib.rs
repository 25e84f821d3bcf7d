//! ThreadLens Profile — the six-axis trait profile and the narrative built on it.
//!
//! - [`radar`]: deterministic keyword scorer producing a [`RadarVector`].
//! - [`narrative`]: heuristic persona, traits and evidence from the scorer.
//! - [`validate`]: structural gate every candidate result passes before it
//!   can be stored as finished, whichever engine produced it.

pub mod keywords;
pub mod narrative;
pub mod radar;
pub mod types;
pub mod validate;

pub use narrative::{heuristic_analysis, summary_sentence};
pub use radar::{score_radar, score_threads, RadarBreakdown, RadarScore};
pub use types::*;
pub use validate::validate_analysis;
