//! ThreadLens Core — error taxonomy, configuration, data paths.

pub mod config;
pub mod error;

pub use config::{AnalysisLimits, DataPaths, PollPolicy, ThreadLensConfig};
pub use error::{Error, Result};
