//! ThreadLens Reason — produces candidate analyses from normalized threads.
//!
//! An external LLM (OpenAI, Anthropic or Groq) is asked for a JSON document
//! matching the `candidate_profile_v1` schema. When no provider is
//! configured the deterministic heuristic engine answers instead. Neither
//! engine's output is trusted: callers validate it before storing.

pub mod config;
pub mod engine;
pub mod heuristic;
pub mod llm;
pub mod prompt;
pub mod schema;
pub mod types;

pub use config::EngineConfig;
pub use engine::{FallbackEngine, ReasoningEngine};
pub use heuristic::HeuristicEngine;
pub use llm::LlmEngine;
pub use types::*;

use std::sync::Arc;

use parking_lot::RwLock;

/// Build the engine used by the worker.
///
/// The external provider is re-resolved on every call, so configuration
/// changes apply to the next job without a restart.
pub fn create_engine(config: Arc<RwLock<EngineConfig>>) -> Arc<dyn ReasoningEngine> {
    let engine = FallbackEngine::new(LlmEngine::new(config), HeuristicEngine);
    match engine.active_provider() {
        Some(provider) => tracing::info!("Reasoning engine: {}", provider),
        None => tracing::info!("No LLM provider configured. Using heuristic engine."),
    }
    Arc::new(engine)
}
