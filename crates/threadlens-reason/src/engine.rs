//! Reasoning engine trait and the provider-or-heuristic selector.

use async_trait::async_trait;
use serde_json::Value;

use threadlens_core::Result;
use threadlens_ingest::Thread;

use crate::heuristic::HeuristicEngine;
use crate::llm::LlmEngine;

/// Given normalized threads, return a candidate analysis document.
///
/// The document is unvalidated. Unreachable or failing engines return
/// `Error::Transport`; unparsable output returns `Error::SchemaViolation`.
#[async_trait]
pub trait ReasoningEngine: Send + Sync {
    /// Name of the engine that will answer the next call.
    fn name(&self) -> String;

    /// Whether the engine can currently answer.
    fn is_available(&self) -> bool;

    async fn analyze(&self, threads: &[Thread]) -> Result<Value>;
}

/// Uses the external engine when a provider is configured and the
/// heuristic engine otherwise. A failing external call is reported, never
/// replaced by a heuristic answer.
pub struct FallbackEngine {
    external: LlmEngine,
    fallback: HeuristicEngine,
}

impl FallbackEngine {
    pub fn new(external: LlmEngine, fallback: HeuristicEngine) -> Self {
        Self { external, fallback }
    }

    pub fn active_provider(&self) -> Option<String> {
        self.external
            .is_available()
            .then(|| self.external.name())
    }
}

#[async_trait]
impl ReasoningEngine for FallbackEngine {
    fn name(&self) -> String {
        self.active_provider().unwrap_or_else(|| self.fallback.name())
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn analyze(&self, threads: &[Thread]) -> Result<Value> {
        if self.external.is_available() {
            self.external.analyze(threads).await
        } else {
            self.fallback.analyze(threads).await
        }
    }
}
