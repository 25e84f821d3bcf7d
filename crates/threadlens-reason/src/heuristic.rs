//! Deterministic engine built on the keyword scorer.

use async_trait::async_trait;
use serde_json::Value;

use threadlens_core::Result;
use threadlens_ingest::Thread;
use threadlens_profile::heuristic_analysis;

use crate::engine::ReasoningEngine;

pub struct HeuristicEngine;

#[async_trait]
impl ReasoningEngine for HeuristicEngine {
    fn name(&self) -> String {
        "heuristic".to_string()
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn analyze(&self, threads: &[Thread]) -> Result<Value> {
        Ok(serde_json::to_value(heuristic_analysis(threads))?)
    }
}
