//! External LLM engine.
//!
//! OpenAI gets a strict `json_schema` response format. Groq uses the
//! OpenAI-compatible endpoint in `json_object` mode. Anthropic has no schema
//! mode, so the schema is inlined into the prompt.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::{debug, warn};

use threadlens_core::{Error, Result};
use threadlens_ingest::Thread;

use crate::config::EngineConfig;
use crate::engine::ReasoningEngine;
use crate::prompt::{strip_code_fence, user_message, SYSTEM_PROMPT};
use crate::schema::{response_schema, SCHEMA_NAME};
use crate::types::{LLMProvider, ResolvedProvider};

const OPENAI_URL: &str = "https://api.openai.com/v1/chat/completions";
const GROQ_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const ANTHROPIC_URL: &str = "https://api.anthropic.com/v1/messages";
const MAX_TOKENS: usize = 4096;
const TEMPERATURE: f64 = 0.2;

pub struct LlmEngine {
    client: Client,
    config: Arc<RwLock<EngineConfig>>,
}

impl LlmEngine {
    pub fn new(config: Arc<RwLock<EngineConfig>>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    async fn call_openai_compat(
        &self,
        url: &str,
        resolved: &ResolvedProvider,
        threads: &[Thread],
    ) -> Result<String> {
        let response_format = match resolved.provider {
            LLMProvider::OpenAI => json!({
                "type": "json_schema",
                "json_schema": {
                    "name": SCHEMA_NAME,
                    "strict": true,
                    "schema": response_schema(),
                }
            }),
            _ => json!({"type": "json_object"}),
        };
        let schema_in_prompt = match resolved.provider {
            LLMProvider::OpenAI => None,
            _ => Some(response_schema()),
        };

        let body = json!({
            "model": resolved.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": user_message(threads, schema_in_prompt.as_ref())},
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
            "response_format": response_format,
        });

        debug!("Requesting analysis from {} with model {}", url, resolved.model);

        let response = self
            .client
            .post(url)
            .header("Authorization", format!("Bearer {}", resolved.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Request failed: {}", e)))?;

        let parsed = read_json(response).await?;
        parsed["choices"][0]["message"]["content"]
            .as_str()
            .map(str::to_string)
            .ok_or_else(|| Error::Transport("Response has no message content".into()))
    }

    async fn call_anthropic(&self, resolved: &ResolvedProvider, threads: &[Thread]) -> Result<String> {
        let schema = response_schema();
        let body = json!({
            "model": resolved.model,
            "system": SYSTEM_PROMPT,
            "messages": [
                {"role": "user", "content": user_message(threads, Some(&schema))},
            ],
            "temperature": TEMPERATURE,
            "max_tokens": MAX_TOKENS,
        });

        debug!("Requesting analysis from Anthropic with model {}", resolved.model);

        let response = self
            .client
            .post(ANTHROPIC_URL)
            .header("x-api-key", &resolved.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Request failed: {}", e)))?;

        let parsed = read_json(response).await?;
        parsed["content"]
            .as_array()
            .and_then(|blocks| blocks.iter().find_map(|b| b["text"].as_str()))
            .map(str::to_string)
            .ok_or_else(|| Error::Transport("Response has no text content".into()))
    }
}

async fn read_json(response: reqwest::Response) -> Result<Value> {
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        return Err(Error::Transport(format!("API error {}: {}", status, body)));
    }
    response
        .json::<Value>()
        .await
        .map_err(|e| Error::Transport(format!("Unreadable response body: {}", e)))
}

/// Parse the model's reply into a JSON document.
pub fn parse_reply(reply: &str) -> Result<Value> {
    serde_json::from_str(strip_code_fence(reply))
        .map_err(|e| Error::SchemaViolation(format!("Engine output is not JSON: {}", e)))
}

#[async_trait]
impl ReasoningEngine for LlmEngine {
    fn name(&self) -> String {
        match self.config.read().resolve_provider() {
            Some(r) => format!("{}/{}", r.provider, r.model),
            None => "llm (unconfigured)".to_string(),
        }
    }

    fn is_available(&self) -> bool {
        self.config.read().resolve_provider().is_some()
    }

    async fn analyze(&self, threads: &[Thread]) -> Result<Value> {
        // Resolve once and release the lock before any await.
        let resolved = self
            .config
            .read()
            .resolve_provider()
            .ok_or_else(|| Error::Config("No LLM provider configured".into()))?;

        let reply = match resolved.provider {
            LLMProvider::OpenAI => self.call_openai_compat(OPENAI_URL, &resolved, threads).await?,
            LLMProvider::Groq => self.call_openai_compat(GROQ_URL, &resolved, threads).await?,
            LLMProvider::Anthropic => self.call_anthropic(&resolved, threads).await?,
        };

        parse_reply(&reply).map_err(|e| {
            warn!("{} returned unparsable output ({} bytes)", resolved.provider, reply.len());
            e
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_reply() {
        let doc = parse_reply("```json\n{\"persona_summary\": \"x\"}\n```").unwrap();
        assert_eq!(doc["persona_summary"], "x");

        let err = parse_reply("Sorry, I cannot help with that.").unwrap_err();
        assert!(matches!(err, Error::SchemaViolation(_)));
    }

    #[tokio::test]
    async fn test_unconfigured_is_config_error() {
        let engine = LlmEngine::new(Arc::new(RwLock::new(EngineConfig::default())));
        assert!(!engine.is_available());
        let threads = vec![Thread::from_questions("a.txt", vec!["q".into()])];
        assert!(matches!(
            engine.analyze(&threads).await,
            Err(Error::Config(_))
        ));
    }
}
