//! Engine configuration persistence and provider selection.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use threadlens_core::{Error, Result};

use crate::types::{EngineConfigResponse, EngineConfigUpdate, LLMProvider, ResolvedProvider};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1";
pub const DEFAULT_ANTHROPIC_MODEL: &str = "claude-sonnet-4-20250514";
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.3-70b-versatile";

/// Accepted values of `preferred_provider`.
pub const PROVIDER_CHOICES: &[&str] = &["auto", "openai", "anthropic", "groq", "heuristic"];

/// Stored engine configuration (persisted to engine-config.json).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default = "default_preferred")]
    pub preferred_provider: String,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    #[serde(default)]
    pub anthropic_api_key: Option<String>,
    #[serde(default)]
    pub groq_api_key: Option<String>,
    #[serde(default = "default_openai_model")]
    pub openai_model: String,
    #[serde(default = "default_anthropic_model")]
    pub anthropic_model: String,
    #[serde(default = "default_groq_model")]
    pub groq_model: String,
    /// Path to config file for saving.
    #[serde(skip)]
    pub config_path: PathBuf,
}

fn default_preferred() -> String {
    "auto".into()
}
fn default_openai_model() -> String {
    DEFAULT_OPENAI_MODEL.into()
}
fn default_anthropic_model() -> String {
    DEFAULT_ANTHROPIC_MODEL.into()
}
fn default_groq_model() -> String {
    DEFAULT_GROQ_MODEL.into()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            preferred_provider: "auto".into(),
            openai_api_key: None,
            anthropic_api_key: None,
            groq_api_key: None,
            openai_model: DEFAULT_OPENAI_MODEL.into(),
            anthropic_model: DEFAULT_ANTHROPIC_MODEL.into(),
            groq_model: DEFAULT_GROQ_MODEL.into(),
            config_path: PathBuf::new(),
        }
    }
}

impl EngineConfig {
    /// Load config from file, falling back to env vars and defaults.
    pub fn load(config_path: &Path) -> Self {
        let mut config = Self::load_file(config_path);

        // Env vars as fallback for API keys
        if config.openai_api_key.is_none() {
            config.openai_api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        if config.anthropic_api_key.is_none() {
            config.anthropic_api_key = std::env::var("ANTHROPIC_API_KEY").ok();
        }
        if config.groq_api_key.is_none() {
            config.groq_api_key = std::env::var("GROQ_API_KEY").ok();
        }

        config
    }

    /// Load the file alone, without consulting the environment.
    pub fn load_file(config_path: &Path) -> Self {
        let mut config: EngineConfig = match std::fs::read_to_string(config_path) {
            Ok(s) => serde_json::from_str(&s).unwrap_or_else(|e| {
                warn!("Ignoring unreadable {}: {}", config_path.display(), e);
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        config.config_path = config_path.to_path_buf();
        config
    }

    /// Save config to disk.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&self.config_path, json)?;
        info!("Saved engine config to {}", self.config_path.display());
        Ok(())
    }

    /// Apply an update, merging with existing config.
    ///
    /// An empty key string clears that key.
    pub fn apply_update(&mut self, update: &EngineConfigUpdate) -> Result<()> {
        if let Some(p) = &update.preferred_provider {
            if !PROVIDER_CHOICES.contains(&p.as_str()) {
                return Err(Error::Validation(format!(
                    "preferredProvider must be one of {}",
                    PROVIDER_CHOICES.join(", ")
                )));
            }
            self.preferred_provider = p.clone();
        }
        merge_key(&mut self.openai_api_key, &update.openai_api_key);
        merge_key(&mut self.anthropic_api_key, &update.anthropic_api_key);
        merge_key(&mut self.groq_api_key, &update.groq_api_key);
        if let Some(m) = &update.openai_model {
            self.openai_model = m.clone();
        }
        if let Some(m) = &update.anthropic_model {
            self.anthropic_model = m.clone();
        }
        if let Some(m) = &update.groq_model {
            self.groq_model = m.clone();
        }
        Ok(())
    }

    /// Resolve which provider and model to use. `None` selects the
    /// heuristic engine.
    pub fn resolve_provider(&self) -> Option<ResolvedProvider> {
        let pick = |provider: LLMProvider, model: &str, key: &Option<String>| {
            key.as_ref().map(|k| ResolvedProvider {
                provider,
                model: model.to_string(),
                api_key: k.clone(),
            })
        };

        match self.preferred_provider.as_str() {
            "openai" => pick(LLMProvider::OpenAI, &self.openai_model, &self.openai_api_key),
            "anthropic" => pick(
                LLMProvider::Anthropic,
                &self.anthropic_model,
                &self.anthropic_api_key,
            ),
            "groq" => pick(LLMProvider::Groq, &self.groq_model, &self.groq_api_key),
            "auto" => {
                // Auto mode: OpenAI > Anthropic > Groq
                pick(LLMProvider::OpenAI, &self.openai_model, &self.openai_api_key)
                    .or_else(|| {
                        pick(
                            LLMProvider::Anthropic,
                            &self.anthropic_model,
                            &self.anthropic_api_key,
                        )
                    })
                    .or_else(|| pick(LLMProvider::Groq, &self.groq_model, &self.groq_api_key))
            }
            _ => None,
        }
    }

    /// Build the public config response (no API keys exposed).
    pub fn to_response(&self) -> EngineConfigResponse {
        let resolved = self.resolve_provider();
        EngineConfigResponse {
            preferred_provider: self.preferred_provider.clone(),
            openai_configured: self.openai_api_key.is_some(),
            anthropic_configured: self.anthropic_api_key.is_some(),
            groq_configured: self.groq_api_key.is_some(),
            openai_model: self.openai_model.clone(),
            anthropic_model: self.anthropic_model.clone(),
            groq_model: self.groq_model.clone(),
            active_engine: resolved
                .as_ref()
                .map(|r| r.model.clone())
                .unwrap_or_else(|| "heuristic".to_string()),
            active_provider: resolved.map(|r| r.provider.to_string()),
        }
    }
}

fn merge_key(slot: &mut Option<String>, update: &Option<String>) {
    match update.as_deref() {
        Some("") => *slot = None,
        Some(k) => *slot = Some(k.to_string()),
        None => {}
    }
}
