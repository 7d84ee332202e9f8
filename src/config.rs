use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::core::phrase::DEFAULT_CONTEXT_BUDGET;
use crate::core::Mode;
use crate::error::FlashError;

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "FLASHGEN_CONFIG";

/// Environment variable consulted when no API key is configured
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

pub const DEFAULT_MODEL: &str = "claude-3-5-sonnet-20240620";
pub const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // API
    pub api_key: String,
    pub model: String,
    pub api_url: String,
    pub max_tokens: u32,

    // Prompts (empty = built-in template)
    pub flashcard_prompt: String,
    pub explain_prompt: String,
    pub language_prompt: String,

    // Language mode
    pub translation_language: String,
    pub target_language: String,
    pub context_budget: usize,

    // Page integration
    pub auto_popup: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: "".to_string(),
            model: DEFAULT_MODEL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
            max_tokens: 1024,
            flashcard_prompt: "".to_string(),
            explain_prompt: "".to_string(),
            language_prompt: "".to_string(),
            translation_language: "Vietnamese".to_string(),
            target_language: "English".to_string(),
            context_budget: DEFAULT_CONTEXT_BUDGET,
            auto_popup: true,
        }
    }
}

impl Config {
    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        Self::load_from(&config_path())
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            match serde_json::from_str(&content) {
                Ok(config) => config,
                Err(e) => {
                    // Graceful degradation: log warning and use defaults
                    tracing::warn!("⚠️ Config file corrupted or invalid, using defaults: {}", e);
                    // Backup corrupt file for debugging
                    let backup_path = path.with_extension("json.corrupt");
                    let _ = std::fs::rename(path, &backup_path);
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        if config.api_key.is_empty() {
            if let Ok(key) = std::env::var(API_KEY_ENV) {
                config.api_key = key.trim().to_string();
            }
        }

        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&config_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Drop the stored settings and return to defaults
    pub fn reset() -> Result<Self> {
        let path = config_path();
        if path.exists() {
            std::fs::remove_file(&path)?;
            tracing::info!("🧹 Settings cleared: {:?}", path);
        }
        Ok(Self::default())
    }

    /// User prompt override for a mode, if one is set
    pub fn prompt_override(&self, mode: Mode) -> Option<&str> {
        let prompt = match mode {
            Mode::Flashcard => &self.flashcard_prompt,
            Mode::Explain => &self.explain_prompt,
            Mode::Language => &self.language_prompt,
        };
        let prompt = prompt.trim();
        (!prompt.is_empty()).then_some(prompt)
    }

    /// Set a field by its JSON key, as used by `flashgen config set`
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), FlashError> {
        let mut json = serde_json::to_value(&*self)?;
        let slot = json
            .get_mut(key)
            .ok_or_else(|| FlashError::Config(format!("unknown setting '{}'", key)))?;

        let replacement = match &*slot {
            serde_json::Value::Bool(_) => serde_json::Value::Bool(
                value
                    .parse()
                    .map_err(|_| FlashError::Config(format!("'{}' expects true or false", key)))?,
            ),
            serde_json::Value::Number(_) => serde_json::Value::Number(
                value
                    .parse::<u64>()
                    .map_err(|_| FlashError::Config(format!("'{}' expects a number", key)))?
                    .into(),
            ),
            _ => serde_json::Value::String(value.to_string()),
        };
        *slot = replacement;

        *self = serde_json::from_value(json)?;
        Ok(())
    }

    /// Settings as JSON with the API key masked
    pub fn redacted(&self) -> serde_json::Value {
        let mut json = serde_json::to_value(self).unwrap_or_default();
        if !self.api_key.is_empty() {
            let tail: String = self
                .api_key
                .chars()
                .rev()
                .take(4)
                .collect::<Vec<_>>()
                .into_iter()
                .rev()
                .collect();
            json["api_key"] = serde_json::Value::String(format!("…{}", tail));
        }
        json
    }
}

pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("flashgen")
        .join("config.json")
}

/// Default location of the collection database
pub fn collection_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("flashgen")
        .join("collections.db")
}
