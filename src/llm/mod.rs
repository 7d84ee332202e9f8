//! Model Backends
//!
//! Provides a unified interface for the language model that writes the cards.

use crate::config::Config;
use crate::error::FlashResult;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

pub mod anthropic;

pub use anthropic::AnthropicClient;

/// Trait for completion backends
#[async_trait]
pub trait CompletionBackend: Send + Sync + std::fmt::Debug {
    /// Send one prompt and return the model's text reply
    async fn complete(&self, prompt: &str) -> FlashResult<String>;

    /// Get the backend name
    fn name(&self) -> &str;
}

/// Factory to create the configured backend
pub fn create_backend(config: &Config) -> FlashResult<Arc<dyn CompletionBackend>> {
    let client = AnthropicClient::new(config)?;
    info!("🧠 Using {} (model: {})", client.name(), config.model);
    Ok(Arc::new(client))
}
