//! Generation Pipeline
//!
//! Selection + mode in, records out: builds the prompt, calls the backend once
//! and parses the reply. Language mode sends the selected word together with
//! its sentence context.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::core::{context_for_word, parse_response, FlashcardRecord, Mode, TextSegments};
use crate::error::{FlashError, FlashResult};
use crate::llm::CompletionBackend;
use crate::prompt::{build_prompt, PromptVars};

/// One generation request as received from the host
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub mode: Mode,
    /// The selected text
    pub text: String,
    /// Word to define in language mode (defaults to the selection)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word: Option<String>,
    /// Sentence context with the word marked (defaults to the selection)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

impl GenerationRequest {
    pub fn new(mode: Mode, text: impl Into<String>) -> Self {
        Self {
            mode,
            text: text.into(),
            word: None,
            context: None,
        }
    }

    pub fn with_word(mut self, word: impl Into<String>) -> Self {
        self.word = Some(word.into());
        self
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    /// Fill the context from surrounding page text
    pub fn with_page_text(mut self, page: &TextSegments, budget: usize) -> Self {
        let word = self.word().to_string();
        match context_for_word(page, &word, budget) {
            Some(window) => self.context = Some(window.phrase),
            None => warn!("⚠️ '{}' not found in page text, sending without context", word),
        }
        self
    }

    /// The word a language card is about
    pub fn word(&self) -> &str {
        self.word
            .as_deref()
            .map(str::trim)
            .filter(|w| !w.is_empty())
            .unwrap_or_else(|| self.text.trim())
    }
}

/// Result shape handed back to the host: `{success, flashcards, error}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationOutcome {
    pub success: bool,
    #[serde(default)]
    pub flashcards: Vec<FlashcardRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<FlashResult<Vec<FlashcardRecord>>> for GenerationOutcome {
    fn from(result: FlashResult<Vec<FlashcardRecord>>) -> Self {
        match result {
            Ok(flashcards) => Self {
                success: true,
                flashcards,
                error: None,
            },
            Err(e) => Self {
                success: false,
                flashcards: Vec::new(),
                error: Some(e.to_string()),
            },
        }
    }
}

/// Runs requests against a backend with the user's settings
#[derive(Debug, Clone)]
pub struct Generator {
    backend: Arc<dyn CompletionBackend>,
    config: Config,
}

impl Generator {
    pub fn new(backend: Arc<dyn CompletionBackend>, config: Config) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Prompt that would be sent for `request`
    pub fn prompt_for(&self, request: &GenerationRequest) -> String {
        let word = request.word();
        let context = request
            .context
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .unwrap_or(request.text.as_str());

        build_prompt(
            &self.config,
            request.mode,
            &PromptVars {
                text: request.text.trim(),
                word,
                context: context.trim(),
                translation_language: &self.config.translation_language,
                target_language: &self.config.target_language,
            },
        )
    }

    /// Generate records for one request
    pub async fn generate(&self, request: &GenerationRequest) -> FlashResult<Vec<FlashcardRecord>> {
        if request.text.trim().is_empty() {
            return Err(FlashError::EmptySelection);
        }

        let prompt = self.prompt_for(request);
        debug!("📝 Prompt ({}): {}", request.mode, prompt);

        let content = self.backend.complete(&prompt).await?;
        let records = parse_response(&content, request.mode, request.word());

        info!(
            "🃏 {} {} record(s) from {}",
            records.len(),
            request.mode,
            self.backend.name()
        );
        Ok(records)
    }

    /// Like [`generate`](Self::generate) but never fails
    pub async fn generate_outcome(&self, request: &GenerationRequest) -> GenerationOutcome {
        let result = self.generate(request).await;
        if let Err(ref e) = result {
            warn!("❌ Generation failed: {}", e);
        }
        result.into()
    }
}
