//! Mock Completion Backend for Testing
//!
//! Replies with a canned string and records every prompt it was sent.

use async_trait::async_trait;
use flashgen::error::{FlashError, FlashResult};
use flashgen::llm::CompletionBackend;
use std::sync::{Arc, Mutex};

/// Mock backend that records prompts
#[derive(Debug)]
pub struct MockBackend {
    /// Reply returned for every prompt
    pub reply: Arc<Mutex<String>>,
    /// All prompts that were "sent"
    pub prompts: Arc<Mutex<Vec<String>>>,
    /// Simulate an API failure on the next call
    pub should_fail: Arc<Mutex<bool>>,
}

impl MockBackend {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: Arc::new(Mutex::new(reply.to_string())),
            prompts: Arc::new(Mutex::new(Vec::new())),
            should_fail: Arc::new(Mutex::new(false)),
        }
    }

    /// Get all prompts sent so far
    pub fn get_prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }

    /// Check if a prompt containing `text` was sent
    pub fn was_prompted(&self, text: &str) -> bool {
        self.prompts.lock().unwrap().iter().any(|p| p.contains(text))
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new("")
    }
}

#[async_trait]
impl CompletionBackend for MockBackend {
    async fn complete(&self, prompt: &str) -> FlashResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        if *self.should_fail.lock().unwrap() {
            return Err(FlashError::Api {
                status: 529,
                message: "Overloaded".to_string(),
            });
        }
        Ok(self.reply.lock().unwrap().clone())
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_backend_records_prompts() {
        let mock = MockBackend::new("<A>ok</A>");
        assert_eq!(mock.complete("hello").await.unwrap(), "<A>ok</A>");
        mock.complete("world").await.unwrap();

        assert!(mock.was_prompted("hello"));
        assert!(mock.was_prompted("world"));
        assert_eq!(mock.get_prompts().len(), 2);
    }
}
