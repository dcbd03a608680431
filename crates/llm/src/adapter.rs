//! Language Model adapter
//!
//! Bridges the chat-oriented `LlmBackend` trait to the single-prompt core
//! `LanguageModel` trait used by the pipeline.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use legal_agent_core::{LanguageModel, ModelError};

use crate::backend::LlmBackend;
use crate::prompt::ChatMessage;
use crate::LlmError;

/// Adapter that wraps an LlmBackend to implement the core LanguageModel trait.
///
/// # Example
///
/// ```ignore
/// let backend = OllamaBackend::new(config)?;
/// let model: Arc<dyn LanguageModel> = Arc::new(LanguageModelAdapter::new(backend));
/// ```
pub struct LanguageModelAdapter {
    backend: Arc<dyn LlmBackend>,
    model_name: String,
    system_prompt: Option<String>,
}

impl LanguageModelAdapter {
    pub fn new<B: LlmBackend + 'static>(backend: B) -> Self {
        Self::from_arc(Arc::new(backend))
    }

    pub fn from_arc(backend: Arc<dyn LlmBackend>) -> Self {
        let model_name = backend.model_name().to_string();
        Self {
            backend,
            model_name,
            system_prompt: None,
        }
    }

    /// Prepend a system message to every completion
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    fn messages_for(&self, prompt: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &self.system_prompt {
            messages.push(ChatMessage::system(system.clone()));
        }
        messages.push(ChatMessage::user(prompt));
        messages
    }
}

#[async_trait]
impl LanguageModel for LanguageModelAdapter {
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, ModelError> {
        let messages = self.messages_for(prompt);

        let result = match tokio::time::timeout(timeout, self.backend.generate(&messages)).await {
            Ok(result) => result.map_err(ModelError::from)?,
            Err(_) => {
                tracing::warn!(model = %self.model_name, timeout_ms = timeout.as_millis() as u64, "Completion timed out");
                return Err(ModelError::Timeout);
            }
        };

        tracing::debug!(
            model = %self.model_name,
            tokens = result.tokens,
            elapsed_ms = result.total_time_ms,
            "Completion finished"
        );

        let text = result.text.trim();
        if text.is_empty() {
            return Err(LlmError::InvalidResponse("empty completion".to_string()).into());
        }
        Ok(text.to_string())
    }

    async fn is_available(&self) -> bool {
        self.backend.is_available().await
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
