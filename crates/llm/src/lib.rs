//! Language model backends
//!
//! Features:
//! - Ollama and OpenAI-compatible chat backends (Groq, OpenAI, vLLM)
//! - Adapter from chat backends to the single-prompt `LanguageModel` trait
//! - Prompt builder for sectioned instruction prompts
//! - Factory driven by `LlmConfig`

pub mod adapter;
pub mod backend;
pub mod factory;
pub mod prompt;

pub use adapter::LanguageModelAdapter;
pub use backend::{
    BackendConfig, FinishReason, GenerationResult, LlmBackend, OllamaBackend,
    OpenAiCompatibleBackend,
};
pub use factory::create_backend;
pub use prompt::{ChatMessage, ChatRole, PromptBuilder};

use legal_agent_core::ModelError;
use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout")]
    Timeout,

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for ModelError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Timeout => ModelError::Timeout,
            other => ModelError::Unavailable(other.to_string()),
        }
    }
}

impl From<LlmError> for legal_agent_core::Error {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Timeout => legal_agent_core::Error::ModelTimeout,
            LlmError::Configuration(msg) => legal_agent_core::Error::Config(msg),
            other => legal_agent_core::Error::ModelUnavailable(other.to_string()),
        }
    }
}
