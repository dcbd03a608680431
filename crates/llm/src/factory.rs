//! LLM Factory
//!
//! Creates a `LanguageModel` from `LlmConfig`.

use std::sync::Arc;

use legal_agent_config::{LlmConfig, LlmProvider};
use legal_agent_core::LanguageModel;

use crate::adapter::LanguageModelAdapter;
use crate::backend::{BackendConfig, OllamaBackend, OpenAiCompatibleBackend};
use crate::LlmError;

/// Build the configured backend behind the core trait
pub fn create_backend(config: &LlmConfig) -> Result<Arc<dyn LanguageModel>, LlmError> {
    let backend_config = BackendConfig::from(config);

    tracing::info!(
        provider = ?config.provider,
        model = %config.model,
        endpoint = %config.endpoint,
        "Creating LLM backend"
    );

    let model: Arc<dyn LanguageModel> = match config.provider {
        LlmProvider::Ollama => {
            Arc::new(LanguageModelAdapter::new(OllamaBackend::new(backend_config)?))
        }
        LlmProvider::OpenAiCompatible => {
            let api_key = backend_config
                .api_key
                .clone()
                .or_else(|| std::env::var("GROQ_API_KEY").ok())
                .or_else(|| std::env::var("OPENAI_API_KEY").ok());
            let backend = OpenAiCompatibleBackend::new(BackendConfig {
                api_key,
                ..backend_config
            })?;
            Arc::new(LanguageModelAdapter::new(backend))
        }
    };

    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama() {
        let model = create_backend(&LlmConfig::default()).unwrap();
        assert_eq!(model.model_name(), LlmConfig::default().model);
    }

    #[test]
    fn test_create_local_openai_compatible() {
        let config = LlmConfig {
            provider: LlmProvider::OpenAiCompatible,
            endpoint: "http://localhost:8001/v1".to_string(),
            model: "local-model".to_string(),
            ..Default::default()
        };
        let model = create_backend(&config).unwrap();
        assert_eq!(model.model_name(), "local-model");
    }
}
