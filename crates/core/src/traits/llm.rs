//! Language model trait

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Failure modes of a completion call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("Model unavailable: {0}")]
    Unavailable(String),

    #[error("Model timed out")]
    Timeout,
}

impl From<ModelError> for crate::Error {
    fn from(err: ModelError) -> Self {
        match err {
            ModelError::Unavailable(msg) => crate::Error::ModelUnavailable(msg),
            ModelError::Timeout => crate::Error::ModelTimeout,
        }
    }
}

/// Language model interface
///
/// A completion is one prompt in, one text out. Callers bound every call
/// with `timeout`; implementations must return `ModelError::Timeout` rather
/// than block past it.
#[async_trait]
pub trait LanguageModel: Send + Sync + 'static {
    /// Complete a prompt within `timeout`
    async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, ModelError>;

    /// Check if the backend is reachable
    async fn is_available(&self) -> bool {
        true
    }

    /// Get model name for logging
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockLlm;

    #[async_trait]
    impl LanguageModel for MockLlm {
        async fn complete(&self, prompt: &str, timeout: Duration) -> Result<String, ModelError> {
            if timeout.is_zero() {
                return Err(ModelError::Timeout);
            }
            Ok(format!("echo: {}", prompt))
        }

        fn model_name(&self) -> &str {
            "mock-llm"
        }
    }

    #[tokio::test]
    async fn test_mock_llm() {
        let llm = MockLlm;
        assert!(llm.is_available().await);
        assert_eq!(llm.model_name(), "mock-llm");

        let text = llm.complete("Hello", Duration::from_secs(1)).await.unwrap();
        assert_eq!(text, "echo: Hello");

        let err = llm.complete("Hello", Duration::ZERO).await.unwrap_err();
        assert_eq!(err, ModelError::Timeout);
    }

    #[test]
    fn test_model_error_converts() {
        let err: crate::Error = ModelError::Unavailable("connection refused".into()).into();
        assert!(matches!(err, crate::Error::ModelUnavailable(_)));
    }
}
