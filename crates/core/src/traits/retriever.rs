//! Passage retrieval trait

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Retrieval failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RetrievalError {
    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),
}

impl From<RetrievalError> for crate::Error {
    fn from(err: RetrievalError) -> Self {
        match err {
            RetrievalError::IndexUnavailable(msg) => crate::Error::IndexUnavailable(msg),
        }
    }
}

/// A statute passage returned by the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Passage {
    pub text: String,
    /// Citation label, e.g. "PPC Section 420"
    pub source: String,
    /// Relevance score, higher is better
    pub score: f32,
}

impl Passage {
    pub fn new(text: impl Into<String>, source: impl Into<String>, score: f32) -> Self {
        Self {
            text: text.into(),
            source: source.into(),
            score,
        }
    }
}

/// Statute index interface
///
/// # Example
///
/// ```ignore
/// let passages = retriever.search("section 420 cheating", 5).await?;
/// for p in passages {
///     println!("{}: {}", p.score, p.source);
/// }
/// ```
#[async_trait]
pub trait ContextRetriever: Send + Sync + 'static {
    /// Return at most `k` passages. Order is not guaranteed.
    async fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>, RetrievalError>;

    /// Get retriever name for logging
    fn name(&self) -> &str;
}
