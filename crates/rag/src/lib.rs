//! Statute passage retrieval
//!
//! Features:
//! - In-memory BM25 keyword index over statute passages (JSON/YAML corpus)
//! - Core `ContextRetriever` trait implementation
//! - Domain-aware query expansion with English / Roman Urdu / Urdu terms
//! - Passage ranking and bounded context assembly with confidence levels

pub mod context;
pub mod index;
pub mod query_expansion;

pub use context::{rank_passages, Confidence, RetrievedContext, CONTEXT_SEPARATOR, NO_CONTEXT};
pub use index::{IndexConfig, IndexedPassage, KeywordIndex};
pub use query_expansion::{ExpandedQuery, QueryExpander, TermSource, WeightedTerm};

use legal_agent_core::RetrievalError;
use thiserror::Error;

/// RAG errors
#[derive(Error, Debug)]
pub enum RagError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Index error: {0}")]
    Index(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<serde_json::Error> for RagError {
    fn from(err: serde_json::Error) -> Self {
        RagError::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for RagError {
    fn from(err: serde_yaml::Error) -> Self {
        RagError::Parse(err.to_string())
    }
}

impl From<RagError> for RetrievalError {
    fn from(err: RagError) -> Self {
        RetrievalError::IndexUnavailable(err.to_string())
    }
}

impl From<RagError> for legal_agent_core::Error {
    fn from(err: RagError) -> Self {
        legal_agent_core::Error::IndexUnavailable(err.to_string())
    }
}
