//! Collaborator traits for the legal assistant
//!
//! The pipeline depends on two external collaborators, both behind traits so
//! backends can be swapped and tests can use mocks:
//!
//! ```text
//! Language Models:
//!   - LanguageModel: single bounded prompt completion
//!
//! Retrieval:
//!   - ContextRetriever: top-k passage search over the statute index
//! ```

mod llm;
mod retriever;

pub use llm::{LanguageModel, ModelError};
pub use retriever::{ContextRetriever, Passage, RetrievalError};
