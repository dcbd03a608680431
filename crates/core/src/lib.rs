//! Core traits and types for the legal assistant agent
//!
//! This crate provides foundational types used across all other crates:
//! - Language definitions (English primary, Urdu secondary) and script detection
//! - Legal classification labels (intent, domain)
//! - Conversation message types
//! - Collaborator traits for the language model and the passage index
//! - Error types

pub mod conversation;
pub mod error;
pub mod language;
pub mod legal;
pub mod traits;

pub use conversation::{Message, MessageMetadata, Role};
pub use error::{Error, Result};
pub use language::{Language, Script};
pub use legal::{Domain, Intent};

pub use traits::{ContextRetriever, LanguageModel, ModelError, Passage, RetrievalError};
