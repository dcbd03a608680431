//! Legal Query Orchestration
//!
//! Features:
//! - Language detection (English / Urdu, Perso-Arabic and romanized)
//! - Casual vs substantive intent and legal domain classification
//! - Retrieval-augmented analysis and recommendations with template fallbacks
//! - Specialist referral and sectioned response compilation
//! - Per-session conversation memory with sidebar summaries
//! - Chunked re-rendering of compiled answers for streaming

pub mod agent;
pub mod casual;
pub mod compiler;
pub mod domain;
pub mod intent;
pub mod language;
pub mod memory;
mod patterns;
pub mod recommendation;
pub mod referral;
pub mod streaming;
pub mod synthesizer;

pub use agent::{LegalAgent, TurnRequest, TurnResponse};
pub use casual::CasualResponder;
pub use compiler::{CompiledResponse, ResponseCompiler, ResponseHeader, ResponseSection, SectionKind};
pub use domain::{section_references, DomainClassifier, StatuteRef};
pub use intent::{CasualKind, IntentClassifier};
pub use language::{Detection, LanguageDetector};
pub use memory::{ConversationMemory, SidebarSummary};
pub use recommendation::RecommendationGenerator;
pub use referral::{ReferralAdvisor, SpecialistCategory};
pub use streaming::{ChunkKind, ResponseChunk, ResponseChunks, StreamingResponseBuilder};
pub use synthesizer::{AnalysisSynthesizer, Synthesis};

use thiserror::Error;

/// Agent errors
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Unknown session: {0}")]
    UnknownSession(String),

    #[error("Session capacity exceeded ({0} sessions)")]
    CapacityExceeded(usize),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Index unavailable: {0}")]
    IndexUnavailable(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Timeout")]
    Timeout,
}

impl From<legal_agent_core::ModelError> for AgentError {
    fn from(err: legal_agent_core::ModelError) -> Self {
        match err {
            legal_agent_core::ModelError::Timeout => AgentError::Timeout,
            other => AgentError::Model(other.to_string()),
        }
    }
}

impl From<legal_agent_core::RetrievalError> for AgentError {
    fn from(err: legal_agent_core::RetrievalError) -> Self {
        AgentError::IndexUnavailable(err.to_string())
    }
}

impl From<legal_agent_rag::RagError> for AgentError {
    fn from(err: legal_agent_rag::RagError) -> Self {
        AgentError::IndexUnavailable(err.to_string())
    }
}

impl From<legal_agent_llm::LlmError> for AgentError {
    fn from(err: legal_agent_llm::LlmError) -> Self {
        match err {
            legal_agent_llm::LlmError::Timeout => AgentError::Timeout,
            other => AgentError::Model(other.to_string()),
        }
    }
}

impl From<AgentError> for legal_agent_core::Error {
    fn from(err: AgentError) -> Self {
        use legal_agent_core::Error;
        match err {
            AgentError::UnknownSession(id) => Error::UnknownSession(id),
            AgentError::InvalidInput(msg) => Error::InvalidInput(msg),
            AgentError::IndexUnavailable(msg) => Error::IndexUnavailable(msg),
            AgentError::Model(msg) => Error::ModelUnavailable(msg),
            AgentError::Timeout => Error::ModelTimeout,
            AgentError::CapacityExceeded(max) => {
                Error::InvalidInput(format!("session capacity of {} reached", max))
            }
        }
    }
}
