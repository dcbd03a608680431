//! Application State
//!
//! Shared state across all handlers.

use std::sync::Arc;

use legal_agent_agent::{ConversationMemory, LegalAgent};
use legal_agent_config::Settings;
use legal_agent_core::{ContextRetriever, LanguageModel};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub agent: Arc<LegalAgent>,
    pub memory: Arc<ConversationMemory>,
}

impl AppState {
    /// Build the pipeline and its memory store from settings
    pub fn new(
        config: Settings,
        retriever: Arc<dyn ContextRetriever>,
        model: Arc<dyn LanguageModel>,
    ) -> Self {
        let memory = Arc::new(ConversationMemory::new(config.memory.clone()));
        let agent = LegalAgent::from_settings(&config, Arc::clone(&memory), retriever, model);

        tracing::info!(
            model = agent.model_name(),
            retriever = agent.retriever_name(),
            max_sessions = config.memory.max_sessions,
            "Initialized legal agent"
        );

        Self {
            config: Arc::new(config),
            agent: Arc::new(agent),
            memory,
        }
    }
}
