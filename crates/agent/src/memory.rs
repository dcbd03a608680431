//! Conversation Memory
//!
//! Per-session message history with derived views:
//! - Prompt context: the last N messages, each truncated
//! - Sidebar summary: recent activity, topics, message count, pinned language
//! - Pinned language reused for ambiguous utterances
//!
//! Sessions live in a sharded map; each session has its own lock so turns on
//! different sessions never contend.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use legal_agent_config::MemoryConfig;
use legal_agent_core::{Domain, Language, Message, MessageMetadata, Role};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::domain::section_references;
use crate::AgentError;

struct Session {
    messages: Vec<Message>,
    pinned_language: Option<Language>,
    topics: BTreeSet<String>,
    created_at: DateTime<Utc>,
    last_activity: DateTime<Utc>,
}

impl Session {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            messages: Vec::new(),
            pinned_language: None,
            topics: BTreeSet::new(),
            created_at: now,
            last_activity: now,
        }
    }

    fn is_idle(&self, now: DateTime<Utc>, timeout: chrono::Duration) -> bool {
        now - self.last_activity > timeout
    }

    /// Activity entry for a substantive user message
    fn activity_entry(message: &Message) -> Option<String> {
        if message.role != Role::User || !message.metadata.is_substantive() {
            return None;
        }
        if let Some(reference) = section_references(&message.content).first() {
            return Some(format!("Discussed {}", reference));
        }
        let domain = message.metadata.domain.unwrap_or(Domain::Other);
        Some(format!("Query about {} law", domain.display_name().to_lowercase()))
    }
}

/// Read-only projection of a session for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SidebarSummary {
    pub session_id: String,
    /// Most recent last
    pub recent_activity: Vec<String>,
    /// Sorted
    pub topics: Vec<String>,
    pub message_count: usize,
    pub language: Option<Language>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

/// Store of all conversation sessions
pub struct ConversationMemory {
    config: MemoryConfig,
    sessions: DashMap<String, Arc<RwLock<Session>>>,
}

impl Default for ConversationMemory {
    fn default() -> Self {
        Self::new(MemoryConfig::default())
    }
}

impl ConversationMemory {
    pub fn new(config: MemoryConfig) -> Self {
        Self {
            config,
            sessions: DashMap::new(),
        }
    }

    pub fn config(&self) -> &MemoryConfig {
        &self.config
    }

    fn session(&self, id: &str) -> Result<Arc<RwLock<Session>>, AgentError> {
        self.sessions
            .get(id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| AgentError::UnknownSession(id.to_string()))
    }

    /// Create a session if it does not exist yet
    pub fn create_session(&self, id: &str) -> Result<(), AgentError> {
        if self.sessions.contains_key(id) {
            return Ok(());
        }

        if self.sessions.len() >= self.config.max_sessions {
            self.evict_idle(Utc::now());
            if self.sessions.len() >= self.config.max_sessions {
                tracing::warn!(max = self.config.max_sessions, "Session capacity reached");
                return Err(AgentError::CapacityExceeded(self.config.max_sessions));
            }
        }

        self.sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                tracing::info!(session_id = %id, "Created session");
                Arc::new(RwLock::new(Session::new()))
            });
        Ok(())
    }

    /// Append a message to an existing session
    pub fn add_message(
        &self,
        id: &str,
        role: Role,
        text: &str,
        metadata: Option<MessageMetadata>,
    ) -> Result<(), AgentError> {
        let session = self.session(id)?;
        let message = Message::new(role, text, metadata);

        let mut session = session.write();
        if message.metadata.is_substantive() {
            if let Some(domain) = message.metadata.domain.filter(|d| *d != Domain::Other) {
                session.topics.insert(domain.as_str().to_string());
            }
            if role == Role::User {
                for reference in section_references(text) {
                    session.topics.insert(reference.label());
                }
            }
        }
        session.last_activity = message.timestamp;
        session.messages.push(message);
        Ok(())
    }

    /// Recent messages as `User: ...` / `Assistant: ...` lines, whitespace collapsed
    pub fn get_context(&self, id: &str) -> Result<String, AgentError> {
        let session = self.session(id)?;
        let session = session.read();
        let start = session.messages.len().saturating_sub(self.config.context_messages);

        Ok(session.messages[start..]
            .iter()
            .map(|m| {
                // one line per message
                let flat = m.content.split_whitespace().collect::<Vec<_>>().join(" ");
                let content: String = flat.chars().take(self.config.message_truncate_chars).collect();
                format!("{}: {}", m.role.transcript_label(), content)
            })
            .collect::<Vec<_>>()
            .join("\n"))
    }

    pub fn get_sidebar_summary(&self, id: &str) -> Result<SidebarSummary, AgentError> {
        let session = self.session(id)?;
        let session = session.read();

        let activity: Vec<String> = session
            .messages
            .iter()
            .filter_map(Session::activity_entry)
            .collect();
        let start = activity.len().saturating_sub(self.config.recent_activity_entries);

        Ok(SidebarSummary {
            session_id: id.to_string(),
            recent_activity: activity[start..].to_vec(),
            topics: session.topics.iter().cloned().collect(),
            message_count: session.messages.len(),
            language: session.pinned_language,
            created_at: session.created_at,
            last_activity: session.last_activity,
        })
    }

    /// Remove a session; returns whether it existed
    pub fn delete_session(&self, id: &str) -> bool {
        let removed = self.sessions.remove(id).is_some();
        if removed {
            tracing::info!(session_id = %id, "Deleted session");
        }
        removed
    }

    /// Pin the session language unless one is already pinned.
    /// Returns the language now pinned.
    pub fn pin_language(&self, id: &str, language: Language) -> Result<Language, AgentError> {
        let session = self.session(id)?;
        let mut session = session.write();
        Ok(*session.pinned_language.get_or_insert(language))
    }

    pub fn pinned_language(&self, id: &str) -> Result<Option<Language>, AgentError> {
        Ok(self.session(id)?.read().pinned_language)
    }

    /// All messages in insertion order
    pub fn history(&self, id: &str) -> Result<Vec<Message>, AgentError> {
        Ok(self.session(id)?.read().messages.clone())
    }

    pub fn list_sessions(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.sessions.iter().map(|e| e.key().clone()).collect();
        ids.sort();
        ids
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Drop sessions idle longer than the configured timeout (0 disables).
    /// Returns how many were removed.
    pub fn evict_idle(&self, now: DateTime<Utc>) -> usize {
        if self.config.idle_timeout_seconds == 0 {
            return 0;
        }
        let timeout = chrono::Duration::seconds(self.config.idle_timeout_seconds as i64);
        let before = self.sessions.len();
        self.sessions.retain(|id, session| {
            let keep = !session.read().is_idle(now, timeout);
            if !keep {
                tracing::info!(session_id = %id, "Expired session");
            }
            keep
        });
        before.saturating_sub(self.sessions.len())
    }

    /// Periodically evict idle sessions until the returned sender sends `true`
    pub fn start_cleanup_task(self: &Arc<Self>, interval: Duration) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let memory = Arc::clone(self);

        tokio::spawn(async move {
            let mut interval_timer = tokio::time::interval(interval);
            interval_timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = interval_timer.tick() => {
                        let removed = memory.evict_idle(Utc::now());
                        if removed > 0 {
                            tracing::info!(
                                removed,
                                remaining = memory.session_count(),
                                "Session cleanup"
                            );
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::info!("Session cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }
}
