//! Conversation message types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Domain, Intent};

/// Message author
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Label used in prompt transcripts
    pub fn transcript_label(&self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Assistant => "Assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Assistant => write!(f, "assistant"),
        }
    }
}

/// Classification attached to a message
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub intent: Option<Intent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
}

impl MessageMetadata {
    pub fn casual() -> Self {
        Self {
            intent: Some(Intent::Casual),
            domain: None,
        }
    }

    pub fn substantive(domain: Domain) -> Self {
        Self {
            intent: Some(Intent::Substantive),
            domain: Some(domain),
        }
    }

    pub fn is_substantive(&self) -> bool {
        self.intent == Some(Intent::Substantive)
    }
}

/// A message stored in a session. Never modified after it is appended.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
    #[serde(default)]
    pub metadata: MessageMetadata,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: impl Into<String>, metadata: Option<MessageMetadata>) -> Self {
        Self {
            role,
            content: content.into(),
            metadata: metadata.unwrap_or_default(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, None)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, None)
    }

    pub fn with_metadata(mut self, metadata: MessageMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = Message::user("What is section 420?");
        assert_eq!(msg.role, Role::User);
        assert!(msg.metadata.intent.is_none());

        let reply = Message::assistant("Section 420 covers cheating")
            .with_metadata(MessageMetadata::substantive(Domain::Criminal));
        assert!(reply.metadata.is_substantive());
        assert_eq!(reply.metadata.domain, Some(Domain::Criminal));
    }

    #[test]
    fn test_casual_metadata_has_no_domain() {
        let meta = MessageMetadata::casual();
        assert_eq!(meta.intent, Some(Intent::Casual));
        assert!(meta.domain.is_none());
    }

    #[test]
    fn test_metadata_serialization_skips_empty() {
        let json = serde_json::to_string(&MessageMetadata::casual()).unwrap();
        assert_eq!(json, r#"{"intent":"casual_chat"}"#);
    }
}
