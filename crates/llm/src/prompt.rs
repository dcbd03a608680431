//! Prompt Building
//!
//! Chat message types sent to backends, and a builder for the sectioned
//! single-turn instruction prompts the legal pipeline submits.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Chat message role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for ChatRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChatRole::System => write!(f, "system"),
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// Chat message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Builder for a single instruction prompt made of labelled blocks
///
/// ```ignore
/// let prompt = PromptBuilder::new("You are a Pakistani legal expert.")
///     .field("Query", "What is section 420?")
///     .section("Relevant Legal Context", &context)
///     .closing("Keep your response factual.")
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    blocks: Vec<String>,
}

impl PromptBuilder {
    /// Start a prompt with its opening instruction
    pub fn new(instruction: impl Into<String>) -> Self {
        let instruction = instruction.into();
        let mut blocks = Vec::new();
        if !instruction.trim().is_empty() {
            blocks.push(instruction.trim().to_string());
        }
        Self { blocks }
    }

    /// Add a one-line `Label: value` field
    pub fn field(mut self, label: &str, value: impl fmt::Display) -> Self {
        self.blocks.push(format!("{}: {}", label, value));
        self
    }

    /// Add a headed block; empty bodies are skipped
    pub fn section(mut self, heading: &str, body: &str) -> Self {
        let body = body.trim();
        if !body.is_empty() {
            self.blocks.push(format!("{}:\n{}", heading, body));
        }
        self
    }

    /// Add a headed numbered list
    pub fn numbered<S: AsRef<str>>(mut self, heading: &str, items: &[S]) -> Self {
        if items.is_empty() {
            return self;
        }
        let list = items
            .iter()
            .enumerate()
            .map(|(i, item)| format!("{}. {}", i + 1, item.as_ref()))
            .collect::<Vec<_>>()
            .join("\n");
        self.blocks.push(format!("{}\n{}", heading, list));
        self
    }

    /// Add a closing instruction
    pub fn closing(mut self, text: &str) -> Self {
        if !text.trim().is_empty() {
            self.blocks.push(text.trim().to_string());
        }
        self
    }

    /// Number of blocks added so far
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Estimate token count
    pub fn estimate_tokens(&self) -> usize {
        self.blocks.iter().map(|b| b.len() / 4).sum()
    }

    /// Render the prompt text
    pub fn build(self) -> String {
        self.blocks.join("\n\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let msg = ChatMessage::user("Hello");
        assert_eq!(msg.role, ChatRole::User);
        assert_eq!(msg.role.to_string(), "user");
    }

    #[test]
    fn test_prompt_builder_layout() {
        let prompt = PromptBuilder::new("You are a legal expert.")
            .field("Query", "What is section 420?")
            .field("Legal Domain", "criminal")
            .section("Relevant Legal Context", "Whoever cheats...")
            .numbered("Provide:", &["Applicable law", "Punishment"])
            .closing("Be factual.")
            .build();

        assert!(prompt.starts_with("You are a legal expert."));
        assert!(prompt.contains("Query: What is section 420?"));
        assert!(prompt.contains("Relevant Legal Context:\nWhoever cheats..."));
        assert!(prompt.contains("1. Applicable law\n2. Punishment"));
        assert!(prompt.ends_with("Be factual."));
    }

    #[test]
    fn test_empty_sections_skipped() {
        let builder = PromptBuilder::new("Instruction")
            .section("Conversation So Far", "   ")
            .numbered::<&str>("Steps", &[]);
        assert_eq!(builder.block_count(), 1);
    }
}
