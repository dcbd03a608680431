//! Agent configuration

use serde::{Deserialize, Serialize};

/// Pipeline behaviour configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Assistant name used in introductions
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Jurisdiction whose statutes are being explained
    #[serde(default = "default_jurisdiction")]
    pub jurisdiction: String,

    /// Language used before any confident detection ("en" or "ur")
    #[serde(default = "default_agent_language")]
    pub default_language: String,

    /// Minimum share of Arabic-block letters for an utterance to count as Urdu
    #[serde(default = "default_script_threshold")]
    pub urdu_script_threshold: f32,

    /// Casual matches on utterances this long or longer are treated as legal
    #[serde(default = "default_casual_max_words")]
    pub casual_max_words: usize,

    /// Passages fed into the analysis prompt
    #[serde(default = "default_analysis_top_k")]
    pub analysis_top_k: usize,

    /// Character budget for the passage context block
    #[serde(default = "default_max_context_chars")]
    pub max_context_chars: usize,

    /// Timeout for each model completion (milliseconds)
    #[serde(default = "default_stage_timeout_ms")]
    pub stage_timeout_ms: u64,

    /// Timeout for the passage search (milliseconds)
    #[serde(default = "default_retrieval_timeout_ms")]
    pub retrieval_timeout_ms: u64,

    /// Source labels listed under a compiled answer
    #[serde(default = "default_max_sources")]
    pub max_sources: usize,
}

fn default_agent_name() -> String {
    "Sami Ullah AI".to_string()
}
fn default_jurisdiction() -> String {
    "Pakistan".to_string()
}
fn default_agent_language() -> String {
    "en".to_string()
}
fn default_script_threshold() -> f32 {
    0.2
}
fn default_casual_max_words() -> usize {
    15
}
fn default_analysis_top_k() -> usize {
    5
}
fn default_max_context_chars() -> usize {
    3000
}
fn default_stage_timeout_ms() -> u64 {
    30_000
}
fn default_retrieval_timeout_ms() -> u64 {
    5_000
}
fn default_max_sources() -> usize {
    3
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            jurisdiction: default_jurisdiction(),
            default_language: default_agent_language(),
            urdu_script_threshold: default_script_threshold(),
            casual_max_words: default_casual_max_words(),
            analysis_top_k: default_analysis_top_k(),
            max_context_chars: default_max_context_chars(),
            stage_timeout_ms: default_stage_timeout_ms(),
            retrieval_timeout_ms: default_retrieval_timeout_ms(),
            max_sources: default_max_sources(),
        }
    }
}

/// LLM configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// LLM provider
    #[serde(default = "default_llm_provider")]
    pub provider: LlmProvider,

    /// Model name/ID
    #[serde(default = "default_llm_model")]
    pub model: String,

    /// API endpoint (Ollama base URL or OpenAI-compatible `/v1` base)
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// API key (for hosted providers)
    #[serde(default)]
    pub api_key: Option<String>,

    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Temperature for generation
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// HTTP client timeout (seconds); per-call timeouts are set by the caller
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_llm_provider() -> LlmProvider {
    LlmProvider::Ollama
}
fn default_llm_model() -> String {
    "llama3.1:8b-instruct-q4_K_M".to_string()
}
fn default_llm_endpoint() -> String {
    "http://localhost:11434".to_string()
}
fn default_max_tokens() -> usize {
    1024
}
fn default_temperature() -> f32 {
    0.0
}
fn default_request_timeout() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_llm_provider(),
            model: default_llm_model(),
            endpoint: default_llm_endpoint(),
            api_key: None,
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

/// LLM provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    /// Local Ollama server
    Ollama,
    /// Any OpenAI-compatible chat completions API (OpenAI, Groq, vLLM)
    #[serde(alias = "openai", alias = "groq")]
    OpenAiCompatible,
}

/// Passage index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagConfig {
    /// Enable retrieval (disabled means every legal answer is template-only)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Path to the passage corpus (JSON or YAML list of passages)
    #[serde(default)]
    pub index_path: Option<String>,

    /// Number of results to retrieve
    #[serde(default = "default_top_k")]
    pub top_k: usize,

    /// Minimum relevance score
    #[serde(default = "default_min_score")]
    pub min_score: f32,

    /// Append domain vocabulary to the search query
    #[serde(default = "default_true")]
    pub query_expansion: bool,
}

fn default_top_k() -> usize {
    5
}
fn default_min_score() -> f32 {
    0.0
}
fn default_true() -> bool {
    true
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            index_path: None,
            top_k: default_top_k(),
            min_score: default_min_score(),
            query_expansion: true,
        }
    }
}

/// Conversation memory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Messages included in the model context window (5 exchanges)
    #[serde(default = "default_context_messages")]
    pub context_messages: usize,

    /// Per-message truncation in the context window (characters)
    #[serde(default = "default_message_truncate_chars")]
    pub message_truncate_chars: usize,

    /// Entries shown under recent activity in the sidebar
    #[serde(default = "default_recent_activity")]
    pub recent_activity_entries: usize,

    /// Maximum live sessions
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,

    /// Idle time before a session is evicted (seconds)
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_seconds: u64,

    /// Interval of the background eviction sweep (seconds)
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_seconds: u64,
}

fn default_context_messages() -> usize {
    10
}
fn default_message_truncate_chars() -> usize {
    200
}
fn default_recent_activity() -> usize {
    5
}
fn default_max_sessions() -> usize {
    10_000
}
fn default_idle_timeout() -> u64 {
    3600
}
fn default_cleanup_interval() -> u64 {
    60
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            context_messages: default_context_messages(),
            message_truncate_chars: default_message_truncate_chars(),
            recent_activity_entries: default_recent_activity(),
            max_sessions: default_max_sessions(),
            idle_timeout_seconds: default_idle_timeout(),
            cleanup_interval_seconds: default_cleanup_interval(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_defaults() {
        let agent = AgentConfig::default();
        assert_eq!(agent.jurisdiction, "Pakistan");
        assert_eq!(agent.analysis_top_k, 5);
        assert_eq!(agent.max_context_chars, 3000);
        assert_eq!(agent.stage_timeout_ms, 30_000);
    }

    #[test]
    fn test_memory_defaults() {
        let memory = MemoryConfig::default();
        assert_eq!(memory.context_messages, 10);
        assert_eq!(memory.message_truncate_chars, 200);
        assert_eq!(memory.max_sessions, 10_000);
        assert_eq!(memory.idle_timeout_seconds, 3600);
    }

    #[test]
    fn test_provider_aliases() {
        let provider: LlmProvider = serde_json::from_str("\"groq\"").unwrap();
        assert_eq!(provider, LlmProvider::OpenAiCompatible);
        let provider: LlmProvider = serde_json::from_str("\"ollama\"").unwrap();
        assert_eq!(provider, LlmProvider::Ollama);
    }
}
