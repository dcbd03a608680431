//! Main settings module

use std::path::Path;

use config::{Config, Environment, File};
use legal_agent_core::Language;
use serde::{Deserialize, Serialize};

use crate::{AgentConfig, ConfigError, LlmConfig, MemoryConfig, RagConfig};

/// Environment variable prefix (`LEGAL_AGENT__SERVER__PORT=9000`)
pub const ENV_PREFIX: &str = "LEGAL_AGENT";

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, warnings only
    #[default]
    Development,
    /// Staging mode - stricter validation
    Staging,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Pipeline configuration
    #[serde(default)]
    pub agent: AgentConfig,

    /// Conversation memory configuration
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Language model backend
    #[serde(default)]
    pub llm: LlmConfig,

    /// Passage index configuration
    #[serde(default)]
    pub rag: RagConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_agent()?;
        self.validate_memory()?;
        self.validate_llm()?;
        self.validate_rag()?;
        self.validate_observability()?;
        Ok(())
    }

    /// Language used until a session pins one
    pub fn default_language(&self) -> Language {
        Language::from_str_loose(&self.agent.default_language).unwrap_or_default()
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.port == 0 {
            return Err(invalid("server.port", "Port cannot be 0"));
        }

        if server.timeout_seconds == 0 {
            return Err(invalid("server.timeout_seconds", "Timeout must be at least 1 second"));
        }

        if self.environment.is_production() && server.cors_enabled && server.cors_origins.is_empty()
        {
            tracing::warn!(
                "CORS is enabled in production but no origins are configured. \
                 This may block legitimate requests."
            );
        }

        Ok(())
    }

    fn validate_agent(&self) -> Result<(), ConfigError> {
        let agent = &self.agent;

        if Language::from_str_loose(&agent.default_language).is_none() {
            return Err(invalid(
                "agent.default_language",
                &format!("Unsupported language '{}', expected 'en' or 'ur'", agent.default_language),
            ));
        }

        if !(agent.urdu_script_threshold > 0.0 && agent.urdu_script_threshold <= 1.0) {
            return Err(invalid(
                "agent.urdu_script_threshold",
                &format!("Must be in (0.0, 1.0], got {}", agent.urdu_script_threshold),
            ));
        }

        if agent.analysis_top_k == 0 || agent.analysis_top_k > 5 {
            return Err(invalid(
                "agent.analysis_top_k",
                &format!("Must be between 1 and 5, got {}", agent.analysis_top_k),
            ));
        }

        if agent.max_context_chars == 0 {
            return Err(invalid("agent.max_context_chars", "Must be at least 1"));
        }

        if agent.stage_timeout_ms == 0 {
            return Err(invalid("agent.stage_timeout_ms", "Must be at least 1ms"));
        }

        if agent.retrieval_timeout_ms == 0 {
            return Err(invalid("agent.retrieval_timeout_ms", "Must be at least 1ms"));
        }

        if agent.casual_max_words == 0 {
            return Err(invalid("agent.casual_max_words", "Must be at least 1"));
        }

        Ok(())
    }

    fn validate_memory(&self) -> Result<(), ConfigError> {
        let memory = &self.memory;

        if memory.context_messages == 0 {
            return Err(invalid("memory.context_messages", "Must be at least 1"));
        }

        if memory.message_truncate_chars == 0 {
            return Err(invalid("memory.message_truncate_chars", "Must be at least 1"));
        }

        if memory.max_sessions == 0 {
            return Err(invalid("memory.max_sessions", "Must be at least 1"));
        }

        if memory.idle_timeout_seconds == 0 {
            return Err(invalid("memory.idle_timeout_seconds", "Must be at least 1 second"));
        }

        if memory.cleanup_interval_seconds == 0 {
            return Err(invalid("memory.cleanup_interval_seconds", "Must be at least 1 second"));
        }

        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        let llm = &self.llm;

        if llm.endpoint.trim().is_empty() {
            return Err(invalid("llm.endpoint", "Endpoint cannot be empty"));
        }

        if !(0.0..=2.0).contains(&llm.temperature) {
            return Err(invalid(
                "llm.temperature",
                &format!("Must be between 0.0 and 2.0, got {}", llm.temperature),
            ));
        }

        if llm.max_tokens == 0 {
            return Err(invalid("llm.max_tokens", "Must be at least 1"));
        }

        if self.environment.is_strict()
            && llm.provider == crate::LlmProvider::OpenAiCompatible
            && llm.api_key.is_none()
        {
            return Err(invalid(
                "llm.api_key",
                "API key must be set for hosted providers outside development",
            ));
        }

        Ok(())
    }

    fn validate_rag(&self) -> Result<(), ConfigError> {
        let rag = &self.rag;

        if rag.top_k == 0 {
            return Err(invalid("rag.top_k", "Must be at least 1"));
        }

        if rag.min_score < 0.0 {
            return Err(invalid(
                "rag.min_score",
                &format!("Must not be negative, got {}", rag.min_score),
            ));
        }

        if let Some(path) = &rag.index_path {
            if !Path::new(path).exists() {
                if self.environment.is_strict() {
                    return Err(invalid(
                        "rag.index_path",
                        &format!("Passage corpus not found: {}", path),
                    ));
                }
                tracing::warn!("Passage corpus not found: {}", path);
            }
        } else if rag.enabled {
            tracing::warn!("rag.index_path not configured, legal answers will use templates only");
        }

        Ok(())
    }

    fn validate_observability(&self) -> Result<(), ConfigError> {
        let level = self.observability.log_level.to_lowercase();
        if !matches!(level.as_str(), "trace" | "debug" | "info" | "warn" | "error") {
            return Err(invalid(
                "observability.log_level",
                &format!("Unknown log level '{}'", self.observability.log_level),
            ));
        }
        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// CORS allowed origins
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8000
}
fn default_timeout() -> u64 {
    90
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_timeout(),
            cors_enabled: default_true(),
            cors_origins: Vec::new(),
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Enable JSON logging
    #[serde(default)]
    pub log_json: bool,

    /// Enable the Prometheus exporter
    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (LEGAL_AGENT_ prefix)
/// 2. config/{env}.yaml|toml (if env specified)
/// 3. config/default.yaml|toml
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from("config", env)
}

/// Load settings with an explicit configuration directory
pub fn load_settings_from(
    config_dir: impl AsRef<Path>,
    env: Option<&str>,
) -> Result<Settings, ConfigError> {
    let dir = config_dir.as_ref();
    let mut builder = Config::builder();

    let default_path = dir.join("default");
    builder = builder.add_source(File::with_name(&default_path.to_string_lossy()).required(false));

    if let Some(env_name) = env {
        let env_path = dir.join(env_name);
        builder = builder.add_source(File::with_name(&env_path.to_string_lossy()).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let settings: Settings = config.try_deserialize()?;

    settings.validate()?;

    Ok(settings)
}
