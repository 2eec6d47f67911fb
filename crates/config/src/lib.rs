//! Configuration loading, validation, and management for triagent.
//!
//! Loads configuration from `~/.triagent/config.toml` with environment
//! variable overrides. Validates all settings at startup. The resolved
//! [`AppConfig`] is built once by the CLI and passed explicitly into every
//! component; nothing else reads the environment.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.triagent/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Reasoning agent backend and call limits
    #[serde(default)]
    pub agents: AgentsConfig,

    /// Pattern store location and thresholds
    #[serde(default)]
    pub patterns: PatternsConfig,

    /// Issue tracker connection
    #[serde(default)]
    pub tracker: TrackerConfig,

    /// Where rendered reports are written
    #[serde(default)]
    pub output: OutputConfig,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

/// Which agent invoker implementation runs agents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentBackend {
    /// `claude --print` subprocess
    #[default]
    ClaudeCli,
    /// Anthropic Messages API over HTTPS
    Anthropic,
}

impl std::str::FromStr for AgentBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "claude_cli" | "claude-cli" | "cli" => Ok(AgentBackend::ClaudeCli),
            "anthropic" | "api" => Ok(AgentBackend::Anthropic),
            other => Err(ConfigError::ValidationError(format!(
                "unknown agent backend '{other}' (expected claude_cli or anthropic)"
            ))),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct AgentsConfig {
    #[serde(default)]
    pub backend: AgentBackend,

    /// Executable used by the `claude_cli` backend
    #[serde(default = "default_claude_bin")]
    pub claude_bin: String,

    /// Model used by the `anthropic` backend
    #[serde(default = "default_model")]
    pub model: String,

    /// Per-attempt agent timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Attempts per structured agent call
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

fn default_claude_bin() -> String {
    "claude".into()
}
fn default_model() -> String {
    "claude-sonnet-4-20250514".into()
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_max_retries() -> u32 {
    3
}

impl Default for AgentsConfig {
    fn default() -> Self {
        Self {
            backend: AgentBackend::default(),
            claude_bin: default_claude_bin(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            api_key: None,
        }
    }
}

impl std::fmt::Debug for AgentsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentsConfig")
            .field("backend", &self.backend)
            .field("claude_bin", &self.claude_bin)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .field("max_retries", &self.max_retries)
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternsConfig {
    /// JSONL file holding learned patterns
    #[serde(default = "default_patterns_path")]
    pub path: PathBuf,

    /// Minimum pattern confidence considered a match
    #[serde(default = "default_threshold")]
    pub min_confidence: f64,

    /// Minimum recommendation confidence recorded as a new pattern
    #[serde(default = "default_threshold")]
    pub record_threshold: f64,
}

fn default_patterns_path() -> PathBuf {
    PathBuf::from("data/patterns.jsonl")
}
fn default_threshold() -> f64 {
    0.7
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            path: default_patterns_path(),
            min_confidence: default_threshold(),
            record_threshold: default_threshold(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Whether priority updates and comments are sent to the tracker
    #[serde(default)]
    pub writes_enabled: bool,

    /// Prefix for human-facing issue links
    #[serde(default = "default_issue_url_base")]
    pub issue_url_base: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_api_url() -> String {
    "https://api.linear.app/graphql".into()
}
fn default_issue_url_base() -> String {
    "https://linear.app/issue".into()
}
fn default_request_timeout_secs() -> u64 {
    30
}

impl TrackerConfig {
    /// Human-readable write mode shown in reports.
    pub fn write_mode(&self) -> &'static str {
        if self.writes_enabled { "WRITE" } else { "READ-ONLY" }
    }
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            writes_enabled: false,
            issue_url_base: default_issue_url_base(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl std::fmt::Debug for TrackerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerConfig")
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .field("writes_enabled", &self.writes_enabled)
            .field("issue_url_base", &self.issue_url_base)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_triage_dir")]
    pub triage_dir: PathBuf,

    #[serde(default = "default_investigation_dir")]
    pub investigation_dir: PathBuf,
}

fn default_triage_dir() -> PathBuf {
    PathBuf::from("triage_results")
}
fn default_investigation_dir() -> PathBuf {
    PathBuf::from("investigation_results")
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            triage_dir: default_triage_dir(),
            investigation_dir: default_investigation_dir(),
        }
    }
}

/// `true`, `1` and `yes` (any case) enable a flag; anything else disables it.
pub fn parse_flag(value: &str) -> bool {
    matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1" | "yes")
}

impl AppConfig {
    /// Load configuration from the default path (~/.triagent/config.toml).
    ///
    /// Environment variables take priority over the file:
    /// - `LINEAR_API_KEY`, `LINEAR_ENABLE_WRITES`
    /// - `ANTHROPIC_API_KEY`, `TRIAGENT_AGENT_BACKEND`
    /// - `TRIAGENT_PATTERNS_FILE`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        Self::load_with_env(&config_path)
    }

    /// Load from `path` and apply environment overrides.
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load_from(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup (normally the process environment).
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(key) = lookup("LINEAR_API_KEY").filter(|k| !k.is_empty()) {
            self.tracker.api_key = Some(key);
        }
        if let Some(flag) = lookup("LINEAR_ENABLE_WRITES") {
            self.tracker.writes_enabled = parse_flag(&flag);
        }
        if let Some(key) = lookup("ANTHROPIC_API_KEY").filter(|k| !k.is_empty()) {
            self.agents.api_key = Some(key);
        }
        if let Some(backend) = lookup("TRIAGENT_AGENT_BACKEND") {
            self.agents.backend = backend.parse()?;
        }
        if let Some(path) = lookup("TRIAGENT_PATTERNS_FILE").filter(|p| !p.is_empty()) {
            self.patterns.path = PathBuf::from(path);
        }
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".triagent")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.agents.max_retries == 0 {
            return Err(ConfigError::ValidationError(
                "agents.max_retries must be at least 1".into(),
            ));
        }

        if self.agents.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "agents.timeout_secs must be greater than 0".into(),
            ));
        }

        for (name, value) in [
            ("patterns.min_confidence", self.patterns.min_confidence),
            ("patterns.record_threshold", self.patterns.record_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::ValidationError(format!(
                    "{name} must be between 0.0 and 1.0"
                )));
            }
        }

        Ok(())
    }

    /// Generate a default config TOML string (for `config init`).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
