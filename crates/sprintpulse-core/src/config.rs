//! SprintPulse configuration system.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SprintPulseError};

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SprintPulseConfig {
    #[serde(default)]
    pub platform: PlatformConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub slack: SlackConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
}

impl SprintPulseConfig {
    /// Load config from the default path (~/.sprintpulse/config.toml).
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default().with_env_overrides())
        }
    }

    /// Load config from a specific path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SprintPulseError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| SprintPulseError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config.with_env_overrides())
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".sprintpulse")
            .join("config.toml")
    }

    /// Secrets are overridable via environment so the config file never
    /// needs to hold tokens.
    fn with_env_overrides(mut self) -> Self {
        if let Ok(token) = std::env::var("SPRINTPULSE_PLATFORM_TOKEN") {
            self.platform.token = token;
        }
        if let Ok(key) = std::env::var("SPRINTPULSE_LLM_API_KEY") {
            self.llm.api_key = key;
        }
        if let Ok(url) = std::env::var("SPRINTPULSE_WEBHOOK_URL") {
            self.slack.webhook_url = url;
        }
        self
    }
}

/// Work-tracking platform API configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    #[serde(default = "default_platform_endpoint")]
    pub endpoint: String,
    /// Service-account token sent in the `authorization` header.
    #[serde(default)]
    pub token: String,
    /// Destination event-source id for schedule requests.
    #[serde(default = "default_event_source")]
    pub event_source_id: String,
}

fn default_platform_endpoint() -> String {
    "https://api.devrev.ai".into()
}
fn default_event_source() -> String {
    "scheduled-events".into()
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self {
            endpoint: default_platform_endpoint(),
            token: String::new(),
            event_source_id: default_event_source(),
        }
    }
}

/// Narrative-summary provider (LLM) configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_llm_endpoint() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_temperature() -> f32 {
    0.7
}
fn default_max_tokens() -> u32 {
    1024
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            api_key: String::new(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
        }
    }
}

/// Slack webhook configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SlackConfig {
    #[serde(default)]
    pub webhook_url: String,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Sprint registry retention configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// How long after a sprint's end date its dedup entry is kept.
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u64,
    /// How often the background prune task runs.
    #[serde(default = "default_prune_interval_hours")]
    pub prune_interval_hours: u64,
}

fn default_retention_hours() -> u64 {
    24
}
fn default_prune_interval_hours() -> u64 {
    24
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            retention_hours: default_retention_hours(),
            prune_interval_hours: default_prune_interval_hours(),
        }
    }
}
