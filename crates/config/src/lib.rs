//! Configuration loading, validation, and management for Cortex.
//!
//! Loads configuration from `~/.cortex/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use cortex_core::error::ConfigError;

/// The root configuration structure.
///
/// Maps directly to `~/.cortex/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Generation API key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Low-latency model name.
    #[serde(default = "default_model_fast")]
    pub model_fast: String,

    /// High-capability reasoning model name.
    #[serde(default = "default_model_reasoning")]
    pub model_reasoning: String,

    /// Speech-synthesis model name.
    #[serde(default = "default_model_tts")]
    pub model_tts: String,

    /// Token budget attached to reasoning-model requests.
    #[serde(default = "default_thinking_budget")]
    pub thinking_budget: u32,

    /// Default generation temperature.
    #[serde(default = "default_temperature")]
    pub default_temperature: f32,

    /// Directory for durable local state.
    #[serde(default = "default_state_dir")]
    pub state_dir: PathBuf,
}

fn default_model_fast() -> String {
    "gemini-2.5-flash".into()
}
fn default_model_reasoning() -> String {
    "gemini-3-pro-preview".into()
}
fn default_model_tts() -> String {
    "gemini-2.5-flash-preview-tts".into()
}
fn default_thinking_budget() -> u32 {
    32_768
}
fn default_temperature() -> f32 {
    0.5
}
fn default_state_dir() -> PathBuf {
    AppConfig::config_dir().join("state")
}

/// Redact a secret string for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("model_fast", &self.model_fast)
            .field("model_reasoning", &self.model_reasoning)
            .field("model_tts", &self.model_tts)
            .field("thinking_budget", &self.thinking_budget)
            .field("default_temperature", &self.default_temperature)
            .field("state_dir", &self.state_dir)
            .finish()
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.cortex/config.toml).
    ///
    /// Also checks environment variables for the API key:
    /// - `CORTEX_API_KEY` (highest priority)
    /// - `GEMINI_API_KEY`
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;

        // Environment variable overrides (highest priority)
        if config.api_key.is_none() {
            config.api_key = std::env::var("CORTEX_API_KEY")
                .ok()
                .or_else(|| std::env::var("GEMINI_API_KEY").ok());
        }

        if let Ok(model) = std::env::var("CORTEX_MODEL_FAST") {
            config.model_fast = model;
        }
        if let Ok(model) = std::env::var("CORTEX_MODEL_REASONING") {
            config.model_reasoning = model;
        }

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

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".cortex")
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.default_temperature) {
            return Err(ConfigError::ValidationError(
                "default_temperature must be between 0.0 and 1.0".into(),
            ));
        }

        if self.model_fast.trim().is_empty() || self.model_reasoning.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "model names must not be empty".into(),
            ));
        }

        Ok(())
    }

    /// Check if an API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Generate a default config TOML string (for first-run onboarding).
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model_fast: default_model_fast(),
            model_reasoning: default_model_reasoning(),
            model_tts: default_model_tts(),
            thinking_budget: default_thinking_budget(),
            default_temperature: default_temperature(),
            state_dir: default_state_dir(),
        }
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
