//! Configuration loading, validation, and persistence for Rayo.
//!
//! Loads configuration from `~/.rayo/config.toml` with environment
//! variable overrides. Validates all settings at load time. The assistant
//! core only reads these values; `save` exists for the setup wizard.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Providers the setup wizard asks about, in prompt order.
pub const KNOWN_PROVIDERS: [&str; 4] = ["openai", "anthropic", "cohere", "azure"];

/// Upper bound accepted for `max_tokens`.
pub const MAX_TOKENS_LIMIT: u32 = 128_000;

/// The root configuration structure.
///
/// Maps directly to `~/.rayo/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct RayoConfig {
    /// API keys by provider name ("openai", "anthropic", ...)
    #[serde(default)]
    pub api_keys: HashMap<String, String>,

    /// Default model
    #[serde(default = "default_model")]
    pub default_model: String,

    /// Maximum tokens per model response
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Optional path to a custom system prompt document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_prompt_path: Option<String>,

    /// Per-provider endpoint overrides
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub providers: HashMap<String, ProviderConfig>,
}

fn default_model() -> String {
    "gpt-4".into()
}
fn default_max_tokens() -> u32 {
    4096
}
fn default_temperature() -> f32 {
    0.7
}

/// Endpoint override for one provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,
}

impl std::fmt::Debug for RayoConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut providers: Vec<&str> = self.api_keys.keys().map(|k| k.as_str()).collect();
        providers.sort_unstable();
        f.debug_struct("RayoConfig")
            .field("api_keys", &format_args!("[REDACTED: {}]", providers.join(", ")))
            .field("default_model", &self.default_model)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("custom_prompt_path", &self.custom_prompt_path)
            .field("providers", &self.providers)
            .finish()
    }
}

/// The environment variable that carries a provider's API key.
pub fn api_key_env_var(provider: &str) -> Option<&'static str> {
    match provider {
        "openai" => Some("OPENAI_API_KEY"),
        "anthropic" => Some("ANTHROPIC_API_KEY"),
        "cohere" => Some("COHERE_API_KEY"),
        "azure" => Some("AZURE_API_KEY"),
        _ => None,
    }
}

impl RayoConfig {
    /// Load configuration from the default path (~/.rayo/config.toml).
    ///
    /// Environment overrides:
    /// - `OPENAI_API_KEY`, `ANTHROPIC_API_KEY`, `COHERE_API_KEY`, `AZURE_API_KEY`
    ///   fill in keys missing from the file
    /// - `RAYO_MODEL` replaces the default model
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_overrides(|name| std::env::var(name).ok());
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

        let mut config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.default_model = config.default_model.trim().to_string();
        config.validate()?;
        Ok(config)
    }

    /// Merge environment-provided values using `lookup` as the source.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        for provider in KNOWN_PROVIDERS {
            if self.api_keys.contains_key(provider) {
                continue;
            }
            if let Some(key) = api_key_env_var(provider)
                .and_then(&lookup)
                .filter(|k| !k.trim().is_empty())
            {
                tracing::debug!(provider, "Using API key from environment");
                self.api_keys.insert(provider.to_string(), key);
            }
        }

        if let Some(model) = lookup("RAYO_MODEL").filter(|m| !m.trim().is_empty()) {
            self.default_model = model.trim().to_string();
        }
    }

    /// Write the configuration to the default path.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path();
        self.save_to(&path)?;
        Ok(path)
    }

    /// Write the configuration to a specific path, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let write_err = |reason: String| ConfigError::WriteError {
            path: path.to_path_buf(),
            reason,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| write_err(e.to_string()))?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| write_err(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| write_err(e.to_string()))?;

        tracing::info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".rayo")
    }

    /// Get the configuration file path.
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "Model name cannot be empty".into(),
            ));
        }

        if self.max_tokens == 0 || self.max_tokens > MAX_TOKENS_LIMIT {
            return Err(ConfigError::ValidationError(format!(
                "max_tokens must be between 1 and {MAX_TOKENS_LIMIT}"
            )));
        }

        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::ValidationError(
                "temperature must be between 0.0 and 2.0".into(),
            ));
        }

        Ok(())
    }

    /// Check if any API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_keys.values().any(|k| !k.trim().is_empty())
    }

    /// The API key configured for `provider`, if any.
    pub fn api_key_for(&self, provider: &str) -> Option<&str> {
        self.api_keys
            .get(provider)
            .map(|k| k.as_str())
            .filter(|k| !k.trim().is_empty())
    }

    /// The endpoint override for `provider`, if any.
    pub fn api_url_for(&self, provider: &str) -> Option<&str> {
        self.providers
            .get(provider)
            .and_then(|p| p.api_url.as_deref())
    }
}

impl Default for RayoConfig {
    fn default() -> Self {
        Self {
            api_keys: HashMap::new(),
            default_model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            custom_prompt_path: None,
            providers: HashMap::new(),
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

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Configuration file at {path} is malformed: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Failed to save configuration to {path}: {reason}")]
    WriteError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}
