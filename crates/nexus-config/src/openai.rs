//! OpenAI chat-completions configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Conventional variable consulted when no key is configured.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

fn default_endpoint() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

const fn default_temperature() -> f32 {
    0.4
}

const fn default_max_attempts() -> u32 {
    3
}

const fn default_retry_delay_secs() -> u64 {
    2
}

const fn default_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OpenAiConfig {
    /// Inline API key. Prefer `api_key_file` or `OPENAI_API_KEY`.
    #[serde(default)]
    pub api_key: String,

    /// File whose trimmed contents are the API key.
    #[serde(default)]
    pub api_key_file: Option<PathBuf>,

    /// Base URL; `/chat/completions` is appended.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Attempts per request, including the first one.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,

    /// HTTP request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_key_file: None,
            endpoint: default_endpoint(),
            model: default_model(),
            temperature: default_temperature(),
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl OpenAiConfig {
    /// True when some key source is present. Does not read the file.
    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
            || self.api_key_file.is_some()
            || std::env::var(OPENAI_API_KEY_ENV).is_ok_and(|key| !key.trim().is_empty())
    }

    /// Resolve the API key: inline value, then key file, then `OPENAI_API_KEY`.
    ///
    /// # Errors
    ///
    /// [`ConfigError::InvalidValue`] if the key file cannot be read or is
    /// empty, [`ConfigError::NotConfigured`] if no source yields a key.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        let inline = self.api_key.trim();
        if !inline.is_empty() {
            return Ok(inline.to_string());
        }

        if let Some(path) = &self.api_key_file {
            let contents =
                std::fs::read_to_string(path).map_err(|error| ConfigError::InvalidValue {
                    field: "openai.api_key_file".to_string(),
                    reason: format!("cannot read {}: {error}", path.display()),
                })?;
            let key = contents.trim();
            if key.is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: "openai.api_key_file".to_string(),
                    reason: format!("{} is empty", path.display()),
                });
            }
            return Ok(key.to_string());
        }

        match std::env::var(OPENAI_API_KEY_ENV) {
            Ok(key) if !key.trim().is_empty() => Ok(key.trim().to_string()),
            _ => Err(ConfigError::NotConfigured {
                section: "openai".to_string(),
            }),
        }
    }

    /// Chat-completions URL for the configured endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}
