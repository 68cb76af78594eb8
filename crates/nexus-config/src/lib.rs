//! # nexus-config
//!
//! Layered configuration loading for NEXUS-BIO using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`NEXUS_*` prefix, `__` as separator)
//! 2. Project-level `.nexus/config.toml`
//! 3. User-level `~/.config/nexus-bio/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `NEXUS_MYSQL__HOST` -> `mysql.host`, `NEXUS_OPENAI__MODEL` ->
//! `openai.model`, etc. The `__` (double underscore) separates nested sections.
//!
//! # Usage
//!
//! ```no_run
//! use nexus_config::NexusConfig;
//!
//! let config = NexusConfig::load_with_dotenv().expect("config");
//! println!("MySQL: {}", config.mysql.redacted_url());
//! ```

mod error;
mod general;
mod media;
mod mysql;
mod openai;

pub use error::ConfigError;
pub use general::GeneralConfig;
pub use media::MediaConfig;
pub use mysql::MySqlConfig;
pub use openai::{OPENAI_API_KEY_ENV, OpenAiConfig};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Prefix of every environment override.
pub const ENV_PREFIX: &str = "NEXUS_";

/// Top-level sections, as they appear after the prefix (`NEXUS_MYSQL__...`).
pub const SECTIONS: &[&str] = &["MYSQL", "OPENAI", "MEDIA", "GENERAL"];

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NexusConfig {
    #[serde(default)]
    pub mysql: MySqlConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl NexusConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy` -- use [`Self::load_with_dotenv`] if you need
    /// `.env` file loading.
    pub fn load() -> Result<Self, ConfigError> {
        Self::figment().extract().map_err(ConfigError::from)
    }

    /// Load configuration with `.env` file support.
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests can inspect the figment or add providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".nexus/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Path to the user-global config file.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("nexus-bio").join("config.toml"))
    }

    /// Load `.env` from the workspace root, falling back to the current dir.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_loads() {
        let config = NexusConfig::default();
        assert!(config.mysql.is_configured());
        assert!(config.openai.api_key.is_empty());
        assert!(config.media.has_image_source());
        assert_eq!(config.general.default_rows, 10);
    }

    #[test]
    fn figment_builds_without_files() {
        figment::Jail::expect_with(|_jail| {
            let config: NexusConfig = NexusConfig::figment().extract()?;
            assert_eq!(config.mysql.port, 3306);
            assert_eq!(config.general.max_display_rows, 20);
            Ok(())
        });
    }

    #[test]
    fn global_path_ends_with_app_dir() {
        if let Some(path) = NexusConfig::global_config_path() {
            assert!(path.ends_with("nexus-bio/config.toml"));
        }
    }
}
