//! General application configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_script_path() -> PathBuf {
    PathBuf::from("script.sql")
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

/// Rows requested per table by the AI populate flow.
const fn default_rows() -> u32 {
    10
}

/// Species requested by the taxonomy prompt.
const fn default_species() -> u32 {
    20
}

const fn default_random_rows() -> u32 {
    5
}

const fn default_max_display_rows() -> usize {
    20
}

/// Rows per populated table handed to prompts as context.
const fn default_context_rows() -> u32 {
    5
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// DDL script executed by `create`.
    #[serde(default = "default_script_path")]
    pub script_path: PathBuf,

    /// Directory holding `{table}.json` seed files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_rows")]
    pub default_rows: u32,

    #[serde(default = "default_species")]
    pub default_species: u32,

    /// Rows touched by `rewrite` and `prune`.
    #[serde(default = "default_random_rows")]
    pub random_rows: u32,

    /// Display cap for free-form query results.
    #[serde(default = "default_max_display_rows")]
    pub max_display_rows: usize,

    #[serde(default = "default_context_rows")]
    pub context_rows: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            script_path: default_script_path(),
            data_dir: default_data_dir(),
            default_rows: default_rows(),
            default_species: default_species(),
            random_rows: default_random_rows(),
            max_display_rows: default_max_display_rows(),
            context_rows: default_context_rows(),
        }
    }
}
