//! Image fetching, placeholder and similarity-search settings.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

fn default_image_base_url() -> String {
    "https://picsum.photos".to_string()
}

const fn default_request_timeout_secs() -> u64 {
    8
}

const fn default_request_delay_ms() -> u64 {
    1000
}

const fn default_placeholder_width() -> u32 {
    400
}

const fn default_placeholder_height() -> u32 {
    300
}

const fn default_max_specimens() -> u32 {
    15
}

const fn default_top_k() -> usize {
    3
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaConfig {
    /// Lorem Picsum compatible image service.
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Pause between specimens while filling the media table.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,

    #[serde(default = "default_placeholder_width")]
    pub placeholder_width: u32,

    #[serde(default = "default_placeholder_height")]
    pub placeholder_height: u32,

    /// Specimens that receive an image per populate run.
    #[serde(default = "default_max_specimens")]
    pub max_specimens: u32,

    /// Where the CLIP model is cached. Empty uses fastembed's default.
    #[serde(default)]
    pub model_cache_dir: Option<PathBuf>,

    /// Matches returned by the similarity search.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            image_base_url: default_image_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            request_delay_ms: default_request_delay_ms(),
            placeholder_width: default_placeholder_width(),
            placeholder_height: default_placeholder_height(),
            max_specimens: default_max_specimens(),
            model_cache_dir: None,
            top_k: default_top_k(),
        }
    }
}

impl MediaConfig {
    /// Web images are disabled by setting an empty base URL.
    pub fn has_image_source(&self) -> bool {
        !self.image_base_url.trim().is_empty()
    }
}
