//! Media error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Encoding or decoding an image failed.
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    /// Placeholder dimensions were zero.
    #[error("invalid placeholder size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}
