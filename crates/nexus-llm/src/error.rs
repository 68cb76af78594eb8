//! LLM error types.

use nexus_config::ConfigError;
use nexus_core::CoreError;
use thiserror::Error;

/// Errors raised while talking to the chat model or repairing its output.
#[derive(Debug, Error)]
pub enum LlmError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API returned a non-success status code.
    #[error("API error ({status}): {message}")]
    Api {
        /// HTTP status code returned by the API.
        status: u16,
        /// Error message or response body.
        message: String,
    },

    /// The API returned a 429 Too Many Requests response.
    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// No API key could be resolved from the configuration.
    #[error("OpenAI API key is missing")]
    MissingApiKey,

    /// The model answered with no content.
    #[error("the model returned an empty reply")]
    EmptyReply,

    /// The reply could not be turned into the expected shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// Every retry attempt failed.
    #[error("no usable reply after {attempts} attempts: {last}")]
    Exhausted {
        /// Attempts made, including the first.
        attempts: u32,
        /// Message of the last failure.
        last: String,
    },

    /// The reply did not look like SQL.
    #[error("the model did not return a SQL statement: {0}")]
    NotSql(String),

    /// Configuration could not be resolved.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A record batch had the wrong shape.
    #[error(transparent)]
    Core(#[from] CoreError),
}
