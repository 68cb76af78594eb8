//! Retry loop around [`ChatModel::complete`].

use std::time::Duration;

use nexus_config::OpenAiConfig;

use crate::client::ChatModel;
use crate::error::LlmError;

/// How many times a prompt is sent and how long to wait in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts including the first one. Zero is treated as one.
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    #[must_use]
    pub const fn from_config(config: &OpenAiConfig) -> Self {
        Self {
            max_attempts: config.max_attempts,
            delay: Duration::from_secs(config.retry_delay_secs),
        }
    }

    /// No waiting between attempts.
    #[must_use]
    pub const fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            delay: Duration::ZERO,
        }
    }
}

/// Send `prompt` until a non-blank reply arrives or attempts run out.
///
/// Blank replies count as failed attempts. A rate-limited attempt waits for
/// the longer of the policy delay and the server's `Retry-After`.
///
/// # Errors
///
/// Returns [`LlmError::Exhausted`] carrying the last failure message.
pub async fn complete_with_retry<M: ChatModel + Sync>(
    model: &M,
    prompt: &str,
    temperature: f32,
    policy: RetryPolicy,
) -> Result<String, LlmError> {
    let attempts = policy.max_attempts.max(1);
    let mut last = String::new();

    for attempt in 1..=attempts {
        tracing::debug!(attempt, attempts, "sending prompt");
        let mut wait = policy.delay;
        match model.complete(prompt, temperature).await {
            Ok(reply) if !reply.trim().is_empty() => return Ok(reply),
            Ok(_) => {
                tracing::warn!(attempt, "empty reply");
                last = LlmError::EmptyReply.to_string();
            }
            Err(LlmError::RateLimited { retry_after_secs }) => {
                tracing::warn!(attempt, retry_after_secs, "rate limited");
                wait = wait.max(Duration::from_secs(retry_after_secs));
                last = format!("rate limited for {retry_after_secs}s");
            }
            Err(error @ (LlmError::MissingApiKey | LlmError::Config(_))) => return Err(error),
            Err(error) => {
                tracing::warn!(attempt, %error, "attempt failed");
                last = error.to_string();
            }
        }
        if attempt < attempts && !wait.is_zero() {
            tokio::time::sleep(wait).await;
        }
    }

    Err(LlmError::Exhausted { attempts, last })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::client::scripted::ScriptedModel;

    #[tokio::test]
    async fn returns_first_non_blank_reply() {
        let model = ScriptedModel::new(["", "   ", "{\"registros\": []}"]);
        let reply = complete_with_retry(&model, "p", 0.4, RetryPolicy::immediate(3))
            .await
            .unwrap();
        assert_eq!(reply, "{\"registros\": []}");
        assert_eq!(model.prompts().len(), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let model = ScriptedModel::default();
        model.push_error("boom");
        model.push_error("still broken");
        model.push_error("never reached");
        let err = complete_with_retry(&model, "p", 0.4, RetryPolicy::immediate(2))
            .await
            .unwrap_err();
        match err {
            LlmError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 2);
                assert!(last.contains("still broken"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(model.prompts().len(), 2);
    }

    #[tokio::test]
    async fn zero_attempts_still_tries_once() {
        let model = ScriptedModel::new(["ok"]);
        let reply = complete_with_retry(&model, "p", 0.1, RetryPolicy::immediate(0))
            .await
            .unwrap();
        assert_eq!(reply, "ok");
    }

    #[test]
    fn policy_follows_config() {
        let config = OpenAiConfig {
            max_attempts: 5,
            retry_delay_secs: 7,
            ..OpenAiConfig::default()
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay, Duration::from_secs(7));
    }
}
