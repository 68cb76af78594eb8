//! OpenAI-compatible chat-completions client.

use std::future::Future;
use std::time::Duration;

use nexus_config::OpenAiConfig;
use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::http::check_response;

/// Anything that turns a prompt into a text reply.
///
/// [`ChatClient`] is the production implementation; tests drive the prompt
/// flows with scripted models.
pub trait ChatModel {
    /// Send one user prompt and return the reply text.
    fn complete(
        &self,
        prompt: &str,
        temperature: f32,
    ) -> impl Future<Output = Result<String, LlmError>> + Send;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// HTTP client for `{endpoint}/chat/completions`.
#[derive(Debug, Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    url: String,
    temperature: f32,
}

impl ChatClient {
    /// Build a client from the `[openai]` section.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::Config`] when no key source is configured,
    /// [`LlmError::MissingApiKey`] when the resolved key is blank, and
    /// [`LlmError::Http`] if the HTTP client cannot be built.
    pub fn new(config: &OpenAiConfig) -> Result<Self, LlmError> {
        let api_key = config.resolve_api_key()?;
        Self::with_key(config, api_key)
    }

    /// Build a client with an explicit key, ignoring the configured sources.
    ///
    /// # Errors
    ///
    /// Returns [`LlmError::MissingApiKey`] for a blank key.
    pub fn with_key(config: &OpenAiConfig, api_key: String) -> Result<Self, LlmError> {
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }
        let http = reqwest::Client::builder()
            .user_agent(concat!("nexus-bio/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
            url: config.completions_url(),
            temperature: config.temperature,
        })
    }

    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Temperature used when callers have no specific preference.
    #[must_use]
    pub const fn default_temperature(&self) -> f32 {
        self.temperature
    }

    async fn send(&self, prompt: &str, temperature: f32) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature,
        };
        tracing::debug!(model = %self.model, temperature, prompt_chars = prompt.len(), "chat request");

        let resp = self
            .http
            .post(&self.url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;
        let resp = check_response(resp).await?;
        let text = resp.text().await?;
        extract_reply(&text)
    }
}

impl ChatModel for ChatClient {
    fn complete(
        &self,
        prompt: &str,
        temperature: f32,
    ) -> impl Future<Output = Result<String, LlmError>> + Send {
        self.send(prompt, temperature)
    }
}

/// Pull the first choice's content out of a completions response body.
fn extract_reply(body: &str) -> Result<String, LlmError> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| LlmError::Parse(e.to_string()))?;
    let content = parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .unwrap_or_default();
    if content.trim().is_empty() {
        return Err(LlmError::EmptyReply);
    }
    Ok(content)
}

#[cfg(test)]
pub(crate) mod scripted {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use super::*;

    /// Replays canned replies and records every prompt it receives.
    #[derive(Debug, Default)]
    pub struct ScriptedModel {
        replies: Mutex<VecDeque<Result<String, String>>>,
        pub prompts: Mutex<Vec<(String, f32)>>,
    }

    impl ScriptedModel {
        pub fn new<I, S>(replies: I) -> Self
        where
            I: IntoIterator<Item = S>,
            S: Into<String>,
        {
            Self {
                replies: Mutex::new(replies.into_iter().map(|r| Ok(r.into())).collect()),
                prompts: Mutex::default(),
            }
        }

        pub fn push_error(&self, message: &str) {
            self.replies
                .lock()
                .unwrap()
                .push_back(Err(message.to_string()));
        }

        pub fn prompts(&self) -> Vec<(String, f32)> {
            self.prompts.lock().unwrap().clone()
        }
    }

    impl ChatModel for ScriptedModel {
        fn complete(
            &self,
            prompt: &str,
            temperature: f32,
        ) -> impl Future<Output = Result<String, LlmError>> + Send {
            self.prompts
                .lock()
                .unwrap()
                .push((prompt.to_string(), temperature));
            let next = self.replies.lock().unwrap().pop_front();
            async move {
                match next {
                    Some(Ok(reply)) => Ok(reply),
                    Some(Err(message)) => Err(LlmError::Api {
                        status: 500,
                        message,
                    }),
                    None => Err(LlmError::EmptyReply),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn extracts_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"SELECT 1"}},
                      {"message":{"role":"assistant","content":"ignored"}}]}"#;
        assert_eq!(extract_reply(body).unwrap(), "SELECT 1");
    }

    #[test]
    fn empty_choices_are_an_empty_reply() {
        assert!(matches!(
            extract_reply(r#"{"choices":[]}"#),
            Err(LlmError::EmptyReply)
        ));
        assert!(matches!(
            extract_reply(r#"{"choices":[{"message":{"content":"  "}}]}"#),
            Err(LlmError::EmptyReply)
        ));
    }

    #[test]
    fn malformed_body_is_a_parse_error() {
        assert!(matches!(extract_reply("<html>"), Err(LlmError::Parse(_))));
    }

    #[test]
    fn request_serializes_as_single_user_message() {
        let body = ChatRequest {
            model: "gpt-4o-mini",
            messages: vec![ChatMessage {
                role: "user",
                content: "hi",
            }],
            temperature: 0.5,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({
                "model": "gpt-4o-mini",
                "messages": [{"role": "user", "content": "hi"}],
                "temperature": 0.5
            })
        );
    }

    #[test]
    fn blank_key_is_rejected() {
        let err = ChatClient::with_key(&OpenAiConfig::default(), String::from("  ")).unwrap_err();
        assert!(matches!(err, LlmError::MissingApiKey));
    }

    #[test]
    fn client_uses_configured_model_and_url() {
        let config = OpenAiConfig {
            endpoint: String::from("http://localhost:9999/v1/"),
            model: String::from("gpt-4o"),
            ..OpenAiConfig::default()
        };
        let client = ChatClient::with_key(&config, String::from("sk-test")).unwrap();
        assert_eq!(client.model(), "gpt-4o");
        assert_eq!(client.url, "http://localhost:9999/v1/chat/completions");
        assert!((client.default_temperature() - 0.4).abs() < f32::EPSILON);
    }
}
