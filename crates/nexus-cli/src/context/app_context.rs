use anyhow::Context;
use nexus_config::NexusConfig;
use nexus_db::NexusDb;
use nexus_llm::{ChatClient, RetryPolicy};

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub db: NexusDb,
    pub config: NexusConfig,
}

impl AppContext {
    /// Open the MySQL pool described by `config.mysql`.
    pub async fn connect(config: NexusConfig) -> anyhow::Result<Self> {
        let db = NexusDb::connect(&config.mysql)
            .await
            .with_context(|| format!("failed to connect to {}", config.mysql.redacted_url()))?;
        Ok(Self { db, config })
    }

    /// Chat client for the AI commands.
    ///
    /// Built on demand so the non-AI commands run without an API key.
    pub fn chat_client(&self) -> anyhow::Result<ChatClient> {
        if !self.config.openai.is_configured() {
            tracing::warn!(
                "OpenAI is not configured. Set NEXUS_OPENAI__API_KEY, openai.api_key_file, or OPENAI_API_KEY."
            );
        }
        ChatClient::new(&self.config.openai).context("failed to initialize the OpenAI client")
    }

    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::from_config(&self.config.openai)
    }
}
