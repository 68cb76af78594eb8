//! Prompt-to-records round trips.

use nexus_core::{Record, RecordBatch};
use serde_json::Value;

use crate::cleanup::{clean_json_response, parse_record_batch};
use crate::client::ChatModel;
use crate::error::LlmError;
use crate::retry::{RetryPolicy, complete_with_retry};

/// Send a generation prompt and parse the `{"registros": [...]}` reply.
///
/// # Errors
///
/// Propagates retry exhaustion and [`parse_record_batch`] failures.
pub async fn generate_batch<M: ChatModel + Sync>(
    model: &M,
    prompt: &str,
    temperature: f32,
    policy: RetryPolicy,
) -> Result<RecordBatch, LlmError> {
    let reply = complete_with_retry(model, prompt, temperature, policy).await?;
    parse_record_batch(&reply).inspect_err(|error| {
        let preview: String = reply.chars().take(200).collect();
        tracing::warn!(%error, reply = %preview, "unusable generation reply");
    })
}

/// Parse a single-row rewrite reply into a record.
///
/// Accepts a bare object or a `{"registros": [obj]}` envelope.
///
/// # Errors
///
/// [`LlmError::Parse`] when the reply is not a JSON object.
pub fn parse_row_reply(reply: &str) -> Result<Record, LlmError> {
    let cleaned = clean_json_response(reply);
    let value: Value =
        serde_json::from_str(&cleaned).map_err(|e| LlmError::Parse(e.to_string()))?;
    match value {
        Value::Object(map) if !map.contains_key(nexus_core::records::RECORDS_KEY) => Ok(map),
        other => RecordBatch::from_value(other)?
            .objects()
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::Parse(String::from("no row in reply"))),
    }
}

/// Ask for a rewritten row, keeping `primary_key` at its original value.
///
/// # Errors
///
/// Propagates retry exhaustion and [`parse_row_reply`] failures.
pub async fn rewrite_row<M: ChatModel + Sync>(
    model: &M,
    prompt: &str,
    original: &Record,
    primary_key: &str,
    temperature: f32,
    policy: RetryPolicy,
) -> Result<Record, LlmError> {
    let reply = complete_with_retry(model, prompt, temperature, policy).await?;
    let mut row = parse_row_reply(&reply)?;
    if let Some(key) = original.get(primary_key) {
        row.insert(primary_key.to_string(), key.clone());
    }
    Ok(row)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::client::scripted::ScriptedModel;

    #[tokio::test]
    async fn batch_is_parsed_after_retries() {
        let model = ScriptedModel::new(["", "```json\n{\"registros\": [{\"ID_Categ\": 1}]}\n```"]);
        let batch = generate_batch(&model, "p", 0.4, RetryPolicy::immediate(3))
            .await
            .unwrap();
        assert_eq!(batch.objects()[0]["ID_Categ"], json!(1));
    }

    #[tokio::test]
    async fn malformed_batch_is_an_error() {
        let model = ScriptedModel::new(["{\"linhas\": []}"]);
        let err = generate_batch(&model, "p", 0.4, RetryPolicy::immediate(1))
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Core(_)));
    }

    #[test]
    fn row_reply_accepts_object_or_envelope() {
        let row = parse_row_reply("{\"ID_Lab\": 1, \"Nome\": \"B\"}").unwrap();
        assert_eq!(row["Nome"], json!("B"));
        let row = parse_row_reply("{\"registros\": [{\"Nome\": \"C\"}]}").unwrap();
        assert_eq!(row["Nome"], json!("C"));
        assert!(parse_row_reply("[1, 2]").is_err());
        assert!(parse_row_reply("nada").is_err());
    }

    #[tokio::test]
    async fn rewrite_restores_primary_key() {
        let model = ScriptedModel::new(["{\"ID_Lab\": 99, \"Nome\": \"Novo\"}"]);
        let original = json!({"ID_Lab": 3, "Nome": "Velho"}).as_object().unwrap().clone();
        let row = rewrite_row(&model, "p", &original, "ID_Lab", 0.4, RetryPolicy::immediate(1))
            .await
            .unwrap();
        assert_eq!(row["ID_Lab"], json!(3));
        assert_eq!(row["Nome"], json!("Novo"));
    }
}
