use anyhow::Context;
use nexus_core::RecordBatch;
use nexus_llm::ChatModel;
use nexus_llm::generate::generate_batch;
use nexus_llm::prompts::{TAXON_TEMPERATURE, build_taxon_prompt};
use nexus_llm::validate::filter_taxon_records;

use super::TableOutcome;
use crate::context::AppContext;

/// Generate the taxonomy tree covering `species` species.
pub async fn populate<M: ChatModel + Sync>(
    ctx: &AppContext,
    model: &M,
    table: &str,
    species: u32,
) -> anyhow::Result<TableOutcome> {
    let prompt = build_taxon_prompt(species);
    let batch = generate_batch(model, &prompt, TAXON_TEMPERATURE, ctx.retry_policy())
        .await
        .context("taxonomy generation failed")?;

    let records = filter_taxon_records(&batch.records);
    tracing::debug!(generated = batch.len(), kept = records.len(), "taxonomy records filtered");
    if records.is_empty() {
        return Ok(TableOutcome::Failed(String::from(
            "the reply held no usable taxonomy record",
        )));
    }

    let report = ctx
        .db
        .insert_batch(table, &RecordBatch::from_records(records))
        .await?;
    Ok(TableOutcome::from_report(&report))
}
