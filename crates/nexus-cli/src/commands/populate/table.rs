//! Generic generation for every table without its own generator.

use anyhow::Context;
use nexus_core::RecordBatch;
use nexus_llm::generate::generate_batch;
use nexus_llm::prompts::build_table_prompt;
use nexus_llm::validate::{adjust_row_count, patch_foreign_keys, validate_records, validate_structure};
use nexus_llm::ChatModel;
use serde_json::Value;

use super::context::{collect_allow_lists, collect_context, sizing_counts, unmet_dependencies};
use super::{Run, TableOutcome};

impl<M: ChatModel + Sync> Run<'_, M> {
    pub(super) async fn generic(
        &mut self,
        table: &str,
        populated: &[String],
    ) -> anyhow::Result<TableOutcome> {
        let db = &self.ctx.db;

        let unmet = unmet_dependencies(db, &self.names, table).await?;
        if !unmet.is_empty() {
            return Ok(TableOutcome::Failed(format!(
                "parent tables are empty: {}",
                unmet.join(", ")
            )));
        }

        let counts = sizing_counts(db, &self.names, table).await?;
        let rows = adjust_row_count(table, self.options.rows, &counts);
        if rows == 0 {
            return Ok(TableOutcome::Failed(String::from("a parent table has no rows")));
        }

        let columns = match self.schema.get(table) {
            Some(columns) => columns.clone(),
            None => db.columns(table).await?,
        };
        let context = collect_context(db, populated, self.ctx.config.general.context_rows).await;
        let allow_lists = collect_allow_lists(db, table).await;
        tracing::debug!(
            %table,
            rows,
            context_tables = context.len(),
            fk_columns = allow_lists.len(),
            "generating"
        );

        let prompt = build_table_prompt(table, &columns, rows, &context, &allow_lists);
        let batch = generate_batch(
            self.model,
            &prompt,
            self.ctx.config.openai.temperature,
            self.ctx.retry_policy(),
        )
        .await
        .with_context(|| format!("generation for `{table}` failed"))?;
        if batch.is_empty() {
            return Ok(TableOutcome::NothingGenerated);
        }

        let validated = validate_records(table, &batch.records, &mut self.rng);
        if validated.corrections > 0 || validated.dropped > 0 {
            tracing::info!(
                %table,
                corrections = validated.corrections,
                dropped = validated.dropped,
                "generated values corrected"
            );
        }

        let as_values = validated
            .records
            .iter()
            .cloned()
            .map(Value::Object)
            .collect::<Vec<_>>();
        if !validate_structure(&as_values, &columns) {
            return Ok(TableOutcome::Failed(String::from(
                "generated records do not match the table columns",
            )));
        }

        let mut records = validated.records;
        let patched = patch_foreign_keys(&mut records, &allow_lists, &mut self.rng);
        if patched > 0 {
            tracing::info!(%table, patched, "replaced invalid foreign keys");
        }

        let report = db
            .insert_batch(table, &RecordBatch::from_records(records))
            .await?;
        Ok(TableOutcome::from_report(&report))
    }
}
