//! `nexus-bio similar`: rank stored media by CLIP similarity to an image.

use std::path::PathBuf;

use anyhow::{Context, bail};
use nexus_core::catalog::MEDIA_TABLE;
use nexus_core::{CellValue, QueryResult};
use nexus_embeddings::{ImageEmbedder, Ranked, rank_top_k};
use serde::Serialize;

use crate::cli::root_commands::SimilarArgs;
use crate::cli::{GlobalFlags, OutputFormat};
use crate::commands::shared::tables::resolve;
use crate::context::AppContext;
use crate::output::output;
use crate::progress::Progress;
use crate::prompt::Prompter;

const SPECIES_OF_MEDIA_SQL: &str = "SELECT e.Nome, e.Descricao FROM Midia m \
     JOIN Especime es ON m.ID_Especime = es.ID_Especime \
     JOIN Especie e ON es.ID_Esp = e.ID_Esp \
     WHERE m.ID_Midia = ? LIMIT 1";

const UNKNOWN_SPECIES: &str = "species not found";

#[derive(Debug, Serialize)]
struct SimilarMatch {
    id_midia: CellValue,
    similarity: f32,
    species: String,
    description: String,
}

/// Handle `nexus-bio similar`.
pub async fn handle<P: Prompter>(
    args: &SimilarArgs,
    ctx: &AppContext,
    prompter: &mut P,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let path = match &args.image {
        Some(path) => path.clone(),
        None => PathBuf::from(prompter.input("Query image path")?),
    };
    let query_image = tokio::fs::read(&path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;

    let names = ctx.db.table_names().await?;
    let media_table = resolve(&names, MEDIA_TABLE)?;
    let stored = ctx
        .db
        .fetch(&format!("SELECT ID_Midia, Dado FROM `{media_table}`"), &[])
        .await?;
    let images = stored_images(&stored);
    if images.is_empty() {
        println!("No images stored in `{media_table}`.");
        return Ok(());
    }

    let top_k = args.top.unwrap_or(ctx.config.media.top_k).max(1);
    let cache_dir = ctx.config.media.model_cache_dir.clone();
    let progress = Progress::bar(images.len() as u64 + 1, "embedding images");

    let ranked = tokio::task::spawn_blocking(move || -> anyhow::Result<Vec<Ranked<CellValue>>> {
        let mut embedder = ImageEmbedder::new(cache_dir.as_deref())?;
        let query = embedder
            .embed_image(&query_image)
            .context("cannot embed the query image")?;
        progress.inc(1);

        let mut candidates = Vec::with_capacity(images.len());
        for (id, bytes) in images {
            match embedder.embed_image(&bytes) {
                Ok(vector) => candidates.push((id, vector)),
                Err(error) => tracing::warn!(media = %id, %error, "skipping unreadable image"),
            }
            progress.inc(1);
        }
        progress.finish_clear();
        Ok(rank_top_k(&query, candidates, top_k))
    })
    .await
    .context("embedding task panicked")??;

    if ranked.is_empty() {
        bail!("none of the stored images could be embedded");
    }

    let mut matches = Vec::with_capacity(ranked.len());
    for Ranked { key, score } in ranked {
        let species = ctx
            .db
            .fetch(SPECIES_OF_MEDIA_SQL, std::slice::from_ref(&key))
            .await?;
        let (name, description) = species_text(&species);
        matches.push(SimilarMatch {
            id_midia: key,
            similarity: score,
            species: name,
            description,
        });
    }

    if flags.format != OutputFormat::Table {
        return output(&matches, flags.format);
    }
    for found in &matches {
        println!(
            "ID_Midia: {}, similarity: {:.3}, species: {}, description: {}",
            found.id_midia, found.similarity, found.species, found.description
        );
    }
    Ok(())
}

/// `(ID_Midia, bytes)` pairs; rows without image data are skipped.
fn stored_images(result: &QueryResult) -> Vec<(CellValue, Vec<u8>)> {
    result
        .rows
        .iter()
        .filter_map(|row| match (row.first(), row.get(1)) {
            (Some(id), Some(CellValue::Bytes(bytes))) if !bytes.is_empty() => {
                Some((id.clone(), bytes.clone()))
            }
            _ => None,
        })
        .collect()
}

fn species_text(result: &QueryResult) -> (String, String) {
    let Some(row) = result.rows.first() else {
        return (UNKNOWN_SPECIES.to_string(), String::from("-"));
    };
    let cell = |index: usize, fallback: &str| {
        row.get(index)
            .filter(|cell| !cell.is_null())
            .map_or_else(|| fallback.to_string(), ToString::to_string)
    };
    (cell(0, UNKNOWN_SPECIES), cell(1, "-"))
}
