//! One image per specimen: a downloaded photo, else a generated placeholder.

use std::time::Duration;

use nexus_core::{CellValue, QueryResult};
use nexus_media::{ImageSource, MediaKind, media_label, placeholder_png};

use super::TableOutcome;
use crate::context::AppContext;

const SPECIMENS_SQL: &str = "SELECT e.ID_Especime, s.Nome, s.Nome_Pop, s.Descricao, s.ID_Esp \
     FROM Especime e JOIN Especie s ON e.ID_Esp = s.ID_Esp LIMIT ?";

const MEDIA_COLUMNS: [&str; 3] = ["ID_Especime", "Tipo", "Dado"];

/// A specimen and the species text used to find or draw its image.
#[derive(Debug, Clone, PartialEq)]
pub struct Specimen {
    pub id: CellValue,
    pub name: String,
    pub popular: Option<String>,
    pub description: Option<String>,
}

impl Specimen {
    /// Rows of [`SPECIMENS_SQL`]; rows without an id or species name are skipped.
    #[must_use]
    pub fn from_result(result: &QueryResult) -> Vec<Self> {
        result
            .rows
            .iter()
            .filter_map(|row| {
                let id = row.first().filter(|id| !id.is_null())?.clone();
                let name = text(row.get(1))?;
                Some(Self {
                    id,
                    name,
                    popular: text(row.get(2)),
                    description: text(row.get(3)),
                })
            })
            .collect()
    }
}

fn text(cell: Option<&CellValue>) -> Option<String> {
    cell.filter(|cell| !cell.is_null())
        .map(ToString::to_string)
        .filter(|text| !text.trim().is_empty())
}

pub async fn populate(ctx: &AppContext, table: &str) -> anyhow::Result<TableOutcome> {
    let media = &ctx.config.media;
    let result = ctx
        .db
        .fetch(SPECIMENS_SQL, &[CellValue::UInt(u64::from(media.max_specimens))])
        .await?;
    let specimens = Specimen::from_result(&result);
    if specimens.is_empty() {
        return Ok(TableOutcome::Failed(String::from("no specimens to illustrate")));
    }

    let source = if media.has_image_source() {
        Some(ImageSource::new(media)?)
    } else {
        None
    };
    let columns = MEDIA_COLUMNS.map(String::from);
    let delay = Duration::from_millis(media.request_delay_ms);

    let mut inserted = 0;
    let mut failed = 0;
    for (position, specimen) in specimens.iter().enumerate() {
        if position > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let fetched = match &source {
            Some(source) => {
                source
                    .fetch_species(&specimen.name, specimen.popular.as_deref())
                    .await
            }
            None => None,
        };
        let (bytes, kind) = match fetched {
            Some(image) => {
                tracing::debug!(species = %specimen.name, url = %image.url, "photo found");
                (image.bytes, MediaKind::Photo)
            }
            None => (
                placeholder_png(
                    &specimen.name,
                    specimen.description.as_deref(),
                    media.placeholder_width,
                    media.placeholder_height,
                )?,
                MediaKind::Placeholder,
            ),
        };

        let values = [
            specimen.id.clone(),
            CellValue::Text(media_label(kind, &specimen.name)),
            CellValue::Bytes(bytes),
        ];
        match ctx.db.insert_row(table, &columns, &values).await {
            Ok(_) => inserted += 1,
            Err(error) => {
                failed += 1;
                tracing::warn!(species = %specimen.name, %error, "media insert failed");
            }
        }
    }

    if inserted == 0 {
        return Ok(TableOutcome::Failed(String::from("no image was stored")));
    }
    Ok(TableOutcome::Inserted {
        rows: inserted,
        failed,
    })
}
