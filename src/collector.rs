use serde::Serialize;
use tracing::{info, warn};

use crate::api::DrawSource;
use crate::database::DrawRepository;
use crate::error::{LottoError, Result};
use crate::types::{Draw, DrawSummary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CollectOutcome {
    Saved { draw_id: String, draw_date: String },
    /// The newest draw still has unrevealed numbers and was not stored.
    Incomplete { draw_id: String, draw_date: String },
}

async fn newest_summaries<S: DrawSource>(source: &S) -> Result<Vec<DrawSummary>> {
    let summaries = source.list(1).await?;
    if summaries.is_empty() {
        return Err(LottoError::EmptyListing);
    }
    Ok(summaries)
}

/// Fetches the newest draw and stores it unless it is still incomplete.
pub async fn collect_latest<S: DrawSource>(
    source: &S,
    repository: &DrawRepository,
) -> Result<CollectOutcome> {
    let summaries = newest_summaries(source).await?;
    let draw_id = summaries[0].id.clone();
    let draw = source.fetch(&draw_id).await?;

    if draw.is_incomplete() {
        warn!(draw_id = %draw_id, date = %draw.date, "latest draw is incomplete, not saving");
        return Ok(CollectOutcome::Incomplete {
            draw_id,
            draw_date: draw.date,
        });
    }

    repository.save(&draw_id, &draw)?;
    info!(draw_id = %draw_id, date = %draw.date, "collected draw");

    Ok(CollectOutcome::Saved {
        draw_id,
        draw_date: draw.date,
    })
}

/// The newest draw, falling back to the one before it while the newest is incomplete.
pub async fn latest_complete<S: DrawSource>(source: &S) -> Result<(String, Draw)> {
    let summaries = newest_summaries(source).await?;
    let newest = source.fetch(&summaries[0].id).await?;

    if newest.is_incomplete() {
        if let Some(previous) = summaries.get(1) {
            let draw = source.fetch(&previous.id).await?;
            return Ok((previous.id.clone(), draw));
        }
    }

    Ok((summaries[0].id.clone(), newest))
}
