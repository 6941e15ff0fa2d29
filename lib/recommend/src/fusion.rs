//! Ranking fusion.
//!
//! Asks the ranking model to score candidates, then maps its answer back to
//! the full candidate records. Scores and justifications stop here; only the
//! ordering survives.

use crate::candidate::Candidate;
use crate::config::RecommendConfig;
use crate::error::TurnError;
use std::collections::HashMap;
use tracing::{debug, instrument, warn};
use wayfarer_ai::{RankingModel, RankingRequest, ScoredPlace};
use wayfarer_core::{LatLng, PlaceId};
use wayfarer_integration::place_link;

/// Ranks `candidates` for the conversation and returns the best ones with
/// deep links attached.
///
/// # Errors
///
/// Returns [`TurnError::RankingFailed`] if the model call fails or none of
/// the places it ranked is a known candidate.
#[instrument(skip_all, fields(candidates = candidates.len()))]
pub async fn rank_and_fuse(
    ranker: &dyn RankingModel,
    transcript: String,
    origin: LatLng,
    candidates: Vec<Candidate>,
    config: &RecommendConfig,
) -> Result<Vec<Candidate>, TurnError> {
    let request = RankingRequest {
        transcript,
        origin,
        candidates: candidates
            .iter()
            .map(|c| c.to_ranking_candidate(config.review_excerpts))
            .collect(),
        limit: config.recommendation_count,
    };

    let scored = ranker
        .rank(&request)
        .await
        .map_err(|e| TurnError::RankingFailed {
            reason: e.to_string(),
        })?;

    let fused = fuse(scored, candidates, config.recommendation_count);
    if fused.is_empty() {
        return Err(TurnError::RankingFailed {
            reason: "ranking named no known candidate".to_string(),
        });
    }
    Ok(fused)
}

/// Orders candidates by score, best first, and keeps the top `limit`.
///
/// Unknown and repeated ids are ignored. Ties keep the model's order.
#[must_use]
pub fn fuse(mut scored: Vec<ScoredPlace>, candidates: Vec<Candidate>, limit: usize) -> Vec<Candidate> {
    scored.sort_by(|a, b| b.final_score.total_cmp(&a.final_score));

    let mut pool: HashMap<PlaceId, Candidate> = candidates
        .into_iter()
        .map(|c| (c.place_id.clone(), c))
        .collect();

    let fused: Vec<Candidate> = scored
        .into_iter()
        .filter_map(|s| {
            let candidate = pool.remove(&s.place_id);
            if candidate.is_none() {
                warn!(place = %s.place_id, "ranking named an unknown or repeated place");
            }
            candidate
        })
        .take(limit)
        .map(|mut candidate| {
            candidate.link = Some(place_link(&candidate.place_id));
            candidate
        })
        .collect();

    debug!(recommended = fused.len(), "ranking fused");
    fused
}
