//! Detail enrichment.
//!
//! Lookups run concurrently. A failed lookup drops that candidate and
//! nothing else.

use crate::candidate::Candidate;
use futures::future::join_all;
use tracing::{debug, instrument, warn};
use wayfarer_core::PlaceId;
use wayfarer_integration::PlacesConnector;

/// Looks up details for every id, keeping the input order of the survivors.
#[instrument(skip(places, place_ids), fields(requested = place_ids.len()))]
pub async fn enrich(
    places: &dyn PlacesConnector,
    place_ids: &[PlaceId],
    photo_limit: usize,
) -> Vec<Candidate> {
    let lookups = place_ids
        .iter()
        .map(|id| async move { (id, places.place_details(id).await) });

    let candidates: Vec<Candidate> = join_all(lookups)
        .await
        .into_iter()
        .filter_map(|(id, result)| match result {
            Ok(record) => {
                let photo_urls = record
                    .photo_references
                    .iter()
                    .take(photo_limit)
                    .map(|reference| places.photo_url(reference))
                    .collect();
                Some(Candidate::from_record(record, photo_urls))
            }
            Err(e) => {
                warn!(place = %id, error = %e, "detail lookup failed, dropping candidate");
                None
            }
        })
        .collect();

    debug!(enriched = candidates.len(), "enrichment completed");
    candidates
}
