//! Candidate retrieval and deduplication.

use std::collections::HashSet;
use tracing::{debug, instrument, warn};
use wayfarer_core::{LatLng, PlaceId};
use wayfarer_integration::{PlaceStub, PlacesConnector};

/// Searches for places. A failed search counts as finding nothing.
#[instrument(skip(places), fields(connector = places.name()))]
pub async fn search(
    places: &dyn PlacesConnector,
    origin: LatLng,
    keyword: &str,
    radius_m: u32,
) -> Vec<PlaceStub> {
    match places.search_nearby(origin, keyword, radius_m).await {
        Ok(stubs) => {
            debug!(found = stubs.len(), "search completed");
            stubs
        }
        Err(e) => {
            warn!(error = %e, "place search failed, treating as no results");
            Vec::new()
        }
    }
}

/// Picks up to `limit` places not yet shown in this session, in search
/// order. Repeated hits within one search are kept once.
#[must_use]
pub fn unseen(stubs: &[PlaceStub], excluded: &HashSet<PlaceId>, limit: usize) -> Vec<PlaceId> {
    let mut picked = HashSet::new();
    stubs
        .iter()
        .map(|stub| &stub.place_id)
        .filter(|id| !excluded.contains(*id))
        .filter(|id| picked.insert((*id).clone()))
        .take(limit)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakePlaces, ids};

    fn stubs(raw: &[&str]) -> Vec<PlaceStub> {
        ids(raw).into_iter().map(PlaceStub::new).collect()
    }

    #[test]
    fn excluded_places_are_skipped_in_order() {
        let excluded: HashSet<PlaceId> = ids(&["b", "d"]).into_iter().collect();
        let picked = unseen(&stubs(&["a", "b", "c", "d", "e"]), &excluded, 15);
        assert_eq!(picked, ids(&["a", "c", "e"]));
    }

    #[test]
    fn limit_applies_after_exclusion() {
        let excluded: HashSet<PlaceId> = ids(&["a"]).into_iter().collect();
        let picked = unseen(&stubs(&["a", "b", "c", "d"]), &excluded, 2);
        assert_eq!(picked, ids(&["b", "c"]));
    }

    #[test]
    fn duplicate_hits_are_kept_once() {
        let picked = unseen(&stubs(&["a", "a", "b"]), &HashSet::new(), 15);
        assert_eq!(picked, ids(&["a", "b"]));
    }

    #[test]
    fn everything_excluded_yields_nothing() {
        let excluded: HashSet<PlaceId> = ids(&["a", "b"]).into_iter().collect();
        assert!(unseen(&stubs(&["a", "b"]), &excluded, 15).is_empty());
    }

    #[tokio::test]
    async fn failed_search_is_empty() {
        let places = FakePlaces::failing_search();
        let found = search(&places, LatLng::new(0.0, 0.0), "tapas", 3000).await;
        assert!(found.is_empty());
        assert_eq!(places.last_search(), ("tapas".to_string(), 3000));
    }
}
