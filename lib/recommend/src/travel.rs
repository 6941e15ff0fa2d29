//! Travel-time annotation.

use crate::candidate::{Candidate, UNKNOWN_TRAVEL_TIME};
use tracing::{instrument, warn};
use wayfarer_core::{LatLng, PlaceId};
use wayfarer_integration::{PlacesConnector, TravelTimes};

/// Sets each candidate's travel time from one batched lookup. Candidates
/// the service could not route to, or every candidate if the call fails,
/// get [`UNKNOWN_TRAVEL_TIME`].
#[instrument(skip(places, candidates), fields(candidates = candidates.len()))]
pub async fn annotate(places: &dyn PlacesConnector, origin: LatLng, candidates: &mut [Candidate]) {
    if candidates.is_empty() {
        return;
    }

    let place_ids: Vec<PlaceId> = candidates.iter().map(|c| c.place_id.clone()).collect();
    let times = match places.travel_times(origin, &place_ids).await {
        Ok(times) => times,
        Err(e) => {
            warn!(error = %e, "travel-time lookup failed");
            TravelTimes::new()
        }
    };

    for candidate in candidates {
        candidate.travel_time = times
            .get(&candidate.place_id)
            .cloned()
            .unwrap_or_else(|| UNKNOWN_TRAVEL_TIME.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enrich::enrich;
    use crate::testing::{FakePlaces, ids};

    #[tokio::test]
    async fn one_batch_for_all_candidates() {
        let places = FakePlaces::with_results(&[]).with_travel(&[("a", "5 mins")]);
        let mut candidates = enrich(&places, &ids(&["a", "b"]), 3).await;

        annotate(&places, LatLng::new(0.0, 0.0), &mut candidates).await;

        assert_eq!(candidates[0].travel_time, "5 mins");
        assert_eq!(candidates[1].travel_time, "N/A");
        assert_eq!(*places.travel_batches.lock().unwrap(), vec![ids(&["a", "b"])]);
    }

    #[tokio::test]
    async fn failed_lookup_leaves_unknown() {
        let places = FakePlaces::with_results(&[])
            .with_travel(&[("a", "5 mins")])
            .failing_travel();
        let mut candidates = enrich(&places, &ids(&["a"]), 3).await;

        annotate(&places, LatLng::new(0.0, 0.0), &mut candidates).await;
        assert_eq!(candidates[0].travel_time, "N/A");
    }

    #[tokio::test]
    async fn no_candidates_no_call() {
        let places = FakePlaces::with_results(&[]);
        annotate(&places, LatLng::new(0.0, 0.0), &mut []).await;
        assert!(places.travel_batches.lock().unwrap().is_empty());
    }
}
