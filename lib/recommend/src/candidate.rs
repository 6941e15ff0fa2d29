//! Candidate places and the recommendation payload.

use serde::{Deserialize, Serialize};
use wayfarer_ai::RankingCandidate;
use wayfarer_core::PlaceId;
use wayfarer_integration::{PlaceRecord, Review};

/// Travel time shown when none is known.
pub const UNKNOWN_TRAVEL_TIME: &str = "N/A";

/// A place considered during one turn.
///
/// Rebuilt from service responses every turn; never stored in the session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub place_id: PlaceId,
    pub name: String,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    pub price_level: Option<u8>,
    pub types: Vec<String>,
    pub editorial_summary: Option<String>,
    pub wheelchair_accessible_entrance: Option<bool>,
    pub reviews: Vec<Review>,
    pub photo_urls: Vec<String>,
    pub travel_time: String,
    /// Deep link, attached once the candidate is recommended.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Candidate {
    /// Builds a candidate from a detail record and its derived photo URLs.
    #[must_use]
    pub fn from_record(record: PlaceRecord, photo_urls: Vec<String>) -> Self {
        Self {
            place_id: record.place_id,
            name: record.name,
            rating: record.rating,
            user_ratings_total: record.user_ratings_total,
            price_level: record.price_level,
            types: record.types,
            editorial_summary: record.editorial_summary,
            wheelchair_accessible_entrance: record.wheelchair_accessible_entrance,
            reviews: record.reviews,
            photo_urls,
            travel_time: UNKNOWN_TRAVEL_TIME.to_string(),
            link: None,
        }
    }

    /// What the ranking model sees of this candidate.
    #[must_use]
    pub fn to_ranking_candidate(&self, review_excerpts: usize) -> RankingCandidate {
        RankingCandidate {
            place_id: self.place_id.clone(),
            name: self.name.clone(),
            types: self.types.clone(),
            rating: self.rating,
            user_ratings_total: self.user_ratings_total,
            price_level: self.price_level,
            travel_time: self.travel_time.clone(),
            wheelchair_accessible_entrance: self.wheelchair_accessible_entrance,
            editorial_summary: self.editorial_summary.clone(),
            reviews: self
                .reviews
                .iter()
                .take(review_excerpts)
                .map(|r| r.text.clone())
                .collect(),
        }
    }
}

/// Places recommended in one turn, best first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResult {
    pub recommendations: Vec<Candidate>,
    pub last_keyword: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> PlaceRecord {
        PlaceRecord {
            place_id: PlaceId::from("abc"),
            name: "Casa Pepe".to_string(),
            rating: Some(4.6),
            reviews: (0..5)
                .map(|i| Review {
                    author_name: None,
                    rating: None,
                    text: format!("review {i}"),
                })
                .collect(),
            ..PlaceRecord::default()
        }
    }

    #[test]
    fn new_candidate_has_unknown_travel_time_and_no_link() {
        let candidate = Candidate::from_record(record(), vec!["u1".to_string()]);
        assert_eq!(candidate.travel_time, "N/A");
        assert!(candidate.link.is_none());

        let json = serde_json::to_value(&candidate).unwrap();
        assert!(json.get("link").is_none());
    }

    #[test]
    fn ranking_view_limits_reviews() {
        let candidate = Candidate::from_record(record(), Vec::new());
        let view = candidate.to_ranking_candidate(3);
        assert_eq!(view.reviews, vec!["review 0", "review 1", "review 2"]);
        assert_eq!(view.travel_time, "N/A");
    }
}
