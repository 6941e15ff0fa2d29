//! Connector trait and related types.
//!
//! The recommendation flow talks to place services only through
//! [`PlacesConnector`], so tests can substitute an in-memory fake.

use crate::error::ConnectorError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use wayfarer_core::{LatLng, PlaceId};

/// A search hit before enrichment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceStub {
    /// Service identifier.
    pub place_id: PlaceId,
    /// Display name, when the search result carries one.
    #[serde(default)]
    pub name: Option<String>,
}

impl PlaceStub {
    /// Creates a stub with only an identifier.
    #[must_use]
    pub fn new(place_id: impl Into<PlaceId>) -> Self {
        Self {
            place_id: place_id.into(),
            name: None,
        }
    }
}

/// One user review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub author_name: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub text: String,
}

/// Detailed attributes of one place.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PlaceRecord {
    pub place_id: PlaceId,
    pub name: String,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    pub price_level: Option<u8>,
    pub types: Vec<String>,
    pub editorial_summary: Option<String>,
    pub wheelchair_accessible_entrance: Option<bool>,
    pub reviews: Vec<Review>,
    /// Raw photo references, in service order.
    pub photo_references: Vec<String>,
}

/// Human-readable travel duration per place.
///
/// Places the service could not route to are absent.
pub type TravelTimes = HashMap<PlaceId, String>;

/// Access to place search, place detail and travel-time services.
#[async_trait]
pub trait PlacesConnector: Send + Sync {
    /// Returns the connector name used in logs.
    fn name(&self) -> &str;

    /// Finds places matching `keyword` within `radius_m` meters of `origin`,
    /// in service order.
    ///
    /// # Errors
    ///
    /// Returns an error if the service call fails or reports a failure status.
    async fn search_nearby(
        &self,
        origin: LatLng,
        keyword: &str,
        radius_m: u32,
    ) -> Result<Vec<PlaceStub>, ConnectorError>;

    /// Fetches the fixed attribute set for one place.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup fails.
    async fn place_details(&self, place_id: &PlaceId) -> Result<PlaceRecord, ConnectorError>;

    /// Fetches travel durations from `origin` to every place in one call.
    ///
    /// # Errors
    ///
    /// Returns an error if the batch call fails as a whole.
    async fn travel_times(
        &self,
        origin: LatLng,
        place_ids: &[PlaceId],
    ) -> Result<TravelTimes, ConnectorError>;

    /// Builds a displayable URL for a photo reference.
    fn photo_url(&self, photo_reference: &str) -> String;
}
