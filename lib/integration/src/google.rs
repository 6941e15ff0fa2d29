//! Google Maps REST connector.

use crate::connector::{PlaceRecord, PlaceStub, PlacesConnector, Review, TravelTimes};
use crate::error::ConnectorError;
use async_trait::async_trait;
use reqwest::Client;
use rootcause::Report;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use wayfarer_core::{LatLng, PlaceId};

/// Attributes requested from the place-detail endpoint.
pub const DETAIL_FIELDS: &str = "place_id,name,rating,reviews,photos,user_ratings_total,price_level,types,editorial_summary,wheelchair_accessible_entrance";

/// Width requested for photo URLs.
pub const PHOTO_MAX_WIDTH: u32 = 400;

/// Builds the public deep link for a place.
#[must_use]
pub fn place_link(place_id: &PlaceId) -> String {
    format!("https://www.google.com/maps/place/?q=place_id:{place_id}")
}

/// Google Maps connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleMapsConfig {
    /// API key sent with every request.
    pub api_key: String,
    /// Base URL of the Maps web services.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "https://maps.googleapis.com/maps/api".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

impl Default for GoogleMapsConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_base_url(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Connector for the Places and Distance Matrix web services.
#[derive(Debug, Clone)]
pub struct GoogleMapsClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl GoogleMapsClient {
    /// Creates a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key is empty or the HTTP client cannot be
    /// built.
    pub fn new(config: &GoogleMapsConfig) -> Result<Self, Report<ConnectorError>> {
        if config.api_key.trim().is_empty() {
            return Err(ConnectorError::InvalidConfig {
                reason: "Google Maps API key is empty".to_string(),
            }
            .into());
        }

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ConnectorError::InvalidConfig {
                reason: e.to_string(),
            })?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    async fn get_json<T: DeserializeOwned + HasStatus>(
        &self,
        operation: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ConnectorError> {
        let response = self
            .http
            .get(format!("{}/{path}", self.base_url))
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| ConnectorError::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ConnectorError::HttpStatus {
                operation: operation.to_string(),
                status: status.as_u16(),
            });
        }

        let body: T = response
            .json()
            .await
            .map_err(|e| ConnectorError::ProtocolError {
                reason: e.to_string(),
            })?;
        body.check(operation)?;
        Ok(body)
    }
}

#[async_trait]
impl PlacesConnector for GoogleMapsClient {
    fn name(&self) -> &str {
        "google_maps"
    }

    #[instrument(skip(self), fields(origin = %origin))]
    async fn search_nearby(
        &self,
        origin: LatLng,
        keyword: &str,
        radius_m: u32,
    ) -> Result<Vec<PlaceStub>, ConnectorError> {
        let body: NearbySearchResponse = self
            .get_json(
                "nearbysearch",
                "place/nearbysearch/json",
                &[
                    ("location", origin.to_string()),
                    ("radius", radius_m.to_string()),
                    ("keyword", keyword.to_string()),
                ],
            )
            .await?;

        let stubs: Vec<PlaceStub> = body.results.into_iter().map(PlaceStub::from).collect();
        debug!(found = stubs.len(), "nearby search completed");
        Ok(stubs)
    }

    #[instrument(skip(self), fields(place = %place_id))]
    async fn place_details(&self, place_id: &PlaceId) -> Result<PlaceRecord, ConnectorError> {
        let body: DetailsResponse = self
            .get_json(
                "details",
                "place/details/json",
                &[
                    ("place_id", place_id.to_string()),
                    ("fields", DETAIL_FIELDS.to_string()),
                ],
            )
            .await?;

        body.result
            .map(|result| result.into_record(place_id))
            .ok_or_else(|| ConnectorError::ProtocolError {
                reason: "details response has no result".to_string(),
            })
    }

    #[instrument(skip(self, place_ids), fields(origin = %origin, places = place_ids.len()))]
    async fn travel_times(
        &self,
        origin: LatLng,
        place_ids: &[PlaceId],
    ) -> Result<TravelTimes, ConnectorError> {
        if place_ids.is_empty() {
            return Ok(TravelTimes::new());
        }

        let destinations = place_ids
            .iter()
            .map(|id| format!("place_id:{id}"))
            .collect::<Vec<_>>()
            .join("|");

        let body: DistanceMatrixResponse = self
            .get_json(
                "distancematrix",
                "distancematrix/json",
                &[
                    ("origins", origin.to_string()),
                    ("destinations", destinations),
                ],
            )
            .await?;

        Ok(body.into_travel_times(place_ids))
    }

    fn photo_url(&self, photo_reference: &str) -> String {
        format!(
            "{}/place/photo?maxwidth={PHOTO_MAX_WIDTH}&photoreference={photo_reference}&key={}",
            self.base_url, self.api_key
        )
    }
}

/// Application-level status carried in every Maps response body.
trait HasStatus {
    fn status(&self) -> &str;
    fn error_message(&self) -> Option<&str>;

    fn check(&self, operation: &str) -> Result<(), ConnectorError> {
        match self.status() {
            "OK" | "ZERO_RESULTS" => Ok(()),
            other => Err(ConnectorError::ServiceStatus {
                operation: operation.to_string(),
                status: other.to_string(),
                message: self.error_message().map(str::to_string),
            }),
        }
    }
}

macro_rules! impl_has_status {
    ($($ty:ty),*) => {
        $(impl HasStatus for $ty {
            fn status(&self) -> &str {
                &self.status
            }

            fn error_message(&self) -> Option<&str> {
                self.error_message.as_deref()
            }
        })*
    };
}

impl_has_status!(NearbySearchResponse, DetailsResponse, DistanceMatrixResponse);

#[derive(Debug, Deserialize)]
struct NearbySearchResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<NearbyResult>,
}

#[derive(Debug, Deserialize)]
struct NearbyResult {
    place_id: PlaceId,
    #[serde(default)]
    name: Option<String>,
}

impl From<NearbyResult> for PlaceStub {
    fn from(result: NearbyResult) -> Self {
        Self {
            place_id: result.place_id,
            name: result.name,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    result: Option<DetailsResult>,
}

#[derive(Debug, Deserialize)]
struct DetailsResult {
    #[serde(default)]
    place_id: Option<PlaceId>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    rating: Option<f64>,
    #[serde(default)]
    user_ratings_total: Option<u32>,
    #[serde(default)]
    price_level: Option<u8>,
    #[serde(default)]
    types: Vec<String>,
    #[serde(default)]
    editorial_summary: Option<EditorialSummary>,
    #[serde(default)]
    wheelchair_accessible_entrance: Option<bool>,
    #[serde(default)]
    reviews: Vec<Review>,
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct EditorialSummary {
    #[serde(default)]
    overview: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    photo_reference: String,
}

impl DetailsResult {
    fn into_record(self, requested: &PlaceId) -> PlaceRecord {
        PlaceRecord {
            place_id: self.place_id.unwrap_or_else(|| requested.clone()),
            name: self.name,
            rating: self.rating,
            user_ratings_total: self.user_ratings_total,
            price_level: self.price_level,
            types: self.types,
            editorial_summary: self.editorial_summary.and_then(|s| s.overview),
            wheelchair_accessible_entrance: self.wheelchair_accessible_entrance,
            reviews: self.reviews,
            photo_references: self.photos.into_iter().map(|p| p.photo_reference).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct DistanceMatrixResponse {
    status: String,
    #[serde(default)]
    error_message: Option<String>,
    #[serde(default)]
    rows: Vec<MatrixRow>,
}

#[derive(Debug, Deserialize)]
struct MatrixRow {
    #[serde(default)]
    elements: Vec<MatrixElement>,
}

#[derive(Debug, Deserialize)]
struct MatrixElement {
    status: String,
    #[serde(default)]
    duration: Option<TextValue>,
}

#[derive(Debug, Deserialize)]
struct TextValue {
    text: String,
}

impl DistanceMatrixResponse {
    /// Pairs the i-th element of the first row with the i-th place.
    fn into_travel_times(self, place_ids: &[PlaceId]) -> TravelTimes {
        let Some(row) = self.rows.into_iter().next() else {
            warn!("distance matrix returned no rows");
            return TravelTimes::new();
        };

        place_ids
            .iter()
            .zip(row.elements)
            .filter(|(_, element)| element.status == "OK")
            .filter_map(|(id, element)| element.duration.map(|d| (id.clone(), d.text)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client() -> GoogleMapsClient {
        GoogleMapsClient::new(&GoogleMapsConfig {
            api_key: "test-key".to_string(),
            ..GoogleMapsConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn empty_api_key_is_rejected() {
        assert!(GoogleMapsClient::new(&GoogleMapsConfig::default()).is_err());
    }

    #[test]
    fn deep_link_format() {
        assert_eq!(
            place_link(&PlaceId::from("ChIJ123")),
            "https://www.google.com/maps/place/?q=place_id:ChIJ123"
        );
    }

    #[test]
    fn photo_url_format() {
        assert_eq!(
            client().photo_url("ref-1"),
            "https://maps.googleapis.com/maps/api/place/photo?maxwidth=400&photoreference=ref-1&key=test-key"
        );
    }

    #[test]
    fn zero_results_is_success() {
        let body: NearbySearchResponse =
            serde_json::from_value(json!({"status": "ZERO_RESULTS", "results": []})).unwrap();
        assert!(body.check("nearbysearch").is_ok());
        assert!(body.results.is_empty());
    }

    #[test]
    fn denied_status_is_an_error() {
        let body: NearbySearchResponse = serde_json::from_value(json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        }))
        .unwrap();
        let err = body.check("nearbysearch").unwrap_err();
        assert!(matches!(err, ConnectorError::ServiceStatus { ref status, .. } if status == "REQUEST_DENIED"));
    }

    #[test]
    fn details_result_maps_to_record() {
        let body: DetailsResponse = serde_json::from_value(json!({
            "status": "OK",
            "result": {
                "name": "Casa Pepe",
                "rating": 4.6,
                "user_ratings_total": 812,
                "price_level": 2,
                "types": ["restaurant", "food"],
                "editorial_summary": {"overview": "Classic tapas bar."},
                "reviews": [{"author_name": "Ana", "rating": 5, "text": "Best croquetas"}],
                "photos": [{"photo_reference": "p1"}, {"photo_reference": "p2"}]
            }
        }))
        .unwrap();

        let record = body.result.unwrap().into_record(&PlaceId::from("abc"));
        assert_eq!(record.place_id.as_str(), "abc");
        assert_eq!(record.editorial_summary.as_deref(), Some("Classic tapas bar."));
        assert_eq!(record.photo_references, vec!["p1", "p2"]);
        assert_eq!(record.reviews[0].text, "Best croquetas");
        assert_eq!(record.price_level, Some(2));
    }

    #[test]
    fn matrix_elements_pair_by_position() {
        let body: DistanceMatrixResponse = serde_json::from_value(json!({
            "status": "OK",
            "rows": [{"elements": [
                {"status": "OK", "duration": {"text": "8 mins", "value": 480}},
                {"status": "NOT_FOUND"},
                {"status": "OK", "duration": {"text": "21 mins", "value": 1260}}
            ]}]
        }))
        .unwrap();
        let ids = [PlaceId::from("a"), PlaceId::from("b"), PlaceId::from("c")];

        let times = body.into_travel_times(&ids);
        assert_eq!(times.len(), 2);
        assert_eq!(times.get("a").map(String::as_str), Some("8 mins"));
        assert!(!times.contains_key("b"));
        assert_eq!(times.get("c").map(String::as_str), Some("21 mins"));
    }

    #[tokio::test]
    async fn empty_travel_batch_makes_no_call() {
        let client = GoogleMapsClient::new(&GoogleMapsConfig {
            api_key: "k".to_string(),
            base_url: "http://127.0.0.1:1".to_string(),
            timeout_seconds: 1,
        })
        .unwrap();

        let times = client
            .travel_times(LatLng::new(0.0, 0.0), &[])
            .await
            .unwrap();
        assert!(times.is_empty());
    }
}
