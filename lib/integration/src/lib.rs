//! Place-service integrations for the wayfarer recommendation service.
//!
//! This crate provides:
//!
//! - **Connector trait**: [`PlacesConnector`], the uniform interface over
//!   place search, place detail and distance-matrix lookups
//! - **Google Maps connector**: the REST implementation, plus photo URL and
//!   deep-link derivation

pub mod connector;
pub mod error;
pub mod google;

pub use connector::{PlaceRecord, PlaceStub, PlacesConnector, Review, TravelTimes};
pub use error::ConnectorError;
pub use google::{GoogleMapsClient, GoogleMapsConfig, place_link};
