//! Core domain types and utilities for the wayfarer recommendation service.
//!
//! This crate provides the foundational types, error handling, and shared
//! utilities used by every other wayfarer crate.

pub mod error;
pub mod geo;
pub mod id;
pub mod place;

pub use error::Result;
pub use geo::LatLng;
pub use id::{ParseIdError, SessionToken, TurnId};
pub use place::PlaceId;
