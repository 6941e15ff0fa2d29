//! wayfarer HTTP server.
//!
//! This crate exposes the recommendation conversation over HTTP: one route
//! runs a turn, another resets the conversation. The session token travels
//! in a cookie; all conversation state stays server-side.

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

pub use config::ServerConfig;
pub use error::{ApiError, StartupError};
pub use routes::router;
pub use state::{AppState, spawn_session_cleanup};
