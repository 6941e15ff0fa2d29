//! Domain error types for server operations.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;
use wayfarer_recommend::TurnResponse;

/// Errors that stop the server from starting.
#[derive(Debug)]
pub enum StartupError {
    /// Configuration could not be loaded.
    Config { reason: String },
    /// An external-service client could not be built.
    Client {
        component: &'static str,
        reason: String,
    },
    /// The listener could not bind.
    Bind { addr: String, reason: String },
    /// The server stopped with an error.
    Serve { reason: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { reason } => write!(f, "invalid configuration: {reason}"),
            Self::Client { component, reason } => {
                write!(f, "failed to build {component} client: {reason}")
            }
            Self::Bind { addr, reason } => write!(f, "failed to bind to '{addr}': {reason}"),
            Self::Serve { reason } => write!(f, "server error: {reason}"),
        }
    }
}

impl std::error::Error for StartupError {}

/// Request-level errors raised before a turn runs.
#[derive(Debug)]
pub enum ApiError {
    /// The body was not a valid turn request.
    MalformedRequest { details: String },
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRequest { details } => write!(f, "malformed request: {details}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::MalformedRequest { details } => {
                tracing::warn!(%details, "rejected malformed request");
                (
                    StatusCode::BAD_REQUEST,
                    Json(TurnResponse::Error {
                        content: "Sorry, I couldn't understand that request.".to_string(),
                    }),
                )
                    .into_response()
            }
        }
    }
}
