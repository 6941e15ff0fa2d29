//! Error types for the integration crate.

use std::fmt;

/// Errors from connector operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectorError {
    /// Connection to service failed.
    ConnectionFailed { reason: String },
    /// The service answered with a non-success HTTP status.
    HttpStatus { operation: String, status: u16 },
    /// The service answered with an application-level failure status.
    ServiceStatus {
        operation: String,
        status: String,
        message: Option<String>,
    },
    /// Protocol error.
    ProtocolError { reason: String },
    /// Timeout waiting for response.
    Timeout,
    /// Invalid configuration.
    InvalidConfig { reason: String },
}

impl ConnectorError {
    pub(crate) fn from_transport(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::Timeout
        } else if error.is_connect() {
            Self::ConnectionFailed {
                reason: error.to_string(),
            }
        } else {
            Self::ProtocolError {
                reason: error.to_string(),
            }
        }
    }
}

impl fmt::Display for ConnectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConnectionFailed { reason } => {
                write!(f, "connection failed: {reason}")
            }
            Self::HttpStatus { operation, status } => {
                write!(f, "{operation} returned HTTP {status}")
            }
            Self::ServiceStatus {
                operation,
                status,
                message,
            } => {
                write!(f, "{operation} returned status {status}")?;
                if let Some(message) = message {
                    write!(f, ": {message}")?;
                }
                Ok(())
            }
            Self::ProtocolError { reason } => {
                write!(f, "protocol error: {reason}")
            }
            Self::Timeout => write!(f, "operation timed out"),
            Self::InvalidConfig { reason } => {
                write!(f, "invalid connector configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for ConnectorError {}
