//! Error types for the AI crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `LlmError`: Low-level LLM backend operations
//! - `AiError`: Structured-output operations built on top of a backend call

use crate::llm_call::LlmInvocationId;
use std::fmt;

/// Errors from LLM backend operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    /// Provider is unavailable.
    ProviderUnavailable { provider: String, reason: String },
    /// Request failed.
    RequestFailed { reason: String },
    /// Response parsing failed.
    ResponseParseFailed { reason: String },
    /// The provider answered without any content.
    EmptyResponse,
    /// Timeout waiting for response.
    Timeout,
    /// Rate limit exceeded.
    RateLimited { retry_after_secs: Option<u64> },
    /// Invalid configuration.
    InvalidConfig { reason: String },
}

impl fmt::Display for LlmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ProviderUnavailable { provider, reason } => {
                write!(f, "LLM provider '{provider}' unavailable: {reason}")
            }
            Self::RequestFailed { reason } => {
                write!(f, "LLM request failed: {reason}")
            }
            Self::ResponseParseFailed { reason } => {
                write!(f, "failed to parse LLM response: {reason}")
            }
            Self::EmptyResponse => write!(f, "LLM returned an empty response"),
            Self::Timeout => write!(f, "LLM request timed out"),
            Self::RateLimited { retry_after_secs } => {
                if let Some(secs) = retry_after_secs {
                    write!(f, "rate limited, retry after {secs}s")
                } else {
                    write!(f, "rate limited")
                }
            }
            Self::InvalidConfig { reason } => {
                write!(f, "invalid LLM configuration: {reason}")
            }
        }
    }
}

impl std::error::Error for LlmError {}

/// High-level AI operation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiError {
    /// The backend call itself failed.
    Backend {
        invocation_id: LlmInvocationId,
        source: LlmError,
    },
    /// Output did not match the JSON contract of the operation.
    SchemaValidationFailed { expected: String, actual: String },
    /// Output was valid but carried no usable items.
    EmptyOutput { operation: String },
}

impl fmt::Display for AiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend {
                invocation_id,
                source,
            } => {
                write!(f, "LLM call {invocation_id} failed: {source}")
            }
            Self::SchemaValidationFailed { expected, actual } => {
                write!(
                    f,
                    "output schema validation failed: expected {expected}, got {actual}"
                )
            }
            Self::EmptyOutput { operation } => {
                write!(f, "{operation} returned no usable output")
            }
        }
    }
}

impl std::error::Error for AiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_error_display() {
        let err = LlmError::ProviderUnavailable {
            provider: "openai".to_string(),
            reason: "connection refused".to_string(),
        };
        assert!(err.to_string().contains("openai"));
        assert!(err.to_string().contains("connection refused"));
    }

    #[test]
    fn rate_limited_display() {
        let err = LlmError::RateLimited {
            retry_after_secs: Some(20),
        };
        assert!(err.to_string().contains("20s"));
        assert_eq!(
            LlmError::RateLimited {
                retry_after_secs: None
            }
            .to_string(),
            "rate limited"
        );
    }

    #[test]
    fn ai_error_wraps_backend_failure() {
        let err = AiError::Backend {
            invocation_id: LlmInvocationId::new(),
            source: LlmError::Timeout,
        };
        let display = err.to_string();
        assert!(display.starts_with("LLM call llm_"));
        assert!(display.contains("timed out"));
    }

    #[test]
    fn schema_validation_display() {
        let err = AiError::SchemaValidationFailed {
            expected: "ranked_recommendations".to_string(),
            actual: "missing field".to_string(),
        };
        assert!(err.to_string().contains("ranked_recommendations"));
    }
}
