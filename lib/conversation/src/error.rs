//! Error types for the conversation crate.

use std::fmt;

/// Errors from session operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The user has already used every allowed retry.
    RetryLimitReached { limit: u32 },
    /// A transcript entry was blank.
    EmptyEntry,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RetryLimitReached { limit } => {
                write!(f, "retry limit of {limit} reached")
            }
            Self::EmptyEntry => write!(f, "transcript entry is empty"),
        }
    }
}

impl std::error::Error for SessionError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_error_display() {
        let err = SessionError::RetryLimitReached { limit: 2 };
        assert_eq!(err.to_string(), "retry limit of 2 reached");
    }
}
