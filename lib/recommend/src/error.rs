//! Error types for turn handling.
//!
//! Every way a turn can fail is a [`TurnError`]. None of them escape a turn:
//! [`TurnError::into_response`] turns each into the structured, user-safe
//! response the caller sees.

use crate::turn::TurnResponse;
use std::fmt;

/// Reasons a turn ends without recommendations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnError {
    /// The query was missing or blank.
    EmptyInput,
    /// The turn needed a search but had no usable location.
    MissingLocation,
    /// The moderation gate blocked the text.
    ModerationRejected,
    /// The refiner failed; `message` is safe to show.
    RefinementFailed { message: String },
    /// Place search found nothing.
    NoResults { radius_m: u32, max_radius_m: u32 },
    /// Everything found was already shown in this session.
    AllCandidatesExcluded,
    /// Ranking produced nothing usable.
    RankingFailed { reason: String },
    /// The session has no retries left.
    RetryLimitExceeded { limit: u32 },
    /// Something broke that should not have.
    UnhandledFault { details: String },
}

impl fmt::Display for TurnError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyInput => write!(f, "query is empty"),
            Self::MissingLocation => write!(f, "no usable location"),
            Self::ModerationRejected => write!(f, "query rejected by moderation"),
            Self::RefinementFailed { message } => {
                write!(f, "query refinement failed: {message}")
            }
            Self::NoResults {
                radius_m,
                max_radius_m,
            } => {
                write!(f, "no places within {radius_m}m (max {max_radius_m}m)")
            }
            Self::AllCandidatesExcluded => {
                write!(f, "every place found was already shown")
            }
            Self::RankingFailed { reason } => write!(f, "ranking failed: {reason}"),
            Self::RetryLimitExceeded { limit } => {
                write!(f, "retry limit of {limit} exceeded")
            }
            Self::UnhandledFault { details } => write!(f, "unhandled fault: {details}"),
        }
    }
}

impl std::error::Error for TurnError {}

impl TurnError {
    /// Convert to the user-safe response.
    #[must_use]
    pub fn into_response(self) -> TurnResponse {
        let error = |content: &str| TurnResponse::Error {
            content: content.to_string(),
        };
        match self {
            Self::EmptyInput => error("Please tell me what you're looking for."),
            Self::MissingLocation => error("I need your location to search nearby."),
            Self::ModerationRejected => error("This search is not permitted."),
            Self::RefinementFailed { message } => TurnResponse::Error { content: message },
            Self::NoResults {
                radius_m,
                max_radius_m,
            } if radius_m < max_radius_m => TurnResponse::ExpandSearch {
                message: "I couldn't find anything in that range. Would you like to expand the search area?"
                    .to_string(),
            },
            Self::NoResults { .. } => error("I couldn't find any places, even in a wider area."),
            Self::AllCandidatesExcluded => error(
                "I couldn't find any new places matching your refined search. Try broadening your criteria or starting a new search.",
            ),
            Self::RankingFailed { .. } => {
                error("The AI had trouble picking final recommendations. Please try again.")
            }
            Self::RetryLimitExceeded { .. } => TurnResponse::FinalMessage {
                content: "I've tried my best. Let's start a new search!".to_string(),
            },
            Self::UnhandledFault { .. } => {
                error("Something went wrong on our side. Please try again.")
            }
        }
    }
}
