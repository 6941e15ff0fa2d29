//! Turn request and response shapes.

use crate::candidate::RecommendationResult;
use serde::{Deserialize, Serialize};
use wayfarer_core::{LatLng, SessionToken};

/// One inbound user turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TurnRequest {
    /// Where the user is.
    #[serde(default)]
    pub location: Option<LatLng>,
    /// What the user typed.
    #[serde(default)]
    pub query: Option<String>,
    /// Whether the user is rejecting the last recommendations.
    #[serde(default)]
    pub is_feedback: bool,
    /// Explicit search radius in meters.
    #[serde(default)]
    pub distance: Option<Distance>,
    /// Confirms the offer to search the widest area.
    #[serde(default, alias = "expand")]
    pub expand_search: Option<bool>,
}

/// A radius as sent by clients: a number, or a number in a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Distance {
    Meters(i64),
    Fractional(f64),
    Text(String),
}

impl Distance {
    /// Whole meters, if the value is integral.
    #[must_use]
    pub fn meters(&self) -> Option<i64> {
        match self {
            Self::Meters(m) => Some(*m),
            Self::Fractional(f) => integral(*f),
            Self::Text(text) => {
                let text = text.trim();
                text.parse::<i64>()
                    .ok()
                    .or_else(|| text.parse::<f64>().ok().and_then(integral))
            }
        }
    }
}

fn integral(value: f64) -> Option<i64> {
    // Bounds keep the cast exact.
    (value.is_finite() && value.fract() == 0.0 && value.abs() < 9.0e15).then(|| value as i64)
}

impl TurnRequest {
    /// Creates a plain request for `query` at `location`.
    #[must_use]
    pub fn new(query: impl Into<String>, location: LatLng) -> Self {
        Self {
            location: Some(location),
            query: Some(query.into()),
            ..Self::default()
        }
    }

    /// Marks the request as dissatisfaction feedback.
    #[must_use]
    pub fn as_feedback(mut self) -> Self {
        self.is_feedback = true;
        self
    }

    /// Sets an explicit radius.
    #[must_use]
    pub fn with_distance(mut self, distance: i64) -> Self {
        self.distance = Some(Distance::Meters(distance));
        self
    }

    /// Confirms the expand-search offer.
    #[must_use]
    pub fn expanding(mut self) -> Self {
        self.expand_search = Some(true);
        self
    }

    /// The trimmed query, if it has any content.
    #[must_use]
    pub fn query_text(&self) -> Option<&str> {
        self.query
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
    }

    /// The explicit radius, if usable. Zero and negative values are ignored.
    #[must_use]
    pub fn distance_m(&self) -> Option<u32> {
        self.distance
            .as_ref()
            .and_then(Distance::meters)
            .filter(|d| *d > 0)
            .and_then(|d| u32::try_from(d).ok())
    }

    /// The location, if present and within range.
    #[must_use]
    pub fn origin(&self) -> Option<LatLng> {
        self.location.filter(LatLng::is_valid)
    }
}

/// What the user is shown after a turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TurnResponse {
    Error { content: String },
    Question { content: String },
    ExpandSearch { message: String },
    FinalMessage { content: String },
    Recommendation { data: RecommendationResult },
}

impl TurnResponse {
    /// The state the conversation ended the turn in.
    #[must_use]
    pub fn outcome(&self) -> TurnOutcome {
        match self {
            Self::Error { .. } => TurnOutcome::Error,
            Self::Question { .. } => TurnOutcome::Clarifying,
            Self::ExpandSearch { .. } => TurnOutcome::ExpandOffered,
            Self::FinalMessage { .. } => TurnOutcome::RetryExhausted,
            Self::Recommendation { .. } => TurnOutcome::Recommended,
        }
    }
}

/// Per-turn outcome of the conversation state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnOutcome {
    /// A clarifying question was asked; nothing was searched.
    Clarifying,
    /// Nothing was found and a wider search was offered.
    ExpandOffered,
    /// Places were recommended.
    Recommended,
    /// The retry budget is spent.
    RetryExhausted,
    /// The turn failed; the session stays usable.
    Error,
}

/// Result of handling one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReply {
    /// The session that is live after the turn, if any.
    pub session: Option<SessionToken>,
    /// What to show the user.
    pub response: TurnResponse,
}

impl TurnReply {
    /// Shorthand for the outcome of the response.
    #[must_use]
    pub fn outcome(&self) -> TurnOutcome {
        self.response.outcome()
    }
}
