//! Conversation session state.
//!
//! A session holds everything a conversation remembers between turns:
//! the transcript, the retry budget already spent, the places already shown,
//! the current search radius and the last keyword searched for.

use crate::error::SessionError;
use crate::transcript::{Transcript, TranscriptEntry};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashSet;
use wayfarer_core::{PlaceId, SessionToken};

/// Per-conversation search state.
#[derive(Debug, Clone)]
pub struct ConversationSession {
    token: SessionToken,
    transcript: Transcript,
    retry_count: u32,
    excluded_ids: HashSet<PlaceId>,
    search_radius: u32,
    last_keyword: Option<String>,
    created_at: DateTime<Utc>,
    last_active_at: DateTime<Utc>,
}

impl ConversationSession {
    /// Opens a session seeded with the user's first request.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyEntry`] if the request is blank.
    pub fn open(initial_request: &str, search_radius: u32) -> Result<Self, SessionError> {
        let text = non_blank(initial_request)?;
        let mut transcript = Transcript::new();
        transcript.push(TranscriptEntry::initial_request(text));

        let now = Utc::now();
        Ok(Self {
            token: SessionToken::new(),
            transcript,
            retry_count: 0,
            excluded_ids: HashSet::new(),
            search_radius,
            last_keyword: None,
            created_at: now,
            last_active_at: now,
        })
    }

    /// Records a new request after the user rejected the last
    /// recommendations, spending one retry.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::RetryLimitReached`] without modifying the
    /// session if `max_retries` retries are already spent.
    pub fn record_dissatisfaction(
        &mut self,
        request: &str,
        max_retries: u32,
    ) -> Result<u32, SessionError> {
        if self.retry_count >= max_retries {
            return Err(SessionError::RetryLimitReached { limit: max_retries });
        }
        let text = non_blank(request)?;
        self.retry_count += 1;
        self.transcript.push(TranscriptEntry::dissatisfied(text));
        self.touch();
        Ok(self.retry_count)
    }

    /// Records an answer to a clarifying question.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EmptyEntry`] if the answer is blank.
    pub fn record_answer(&mut self, answer: &str) -> Result<(), SessionError> {
        let text = non_blank(answer)?;
        self.transcript.push(TranscriptEntry::answer(text));
        self.touch();
        Ok(())
    }

    /// Sets the search radius in meters.
    pub fn set_search_radius(&mut self, radius_m: u32) {
        self.search_radius = radius_m;
    }

    /// Adds places to the excluded set. The set never shrinks.
    pub fn exclude<I>(&mut self, place_ids: I)
    where
        I: IntoIterator<Item = PlaceId>,
    {
        self.excluded_ids.extend(place_ids);
    }

    /// Records the keyword of a successful search.
    pub fn set_last_keyword(&mut self, keyword: impl Into<String>) {
        self.last_keyword = Some(keyword.into());
    }

    /// Marks the session as used now.
    pub fn touch(&mut self) {
        self.last_active_at = Utc::now();
    }

    /// Returns true if the session has been idle longer than `timeout` at `now`.
    #[must_use]
    pub fn is_idle(&self, now: DateTime<Utc>, timeout: TimeDelta) -> bool {
        now.signed_duration_since(self.last_active_at) > timeout
    }

    /// Returns whether `place_id` has already been shown in this session.
    #[must_use]
    pub fn is_excluded(&self, place_id: &PlaceId) -> bool {
        self.excluded_ids.contains(place_id)
    }

    #[must_use]
    pub fn token(&self) -> SessionToken {
        self.token
    }

    #[must_use]
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    #[must_use]
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    #[must_use]
    pub fn excluded_ids(&self) -> &HashSet<PlaceId> {
        &self.excluded_ids
    }

    #[must_use]
    pub fn search_radius(&self) -> u32 {
        self.search_radius
    }

    #[must_use]
    pub fn last_keyword(&self) -> Option<&str> {
        self.last_keyword.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn last_active_at(&self) -> DateTime<Utc> {
        self.last_active_at
    }
}

fn non_blank(text: &str) -> Result<&str, SessionError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(SessionError::EmptyEntry)
    } else {
        Ok(trimmed)
    }
}
