//! Transcript entries for conversations.
//!
//! The transcript is the only context handed to language models, so its
//! rendering is part of the model contract.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// What kind of user turn produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    /// The request that opened the conversation.
    InitialRequest,
    /// A new request after the user rejected the recommendations.
    Dissatisfied,
    /// An answer to a clarifying question.
    Answer,
}

/// One line of the transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Entry kind.
    pub kind: EntryKind,
    /// What the user typed.
    pub text: String,
    /// When the entry was recorded.
    pub timestamp: DateTime<Utc>,
}

impl TranscriptEntry {
    /// Creates a new entry.
    #[must_use]
    pub fn new(kind: EntryKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            timestamp: Utc::now(),
        }
    }

    /// Creates an initial-request entry.
    #[must_use]
    pub fn initial_request(text: impl Into<String>) -> Self {
        Self::new(EntryKind::InitialRequest, text)
    }

    /// Creates a dissatisfaction entry.
    #[must_use]
    pub fn dissatisfied(text: impl Into<String>) -> Self {
        Self::new(EntryKind::Dissatisfied, text)
    }

    /// Creates an answer entry.
    #[must_use]
    pub fn answer(text: impl Into<String>) -> Self {
        Self::new(EntryKind::Answer, text)
    }
}

impl fmt::Display for TranscriptEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            EntryKind::InitialRequest => write!(f, "User's initial request: {}", self.text),
            EntryKind::Dissatisfied => {
                write!(f, "User was not satisfied. New request: {}", self.text)
            }
            EntryKind::Answer => write!(f, "My Answer: {}", self.text),
        }
    }
}

/// Append-only list of transcript entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    /// Creates an empty transcript.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn push(&mut self, entry: TranscriptEntry) {
        self.entries.push(entry);
    }

    /// Returns the entries in order.
    #[must_use]
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns whether the transcript is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Renders the transcript as newline-separated lines.
    #[must_use]
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
