//! Query refiner.
//!
//! Turns the whole conversation transcript into either a clarifying question
//! or one search keyword.

use crate::backend::LlmBackend;
use crate::llm_call::LlmCall;
use crate::prompt;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Maximum number of words in a search keyword.
pub const MAX_KEYWORD_WORDS: usize = 9;

/// Message returned to the user when refinement fails.
pub const REFINEMENT_FAILED_MESSAGE: &str = "Sorry, I had trouble refining your query.";

/// A normalized search phrase.
///
/// Holds between one and [`MAX_KEYWORD_WORDS`] words separated by single
/// spaces, with no list separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Keyword(String);

impl Keyword {
    /// Normalizes a raw phrase, or returns `None` if nothing remains.
    #[must_use]
    pub fn normalize(raw: &str) -> Option<Self> {
        let cleaned: String = raw
            .chars()
            .map(|c| match c {
                ',' | ';' | '|' | '\n' | '\r' => ' ',
                other => other,
            })
            .collect();
        let words: Vec<&str> = cleaned.split_whitespace().take(MAX_KEYWORD_WORDS).collect();
        if words.is_empty() {
            None
        } else {
            Some(Self(words.join(" ")))
        }
    }

    /// Returns the phrase.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of refining a transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Refinement {
    /// The transcript is too vague; ask the user this.
    Question(String),
    /// Search for this phrase.
    Keyword(Keyword),
    /// Refinement failed; show the user this message.
    Error(String),
}

impl Refinement {
    fn failed() -> Self {
        Self::Error(REFINEMENT_FAILED_MESSAGE.to_string())
    }
}

/// The JSON shape the refinement model answers with.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "content", rename_all = "lowercase")]
enum RawRefinement {
    Question(String),
    Keyword(String),
    Error(String),
}

impl From<RawRefinement> for Refinement {
    fn from(raw: RawRefinement) -> Self {
        match raw {
            RawRefinement::Question(q) if !q.trim().is_empty() => Self::Question(q.trim().to_string()),
            RawRefinement::Keyword(k) => Keyword::normalize(&k).map_or_else(Self::failed, Self::Keyword),
            RawRefinement::Error(e) if !e.trim().is_empty() => Self::Error(e),
            _ => Self::failed(),
        }
    }
}

/// Refines a transcript into a search action.
#[async_trait]
pub trait QueryRefinement: Send + Sync {
    /// Refines the full transcript. Never fails; failures are reported as
    /// [`Refinement::Error`].
    async fn refine(&self, transcript: &str) -> Refinement;
}

/// Refiner backed by a language model.
#[derive(Clone)]
pub struct LlmQueryRefiner {
    backend: Arc<dyn LlmBackend>,
}

impl LlmQueryRefiner {
    /// Creates a refiner on top of `backend`.
    #[must_use]
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl QueryRefinement for LlmQueryRefiner {
    #[instrument(skip(self, transcript), fields(model = self.backend.model()))]
    async fn refine(&self, transcript: &str) -> Refinement {
        let template = prompt::refinement();
        let vars = HashMap::from([("transcript", json!(transcript))]);
        let mut call = LlmCall::new("refinement", template.render(&vars));
        if let Some(system) = template.system_prompt {
            call = call.with_system_prompt(system);
        }

        match call.invoke_json::<RawRefinement>(self.backend.as_ref()).await {
            Ok(raw) => {
                let refinement = Refinement::from(raw);
                debug!(?refinement, "transcript refined");
                refinement
            }
            Err(e) => {
                warn!(error = %e, "refinement failed");
                Refinement::failed()
            }
        }
    }
}
