//! Ranking model.
//!
//! Scores enriched candidates against the conversation and returns them
//! ordered best first. Scores stay internal to the recommendation flow.

use crate::backend::LlmBackend;
use crate::error::AiError;
use crate::llm_call::LlmCall;
use crate::prompt;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, instrument};
use wayfarer_core::{LatLng, PlaceId};

/// What the ranking model is told about one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingCandidate {
    pub place_id: PlaceId,
    pub name: String,
    pub types: Vec<String>,
    pub rating: Option<f64>,
    pub user_ratings_total: Option<u32>,
    pub price_level: Option<u8>,
    pub travel_time: String,
    pub wheelchair_accessible_entrance: Option<bool>,
    pub editorial_summary: Option<String>,
    pub reviews: Vec<String>,
}

/// Input for one ranking call.
#[derive(Debug, Clone)]
pub struct RankingRequest {
    /// Rendered conversation transcript.
    pub transcript: String,
    /// Where the user is.
    pub origin: LatLng,
    /// Candidates to rank.
    pub candidates: Vec<RankingCandidate>,
    /// How many places the user will be shown.
    pub limit: usize,
}

/// One scored candidate, as returned by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredPlace {
    pub place_id: PlaceId,
    #[serde(default)]
    pub relevance_score: f64,
    #[serde(default)]
    pub quality_score: f64,
    #[serde(default)]
    pub vibe_score: f64,
    #[serde(default)]
    pub convenience_score: f64,
    pub final_score: f64,
    #[serde(default)]
    pub justification: String,
}

#[derive(Debug, Deserialize)]
struct RankingResponse {
    ranked_recommendations: Vec<ScoredPlace>,
}

/// Ranks candidates for a conversation.
#[async_trait]
pub trait RankingModel: Send + Sync {
    /// Scores the request's candidates.
    ///
    /// # Errors
    ///
    /// Returns an error if the model call fails, its answer does not match
    /// the contract, or it ranks nothing.
    async fn rank(&self, request: &RankingRequest) -> Result<Vec<ScoredPlace>, AiError>;
}

/// Ranking model backed by a language model.
#[derive(Clone)]
pub struct LlmRanker {
    backend: Arc<dyn LlmBackend>,
}

impl LlmRanker {
    /// Creates a ranker on top of `backend`.
    #[must_use]
    pub fn new(backend: Arc<dyn LlmBackend>) -> Self {
        Self { backend }
    }

    fn build_call(request: &RankingRequest) -> Result<LlmCall, AiError> {
        let candidates = serde_json::to_string_pretty(&request.candidates).map_err(|e| {
            AiError::SchemaValidationFailed {
                expected: "serializable candidates".to_string(),
                actual: e.to_string(),
            }
        })?;
        let template = prompt::ranking();
        let vars = HashMap::from([
            ("transcript", json!(request.transcript)),
            ("origin", json!(request.origin.to_string())),
            ("limit", json!(request.limit)),
            ("candidates", json!(candidates)),
        ]);
        let mut call = LlmCall::new("ranking", template.render(&vars));
        if let Some(system) = template.system_prompt {
            call = call.with_system_prompt(system);
        }
        Ok(call)
    }
}

#[async_trait]
impl RankingModel for LlmRanker {
    #[instrument(skip(self, request), fields(model = self.backend.model(), candidates = request.candidates.len()))]
    async fn rank(&self, request: &RankingRequest) -> Result<Vec<ScoredPlace>, AiError> {
        let response: RankingResponse = Self::build_call(request)?
            .invoke_json(self.backend.as_ref())
            .await?;

        if response.ranked_recommendations.is_empty() {
            return Err(AiError::EmptyOutput {
                operation: "ranking".to_string(),
            });
        }

        debug!(ranked = response.ranked_recommendations.len(), "candidates ranked");
        Ok(response.ranked_recommendations)
    }
}
