//! Language-model primitives for the wayfarer recommendation service.
//!
//! This crate provides:
//!
//! - **LLM Call**: single-shot inference with optional JSON-object output,
//!   executed against any [`LlmBackend`]
//! - **Moderation Gate**: fail-closed safety classification of user text
//! - **Query Refiner**: turns a conversation transcript into either a
//!   clarifying question or a single search keyword
//! - **Ranking Model**: scores enriched candidates against the transcript

pub mod backend;
pub mod error;
pub mod llm_call;
pub mod moderation;
pub mod openai;
pub mod prompt;
pub mod rank;
pub mod refine;

pub use backend::{LlmBackend, LlmBackendConfig, LlmProvider, LlmRequest, LlmResponse};
pub use error::{AiError, LlmError};
pub use llm_call::{LlmCall, LlmCallResult, LlmInvocationId};
pub use moderation::{ContentModerator, LlmModerator, ModerationVerdict};
pub use openai::OpenAiBackend;
pub use rank::{LlmRanker, RankingCandidate, RankingModel, RankingRequest, ScoredPlace};
pub use refine::{Keyword, LlmQueryRefiner, QueryRefinement, Refinement};
