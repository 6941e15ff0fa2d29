//! Turn orchestration for the wayfarer recommendation service.
//!
//! This crate provides:
//!
//! - **Turn Orchestrator**: the per-turn state machine that sequences
//!   moderation, refinement, retrieval, enrichment and ranking
//! - **Candidate Retrieval**: place search with deduplication across turns
//! - **Detail Enrichment** and **Travel-Time Annotation**
//! - **Ranking Fusion**: merges model scores back onto candidates and strips
//!   them before anything reaches the user

pub mod candidate;
pub mod config;
pub mod enrich;
pub mod error;
pub mod fusion;
pub mod orchestrator;
pub mod retrieval;
pub mod travel;
pub mod turn;

#[cfg(test)]
mod testing;

pub use candidate::{Candidate, RecommendationResult};
pub use config::RecommendConfig;
pub use error::TurnError;
pub use orchestrator::TurnOrchestrator;
pub use turn::{Distance, TurnOutcome, TurnReply, TurnRequest, TurnResponse};
