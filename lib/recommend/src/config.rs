//! Search policy settings.

use serde::{Deserialize, Serialize};

/// Tunables of the recommendation flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendConfig {
    /// Radius of a fresh session, in meters.
    #[serde(default = "default_radius_m")]
    pub default_radius_m: u32,
    /// Radius an expand-search confirmation jumps to, in meters.
    #[serde(default = "max_radius_m")]
    pub max_radius_m: u32,
    /// Dissatisfaction turns allowed per session.
    #[serde(default = "max_retries")]
    pub max_retries: u32,
    /// Unseen candidates looked up in detail per turn.
    #[serde(default = "enrichment_limit")]
    pub enrichment_limit: usize,
    /// Places returned to the user per turn.
    #[serde(default = "recommendation_count")]
    pub recommendation_count: usize,
    /// Review texts forwarded to the ranking model per candidate.
    #[serde(default = "review_excerpts")]
    pub review_excerpts: usize,
    /// Photo URLs attached to each candidate.
    #[serde(default = "photo_limit")]
    pub photo_limit: usize,
}

fn default_radius_m() -> u32 {
    3000
}

fn max_radius_m() -> u32 {
    20_000
}

fn max_retries() -> u32 {
    2
}

fn enrichment_limit() -> usize {
    15
}

fn recommendation_count() -> usize {
    2
}

fn review_excerpts() -> usize {
    3
}

fn photo_limit() -> usize {
    3
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            default_radius_m: default_radius_m(),
            max_radius_m: max_radius_m(),
            max_retries: max_retries(),
            enrichment_limit: enrichment_limit(),
            recommendation_count: recommendation_count(),
            review_excerpts: review_excerpts(),
            photo_limit: photo_limit(),
        }
    }
}
