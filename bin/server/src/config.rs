//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables. Nested keys use
//! `__` as the separator, so `OPENAI__API_KEY` sets `openai.api_key`.
//!
//! See [`GoogleMapsConfig`] for the place-service settings and
//! [`RecommendConfig`] for the search policy.

use chrono::TimeDelta;
use serde::Deserialize;
use std::time::Duration;
use wayfarer_ai::LlmBackendConfig;
use wayfarer_ai::backend::OPENAI_BASE_URL;
use wayfarer_integration::GoogleMapsConfig;
use wayfarer_recommend::RecommendConfig;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,

    /// Language-model provider settings.
    pub openai: OpenAiConfig,

    /// Place-service settings.
    pub google_maps: GoogleMapsConfig,

    /// Session configuration.
    #[serde(default)]
    pub session: SessionConfig,

    /// Search policy.
    #[serde(default)]
    pub search: RecommendConfig,
}

fn default_listen_addr() -> String {
    "127.0.0.1:3000".to_string()
}

/// OpenAI-compatible chat-completion settings.
///
/// Moderation, refinement and ranking each get their own model so a cheap
/// model can gate requests while a stronger one ranks.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiConfig {
    /// API key sent as a bearer token.
    pub api_key: String,

    /// Base URL, without the `/chat/completions` suffix.
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,

    #[serde(default = "default_moderation_model")]
    pub moderation_model: String,

    #[serde(default = "default_refinement_model")]
    pub refinement_model: String,

    #[serde(default = "default_ranking_model")]
    pub ranking_model: String,

    /// Request timeout in seconds.
    #[serde(default = "default_openai_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_openai_base_url() -> String {
    OPENAI_BASE_URL.to_string()
}

fn default_moderation_model() -> String {
    "gpt-3.5-turbo".to_string()
}

fn default_refinement_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_ranking_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_openai_timeout_seconds() -> u64 {
    30
}

impl OpenAiConfig {
    /// Returns the backend configuration for `model`.
    #[must_use]
    pub fn backend_config(&self, model: &str) -> LlmBackendConfig {
        LlmBackendConfig::openai(self.api_key.clone(), model)
            .with_base_url(self.base_url.clone())
            .with_timeout_secs(self.timeout_seconds)
    }
}

/// Session-related configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Minutes a session may sit unused before it is purged.
    #[serde(default = "default_idle_timeout_minutes")]
    pub idle_timeout_minutes: i64,

    /// Interval between session cleanup runs, in seconds.
    #[serde(default = "default_cleanup_interval_seconds")]
    pub cleanup_interval_seconds: u64,

    /// Whether to set the Secure flag on cookies (requires HTTPS).
    /// Defaults to true for production safety; set to false for local HTTP development.
    #[serde(default = "default_secure_cookies")]
    pub secure_cookies: bool,
}

fn default_idle_timeout_minutes() -> i64 {
    60
}

fn default_cleanup_interval_seconds() -> u64 {
    300
}

fn default_secure_cookies() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_minutes: default_idle_timeout_minutes(),
            cleanup_interval_seconds: default_cleanup_interval_seconds(),
            secure_cookies: default_secure_cookies(),
        }
    }
}

impl SessionConfig {
    /// Idle timeout as a duration. Out-of-range values never expire.
    #[must_use]
    pub fn idle_timeout(&self) -> TimeDelta {
        TimeDelta::try_minutes(self.idle_timeout_minutes).unwrap_or(TimeDelta::MAX)
    }

    /// Cleanup interval as a duration, at least one second.
    #[must_use]
    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_seconds.max(1))
    }
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::load(config::Environment::default())
    }

    fn load(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(environment.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}
