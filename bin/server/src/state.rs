//! Shared application state and its construction from configuration.

use crate::config::{ServerConfig, SessionConfig};
use crate::error::StartupError;
use chrono::Utc;
use rootcause::Report;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use wayfarer_ai::{LlmBackend, LlmModerator, LlmQueryRefiner, LlmRanker, OpenAiBackend};
use wayfarer_conversation::SessionStore;
use wayfarer_integration::GoogleMapsClient;
use wayfarer_recommend::TurnOrchestrator;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Runs recommendation turns.
    pub orchestrator: Arc<TurnOrchestrator>,
    /// Whether session cookies carry the Secure flag.
    pub secure_cookies: bool,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(orchestrator: Arc<TurnOrchestrator>, session: &SessionConfig) -> Self {
        Self {
            orchestrator,
            secure_cookies: session.secure_cookies,
        }
    }

    /// Wires the OpenAI and Google Maps clients into an orchestrator.
    ///
    /// # Errors
    ///
    /// Returns an error if any client rejects its configuration.
    pub fn from_config(config: &ServerConfig) -> Result<Self, Report<StartupError>> {
        let llm = |model: &str| -> Result<Arc<dyn LlmBackend>, StartupError> {
            let backend = OpenAiBackend::new(&config.openai.backend_config(model)).map_err(|e| {
                StartupError::Client {
                    component: "language model",
                    reason: e.to_string(),
                }
            })?;
            Ok(Arc::new(backend))
        };

        let places = GoogleMapsClient::new(&config.google_maps).map_err(|e| {
            StartupError::Client {
                component: "Google Maps",
                reason: e.to_string(),
            }
        })?;

        let orchestrator = TurnOrchestrator::new(
            Arc::new(LlmModerator::new(llm(&config.openai.moderation_model)?)),
            Arc::new(LlmQueryRefiner::new(llm(&config.openai.refinement_model)?)),
            Arc::new(LlmRanker::new(llm(&config.openai.ranking_model)?)),
            Arc::new(places),
            Arc::new(SessionStore::new(config.session.idle_timeout())),
            config.search.clone(),
        );

        Ok(Self::new(Arc::new(orchestrator), &config.session))
    }
}

/// Spawns the periodic idle-session cleanup task.
pub fn spawn_session_cleanup(sessions: Arc<SessionStore>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            let purged = sessions.purge_idle(Utc::now()).await;
            if purged > 0 {
                tracing::debug!(purged_sessions = purged, "Periodic session cleanup");
            }
        }
    })
}
