//! Turn orchestrator.
//!
//! Runs the conversation state machine once per inbound turn:
//!
//! 1. Reject blank input
//! 2. Open a session (after moderation), or continue one: dissatisfaction
//!    feedback is moderated and spends a retry, anything else is an answer
//! 3. Apply the radius override; expand-search wins over an explicit distance
//! 4. Refine the whole transcript; a question or an error ends the turn
//! 5. Search, drop places already shown, enrich, annotate travel times, rank
//! 6. On success remember every enriched place and the keyword
//!
//! The session stays locked for the whole turn. Every failure, including a
//! panic, ends as a structured [`TurnResponse`].

use crate::candidate::RecommendationResult;
use crate::config::RecommendConfig;
use crate::error::TurnError;
use crate::turn::{TurnReply, TurnRequest, TurnResponse};
use crate::{enrich, fusion, retrieval, travel};
use std::sync::Arc;
use tracing::{Instrument, debug, error, info, info_span, warn};
use wayfarer_ai::{ContentModerator, QueryRefinement, RankingModel, Refinement};
use wayfarer_conversation::{ConversationSession, SessionError, SessionGuard, SessionStore};
use wayfarer_core::{PlaceId, SessionToken, TurnId};
use wayfarer_integration::PlacesConnector;

/// Coordinates one turn of a recommendation conversation.
pub struct TurnOrchestrator {
    moderator: Arc<dyn ContentModerator>,
    refiner: Arc<dyn QueryRefinement>,
    ranker: Arc<dyn RankingModel>,
    places: Arc<dyn PlacesConnector>,
    sessions: Arc<SessionStore>,
    config: RecommendConfig,
}

impl TurnOrchestrator {
    /// Creates an orchestrator over its collaborators.
    #[must_use]
    pub fn new(
        moderator: Arc<dyn ContentModerator>,
        refiner: Arc<dyn QueryRefinement>,
        ranker: Arc<dyn RankingModel>,
        places: Arc<dyn PlacesConnector>,
        sessions: Arc<SessionStore>,
        config: RecommendConfig,
    ) -> Self {
        Self {
            moderator,
            refiner,
            ranker,
            places,
            sessions,
            config,
        }
    }

    /// Returns the session store.
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.sessions
    }

    /// Ends the conversation for `token`, as when the user starts a new
    /// top-level search.
    pub async fn reset(&self, token: SessionToken) -> bool {
        self.sessions.remove(token).await
    }

    /// Handles one turn.
    ///
    /// The turn runs on its own task, so it completes even if the caller
    /// stops waiting, and a panic inside it becomes a generic error.
    pub async fn handle_turn(
        self: &Arc<Self>,
        token: Option<SessionToken>,
        request: TurnRequest,
    ) -> TurnReply {
        let turn_id = TurnId::new();
        let span = info_span!("turn", turn = %turn_id, feedback = request.is_feedback);
        let this = Arc::clone(self);
        let task = tokio::spawn(async move { this.run_turn(token, request).await }.instrument(span));

        match task.await {
            Ok(reply) => reply,
            Err(e) => {
                if e.is_panic() {
                    error!(turn = %turn_id, "turn panicked");
                } else {
                    error!(turn = %turn_id, error = %e, "turn task failed");
                }
                TurnReply {
                    session: token,
                    response: TurnError::UnhandledFault {
                        details: e.to_string(),
                    }
                    .into_response(),
                }
            }
        }
    }

    async fn run_turn(&self, token: Option<SessionToken>, request: TurnRequest) -> TurnReply {
        let Some(query) = request.query_text() else {
            return finish(token, Err(TurnError::EmptyInput));
        };

        let existing = match token {
            Some(token) => self.sessions.checkout(token).await,
            None => None,
        };

        let mut session = match existing {
            Some(mut session) => {
                if let Err(e) = self.continue_session(&mut session, query, request.is_feedback).await {
                    return finish(Some(session.token()), Err(e));
                }
                session
            }
            None => match self.open_session(query).await {
                Ok(session) => session,
                Err(e) => return finish(None, Err(e)),
            },
        };

        let result = self.advance(&mut session, &request).await;
        finish(Some(session.token()), result)
    }

    async fn open_session(&self, query: &str) -> Result<SessionGuard, TurnError> {
        self.moderate(query).await?;
        let session = ConversationSession::open(query, self.config.default_radius_m)
            .map_err(session_error)?;
        info!(session = %session.token(), "conversation started");
        Ok(self.sessions.insert(session).await)
    }

    async fn continue_session(
        &self,
        session: &mut ConversationSession,
        query: &str,
        is_feedback: bool,
    ) -> Result<(), TurnError> {
        if is_feedback {
            self.moderate(query).await?;
            let retries = session
                .record_dissatisfaction(query, self.config.max_retries)
                .map_err(session_error)?;
            debug!(session = %session.token(), retries, "dissatisfaction recorded");
        } else {
            session.record_answer(query).map_err(session_error)?;
        }
        Ok(())
    }

    async fn moderate(&self, text: &str) -> Result<(), TurnError> {
        if self.moderator.moderate(text).await.is_safe() {
            Ok(())
        } else {
            Err(TurnError::ModerationRejected)
        }
    }

    async fn advance(
        &self,
        session: &mut ConversationSession,
        request: &TurnRequest,
    ) -> Result<TurnResponse, TurnError> {
        if let Some(distance) = request.distance_m() {
            session.set_search_radius(distance);
        }
        if request.expand_search == Some(true) {
            session.set_search_radius(self.config.max_radius_m);
        }

        let transcript = session.transcript().render();
        let keyword = match self.refiner.refine(&transcript).await {
            Refinement::Keyword(keyword) => keyword,
            Refinement::Question(content) => return Ok(TurnResponse::Question { content }),
            Refinement::Error(message) => return Err(TurnError::RefinementFailed { message }),
        };

        let origin = request.origin().ok_or(TurnError::MissingLocation)?;
        let radius_m = session.search_radius();

        let found =
            retrieval::search(self.places.as_ref(), origin, keyword.as_str(), radius_m).await;
        if found.is_empty() {
            return Err(TurnError::NoResults {
                radius_m,
                max_radius_m: self.config.max_radius_m,
            });
        }

        let unseen = retrieval::unseen(&found, session.excluded_ids(), self.config.enrichment_limit);
        if unseen.is_empty() {
            return Err(TurnError::AllCandidatesExcluded);
        }

        let mut candidates =
            enrich::enrich(self.places.as_ref(), &unseen, self.config.photo_limit).await;
        if candidates.is_empty() {
            return Err(TurnError::RankingFailed {
                reason: "no candidate could be enriched".to_string(),
            });
        }
        travel::annotate(self.places.as_ref(), origin, &mut candidates).await;

        let considered: Vec<PlaceId> = candidates.iter().map(|c| c.place_id.clone()).collect();
        let recommendations = fusion::rank_and_fuse(
            self.ranker.as_ref(),
            transcript,
            origin,
            candidates,
            &self.config,
        )
        .await?;

        session.exclude(considered);
        session.set_last_keyword(keyword.as_str());

        Ok(TurnResponse::Recommendation {
            data: RecommendationResult {
                recommendations,
                last_keyword: keyword.to_string(),
            },
        })
    }
}

fn session_error(e: SessionError) -> TurnError {
    match e {
        SessionError::RetryLimitReached { limit } => TurnError::RetryLimitExceeded { limit },
        SessionError::EmptyEntry => TurnError::EmptyInput,
    }
}

fn finish(session: Option<SessionToken>, result: Result<TurnResponse, TurnError>) -> TurnReply {
    let response = match result {
        Ok(response) => response,
        Err(e) => {
            warn!(error = %e, "turn ended without recommendations");
            e.into_response()
        }
    };
    info!(outcome = ?response.outcome(), "turn completed");
    TurnReply { session, response }
}
