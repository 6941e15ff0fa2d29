//! HTTP routes for the recommendation conversation.

use crate::error::ApiError;
use crate::state::AppState;
use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration as TimeDuration;
use tower_http::trace::TraceLayer;
use wayfarer_core::SessionToken;
use wayfarer_recommend::TurnRequest;

/// Session cookie name.
pub const SESSION_COOKIE: &str = "wayfarer_session";

/// Builds the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/recommendation", post(recommendation))
        .route("/api/search/reset", post(reset_search))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs one conversation turn for the caller's session.
async fn recommendation(
    State(state): State<AppState>,
    jar: CookieJar,
    payload: Result<Json<TurnRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            return ApiError::MalformedRequest {
                details: rejection.body_text(),
            }
            .into_response();
        }
    };
    tracing::debug!(?request, "turn request received");

    let token = session_token(&jar);
    let reply = state.orchestrator.handle_turn(token, request).await;

    let jar = match (reply.session, token) {
        (Some(live), Some(sent)) if live == sent => jar,
        (Some(live), _) => jar.add(session_cookie(live, state.secure_cookies)),
        (None, Some(_)) => jar.add(removal_cookie()),
        (None, None) => jar,
    };

    (jar, Json(reply.response)).into_response()
}

/// Ends the caller's conversation so the next turn starts fresh.
async fn reset_search(State(state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    if let Some(token) = session_token(&jar) {
        state.orchestrator.reset(token).await;
        tracing::info!(session = %token, "search reset");
    }

    (jar.add(removal_cookie()), StatusCode::NO_CONTENT)
}

/// Reads the session token from the cookie. Unparseable values are ignored.
fn session_token(jar: &CookieJar) -> Option<SessionToken> {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| cookie.value().parse().ok())
}

fn session_cookie(token: SessionToken, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, token.to_string()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

fn removal_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(TimeDuration::ZERO)
        .build()
}
