//! Authentication routes for login, registration and logout.

use axum::{
    Json,
    extract::State,
    response::{IntoResponse, Redirect},
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Duration as ChronoDuration;
use eventgate_platform_access::{Registration, Screen, SessionId};
use std::sync::Arc;
use time::Duration as TimeDuration;
use tracing::{error, info, warn};

use super::{AppState, middleware::SESSION_COOKIE};
use crate::error::ApiError;
use crate::types::{LoginRequest, RegisterRequest};

/// Signs in with email and password and starts a server session.
///
/// On success the session cookie is set and the client is sent to `/home`,
/// which forwards to the role's home screen.
pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let session_duration = state.session_config.duration_minutes;
    let session = state
        .auth
        .sign_in(&request.email, &request.password)
        .await?
        .expiring_in(ChronoDuration::minutes(session_duration));

    state.sessions.create_session(&session).await.map_err(|e| {
        error!(error = %e, "failed to persist session");
        ApiError::Internal
    })?;

    let session_cookie = Cookie::build((SESSION_COOKIE, session.id().as_str().to_string()))
        .path("/")
        .http_only(true)
        .secure(state.session_config.secure_cookies)
        .same_site(SameSite::Lax)
        .max_age(TimeDuration::minutes(session_duration));

    Ok((jar.add(session_cookie), Redirect::to(Screen::Home.path())))
}

/// Creates an account and its profile, then sends the client to login.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(request): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let (_, profile) = state
        .auth
        .register(Registration {
            email: request.email,
            password: request.password,
            role: request.role,
            display_name: request.display_name,
        })
        .await?;
    info!(user_id = %profile.id(), role = %profile.role(), "registered user");

    Ok(Redirect::to(Screen::Login.path()))
}

/// Logs out the user by deleting their session.
pub async fn logout(State(state): State<Arc<AppState>>, jar: CookieJar) -> impl IntoResponse {
    if let Some(session_cookie) = jar.get(SESSION_COOKIE) {
        let session_id = SessionId::new(session_cookie.value().to_string());

        match state.sessions.find_session(&session_id).await {
            Ok(Some(session)) => {
                if let Err(e) = state.auth.sign_out(&session).await {
                    warn!(error = %e, "provider sign-out failed");
                }
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "failed to look up session on logout"),
        }
        if let Err(e) = state.sessions.delete_session(&session_id).await {
            warn!(error = %e, "failed to delete session on logout");
        }
    }

    // Remove session cookie
    let remove_session = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .max_age(TimeDuration::ZERO);

    (jar.add(remove_session), Redirect::to(Screen::Login.path()))
}
