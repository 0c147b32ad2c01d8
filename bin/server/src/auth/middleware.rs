//! Authentication extractors for Axum.
//!
//! Each extractor loads the session named by the session cookie and runs it
//! through the [`RouteGate`](eventgate_platform_access::RouteGate) for an
//! access level. A denied request is redirected to the screen the gate names.

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::CookieJar;
use eventgate_platform_access::{
    Access, AuthenticatedUser, GateDecision, ProfileError, Screen, Session, SessionId,
};
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::AppState;
use crate::error::ApiError;

/// Session cookie name.
pub(crate) const SESSION_COOKIE: &str = "session";

/// Extractor for the current session, if any.
///
/// Expired sessions are deleted and treated as absent.
pub struct CurrentSession(pub Option<Session>);

impl<S> FromRequestParts<S> for CurrentSession
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = Arc::<AppState>::from_ref(state);
        let jar = CookieJar::from_request_parts(parts, state)
            .await
            .map_err(|_| AuthRejection::InternalError)?;

        let Some(session_cookie) = jar.get(SESSION_COOKIE) else {
            return Ok(CurrentSession(None));
        };
        let session_id = SessionId::new(session_cookie.value().to_string());

        let session = app_state
            .sessions
            .find_session(&session_id)
            .await
            .map_err(|e| {
                error!(error = %e, "database error looking up session");
                AuthRejection::InternalError
            })?;

        match session {
            Some(session) if session.is_expired() => {
                debug!(user_id = %session.user_id(), "session expired");
                if let Err(e) = app_state.sessions.delete_session(&session_id).await {
                    warn!(error = %e, "failed to delete expired session");
                }
                Ok(CurrentSession(None))
            }
            session => Ok(CurrentSession(session)),
        }
    }
}

/// Runs the gate for `access` and loads the signed-in user's profile.
async fn authorize<S>(
    parts: &mut Parts,
    state: &S,
    access: Access,
) -> Result<AuthenticatedUser, AuthRejection>
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    let app_state = Arc::<AppState>::from_ref(state);
    let CurrentSession(session) = CurrentSession::from_request_parts(parts, state).await?;

    if let GateDecision::Redirect(target) =
        app_state.gate.check_access(access, session.as_ref()).await
    {
        return Err(AuthRejection::Redirect(target));
    }
    let session = session.ok_or(AuthRejection::Redirect(Screen::Login))?;

    let profile = app_state
        .auth
        .profile(session.user_id())
        .await
        .map_err(|e| match e.current_context() {
            ProfileError::NotFound { .. } => AuthRejection::Redirect(Screen::Login),
            _ => {
                error!(error = %e, "failed to load profile");
                AuthRejection::InternalError
            }
        })?;

    Ok(AuthenticatedUser::new(session, profile))
}

/// Extractor for requiring any signed-in user with a known role.
pub struct RequireAuth(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for RequireAuth
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authorize(parts, state, Access::Authenticated)
            .await
            .map(RequireAuth)
    }
}

/// Extractor for requiring a signed-in admin.
pub struct AdminUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for AdminUser
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authorize(parts, state, Access::Admin).await.map(AdminUser)
    }
}

/// Extractor for requiring a signed-in participant.
pub struct ParticipantUser(pub AuthenticatedUser);

impl<S> FromRequestParts<S> for ParticipantUser
where
    Arc<AppState>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        authorize(parts, state, Access::Participant)
            .await
            .map(ParticipantUser)
    }
}

/// Rejection type for authentication extractors.
#[derive(Debug)]
pub enum AuthRejection {
    /// The gate denied the request; navigate to the screen instead.
    Redirect(Screen),
    InternalError,
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::Redirect(target) => Redirect::to(target.path()).into_response(),
            Self::InternalError => ApiError::Internal.into_response(),
        }
    }
}
