//! Screen handlers.
//!
//! Every screen runs the route gate first. A denied visit is redirected to
//! the screen the gate names; an allowed one returns the data the screen
//! renders as JSON.

use axum::{
    Json,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use eventgate_core::EventId;
use eventgate_platform_access::{AuthenticatedUser, GateDecision, ProfileError, Screen, Session};
use std::collections::HashSet;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, error};

use crate::auth::{AppState, CurrentSession};
use crate::error::ApiError;
use crate::types::{EventInfo, ScreenView};

/// Parses an event ID from a path segment.
pub(crate) fn parse_event_id(raw: &str) -> Result<EventId, ApiError> {
    EventId::from_str(raw).map_err(|_| ApiError::BadRequest("Invalid event ID".to_string()))
}

/// Runs the gate for `screen`.
///
/// Returns the signed-in user when the gate allows a session through, or
/// `None` for an allowed guest visit.
async fn enter(
    state: &AppState,
    screen: Screen,
    session: Option<Session>,
) -> Result<Option<AuthenticatedUser>, Response> {
    if let GateDecision::Redirect(target) = state.gate.check(screen, session.as_ref()).await {
        debug!(%screen, %target, "redirecting");
        return Err(Redirect::to(target.path()).into_response());
    }
    let Some(session) = session else {
        return Ok(None);
    };

    match state.auth.profile(session.user_id()).await {
        Ok(profile) => Ok(Some(AuthenticatedUser::new(session, profile))),
        // Guest screens let sessions without a profile through.
        Err(e) if matches!(e.current_context(), ProfileError::NotFound { .. }) => Ok(None),
        Err(e) => {
            error!(error = %e, "failed to load profile");
            Err(ApiError::Internal.into_response())
        }
    }
}

async fn guest_screen(state: &AppState, screen: Screen, session: Option<Session>) -> Response {
    match enter(state, screen, session).await {
        Ok(_) => Json(ScreenView::guest(screen)).into_response(),
        Err(response) => response,
    }
}

/// Requires `enter` to have produced a user; a protected screen never lets
/// a guest through.
fn signed_in(entry: Option<AuthenticatedUser>) -> Result<AuthenticatedUser, Response> {
    entry.ok_or_else(|| Redirect::to(Screen::Login.path()).into_response())
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Response {
    guest_screen(&state, Screen::Login, session).await
}

pub async fn register(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Response {
    guest_screen(&state, Screen::Register, session).await
}

/// `/home` only forwards to the role's home screen.
pub async fn home(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Response {
    match enter(&state, Screen::Home, session).await {
        Ok(_) => Redirect::to(Screen::Login.path()).into_response(),
        Err(response) => response,
    }
}

pub async fn admin_home(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Response {
    let user = match enter(&state, Screen::AdminHome, session).await.and_then(signed_in) {
        Ok(user) => user,
        Err(response) => return response,
    };
    match state.booking.list_events().await {
        Ok(events) => Json(
            ScreenView::for_user(Screen::AdminHome, &user)
                .with_events(events.iter().map(EventInfo::from).collect()),
        )
        .into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Response {
    match enter(&state, Screen::CreateEvent, session).await.and_then(signed_in) {
        Ok(user) => Json(ScreenView::for_user(Screen::CreateEvent, &user)).into_response(),
        Err(response) => response,
    }
}

pub async fn participant_home(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
) -> Response {
    let user = match enter(&state, Screen::ParticipantHome, session)
        .await
        .and_then(signed_in)
    {
        Ok(user) => user,
        Err(response) => return response,
    };
    match participant_events(&state, &user).await {
        Ok(events) => Json(
            ScreenView::for_user(Screen::ParticipantHome, &user).with_events(events),
        )
        .into_response(),
        Err(e) => e.into_response(),
    }
}

async fn participant_events(
    state: &AppState,
    user: &AuthenticatedUser,
) -> Result<Vec<EventInfo>, ApiError> {
    let joined: HashSet<EventId> = state
        .booking
        .user_events(user.user_id())
        .await?
        .into_iter()
        .collect();
    Ok(state
        .booking
        .list_events()
        .await?
        .iter()
        .map(|event| EventInfo::new(event, Some(joined.contains(&event.id()))))
        .collect())
}

pub async fn event_details(
    State(state): State<Arc<AppState>>,
    CurrentSession(session): CurrentSession,
    Path(id): Path<String>,
) -> Response {
    let user = match enter(&state, Screen::EventDetails, session)
        .await
        .and_then(signed_in)
    {
        Ok(user) => user,
        Err(response) => return response,
    };
    match event_view(&state, &user, &id).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => e.into_response(),
    }
}

async fn event_view(
    state: &AppState,
    user: &AuthenticatedUser,
    id: &str,
) -> Result<ScreenView, ApiError> {
    let event_id = parse_event_id(id)?;
    let event = state.booking.get_event(event_id).await?;

    let mut view = ScreenView::for_user(Screen::EventDetails, user);
    if user.is_admin() {
        let participants = state.booking.event_participants(event_id).await?;
        view.participants = Some(participants.iter().map(ToString::to_string).collect());
        view.events = vec![EventInfo::from(&event)];
    } else {
        let joined = state.booking.is_joined(event_id, user.user_id()).await?;
        view.events = vec![EventInfo::new(&event, Some(joined))];
    }
    Ok(view)
}
