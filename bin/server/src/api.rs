//! Action handlers for events and profiles.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use eventgate_booking::EventDraft;
use std::sync::Arc;

use crate::auth::{AdminUser, AppState, ParticipantUser, RequireAuth};
use crate::error::ApiError;
use crate::pages::parse_event_id;
use crate::types::{DisplayNameRequest, EventInfo, Notification};

/// `POST /events`
pub async fn create_event(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Json(draft): Json<EventDraft>,
) -> Result<impl IntoResponse, ApiError> {
    let event = state.booking.create_event(user.user_id(), draft).await?;
    Ok((StatusCode::CREATED, Json(EventInfo::from(&event))))
}

/// `DELETE /events/{id}`
pub async fn delete_event(
    State(state): State<Arc<AppState>>,
    AdminUser(user): AdminUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let event_id = parse_event_id(&id)?;
    state.booking.delete_event(user.user_id(), event_id).await?;
    Ok(Json(Notification::success("Event deleted")))
}

/// `POST /events/{id}/join`
pub async fn join_event(
    State(state): State<Arc<AppState>>,
    ParticipantUser(user): ParticipantUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let event_id = parse_event_id(&id)?;
    let event = state.booking.join(event_id, user.user_id()).await?;
    Ok(Json(EventInfo::new(&event, Some(true))))
}

/// `POST /events/{id}/leave`
pub async fn leave_event(
    State(state): State<Arc<AppState>>,
    ParticipantUser(user): ParticipantUser,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let event_id = parse_event_id(&id)?;
    let event = state.booking.leave(event_id, user.user_id()).await?;
    Ok(Json(EventInfo::new(&event, Some(false))))
}

/// `PUT /profile/display-name`
pub async fn update_display_name(
    State(state): State<Arc<AppState>>,
    RequireAuth(user): RequireAuth,
    Json(request): Json<DisplayNameRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .auth
        .update_display_name(user.user_id(), request.display_name.as_deref())
        .await?;
    Ok(Json(Notification::success("Profile updated")))
}
