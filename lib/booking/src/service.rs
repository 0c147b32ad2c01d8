//! Event and participation operations.
//!
//! [`BookingService`] is the entry point used by the HTTP layer. Event
//! creation and deletion require the admin role, resolved through the same
//! [`RoleResolver`] the route gate uses. Joining and leaving delegate to the
//! store's atomic operations.

use eventgate_core::{EventId, UserId};
use eventgate_platform_access::{AuthorizationError, Role, RoleResolver};
use rootcause::Report;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::error::BookingError;
use crate::event::{Event, EventDraft};
use crate::participation::Participation;
use crate::store::EventStore;

#[derive(Clone)]
pub struct BookingService {
    events: Arc<dyn EventStore>,
    roles: Arc<dyn RoleResolver>,
}

impl BookingService {
    #[must_use]
    pub fn new(events: Arc<dyn EventStore>, roles: Arc<dyn RoleResolver>) -> Self {
        Self { events, roles }
    }

    async fn require_admin(
        &self,
        actor: &UserId,
        action: &'static str,
    ) -> Result<(), Report<BookingError>> {
        match self.roles.resolve_role(actor).await {
            Ok(Role::Admin) => Ok(()),
            Ok(Role::Participant) => Err(BookingError::PermissionDenied {
                user_id: actor.clone(),
                action,
            }
            .into()),
            Err(e) => match e.current_context() {
                AuthorizationError::LookupFailed { reason } => Err(BookingError::Storage {
                    details: reason.clone(),
                }
                .into()),
                _ => {
                    warn!(user_id = %actor, error = %e, "role unresolved, denying");
                    Err(BookingError::PermissionDenied {
                        user_id: actor.clone(),
                        action,
                    }
                    .into())
                }
            },
        }
    }

    /// Creates an event on behalf of an admin.
    #[instrument(skip(self, draft), fields(name = %draft.name))]
    pub async fn create_event(
        &self,
        actor: &UserId,
        draft: EventDraft,
    ) -> Result<Event, Report<BookingError>> {
        self.require_admin(actor, "create events").await?;
        draft.validate()?;

        let event = Event::from_draft(draft, actor.clone());
        self.events.insert_event(&event).await?;
        info!(event_id = %event.id(), capacity = event.capacity(), "event created");
        Ok(event)
    }

    /// Deletes an event and its participations on behalf of an admin.
    #[instrument(skip(self))]
    pub async fn delete_event(
        &self,
        actor: &UserId,
        event_id: EventId,
    ) -> Result<(), Report<BookingError>> {
        self.require_admin(actor, "delete events").await?;
        if !self.events.delete_event(event_id).await? {
            return Err(BookingError::EventNotFound { event_id }.into());
        }
        info!("event deleted");
        Ok(())
    }

    /// Lists all events, latest start first.
    pub async fn list_events(&self) -> Result<Vec<Event>, Report<BookingError>> {
        self.events.list_events().await
    }

    pub async fn get_event(&self, event_id: EventId) -> Result<Event, Report<BookingError>> {
        self.events
            .find_event(event_id)
            .await?
            .ok_or_else(|| BookingError::EventNotFound { event_id }.into())
    }

    pub async fn has_available_spots(
        &self,
        event_id: EventId,
    ) -> Result<bool, Report<BookingError>> {
        Ok(self.get_event(event_id).await?.has_available_spots())
    }

    /// Joins the user to the event. Returns the updated event.
    #[instrument(skip(self))]
    pub async fn join(
        &self,
        event_id: EventId,
        user_id: &UserId,
    ) -> Result<Event, Report<BookingError>> {
        let participation = Participation::new(event_id, user_id.clone());
        match self.events.join_event(&participation).await {
            Ok(event) => {
                info!(
                    participants = event.participant_count(),
                    capacity = event.capacity(),
                    "joined event"
                );
                Ok(event)
            }
            Err(e) => {
                warn!(error = %e, "join rejected");
                Err(e)
            }
        }
    }

    /// Removes the user from the event. Returns the updated event.
    #[instrument(skip(self))]
    pub async fn leave(
        &self,
        event_id: EventId,
        user_id: &UserId,
    ) -> Result<Event, Report<BookingError>> {
        match self.events.leave_event(event_id, user_id).await {
            Ok(event) => {
                info!(participants = event.participant_count(), "left event");
                Ok(event)
            }
            Err(e) => {
                warn!(error = %e, "leave rejected");
                Err(e)
            }
        }
    }

    pub async fn is_joined(
        &self,
        event_id: EventId,
        user_id: &UserId,
    ) -> Result<bool, Report<BookingError>> {
        Ok(self
            .events
            .find_participation(event_id, user_id)
            .await?
            .is_some())
    }

    /// Returns the IDs of users who joined the event.
    pub async fn event_participants(
        &self,
        event_id: EventId,
    ) -> Result<Vec<UserId>, Report<BookingError>> {
        Ok(self
            .events
            .participants(event_id)
            .await?
            .into_iter()
            .map(|p| p.user_id().clone())
            .collect())
    }

    /// Counts participation records for the event.
    pub async fn count_participants(&self, event_id: EventId) -> Result<usize, Report<BookingError>> {
        Ok(self.events.participants(event_id).await?.len())
    }

    /// Returns the IDs of events the user joined.
    pub async fn user_events(&self, user_id: &UserId) -> Result<Vec<EventId>, Report<BookingError>> {
        self.events.events_for_user(user_id).await
    }
}
