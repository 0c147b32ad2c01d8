//! Event storage seam.
//!
//! Implementations must apply [`EventStore::join_event`] and
//! [`EventStore::leave_event`] atomically: the participation record and the
//! event's participant count change together or not at all.

use async_trait::async_trait;
use eventgate_core::{EventId, Result, UserId};

use crate::error::BookingError;
use crate::event::Event;
use crate::participation::Participation;

/// Store of events and participations.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Persists a new event.
    async fn insert_event(&self, event: &Event) -> Result<(), BookingError>;

    /// Finds an event by ID.
    async fn find_event(&self, id: EventId) -> Result<Option<Event>, BookingError>;

    /// Lists all events, latest start first.
    async fn list_events(&self) -> Result<Vec<Event>, BookingError>;

    /// Deletes an event and its participations. Returns false if it did
    /// not exist.
    async fn delete_event(&self, id: EventId) -> Result<bool, BookingError>;

    /// Records the participation and increments the count.
    ///
    /// Fails with `AlreadyJoined`, `EventNotFound` or `EventFull`, checked in
    /// that order, without changing anything. Returns the updated event.
    async fn join_event(&self, participation: &Participation) -> Result<Event, BookingError>;

    /// Removes the participation and decrements the count.
    ///
    /// Fails with `NotJoined` if no record exists. Returns the updated event.
    async fn leave_event(&self, event_id: EventId, user_id: &UserId)
    -> Result<Event, BookingError>;

    /// Finds the participation for a user and event.
    async fn find_participation(
        &self,
        event_id: EventId,
        user_id: &UserId,
    ) -> Result<Option<Participation>, BookingError>;

    /// Lists participations of an event, earliest first.
    async fn participants(&self, event_id: EventId) -> Result<Vec<Participation>, BookingError>;

    /// Lists the IDs of events the user has joined.
    async fn events_for_user(&self, user_id: &UserId) -> Result<Vec<EventId>, BookingError>;
}
