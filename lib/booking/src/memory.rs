//! In-memory event store.

use async_trait::async_trait;
use eventgate_core::{EventId, UserId};
use rootcause::Report;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::Mutex;

use crate::error::BookingError;
use crate::event::Event;
use crate::participation::Participation;
use crate::store::EventStore;

#[derive(Debug, Default)]
struct State {
    events: HashMap<EventId, Event>,
    participations: BTreeMap<(EventId, UserId), Participation>,
}

/// Event store holding everything behind a single lock, so joins and leaves
/// are atomic.
#[derive(Debug, Default)]
pub struct InMemoryEventStore {
    state: Mutex<State>,
}

impl InMemoryEventStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn insert_event(&self, event: &Event) -> Result<(), Report<BookingError>> {
        self.state
            .lock()
            .await
            .events
            .insert(event.id(), event.clone());
        Ok(())
    }

    async fn find_event(&self, id: EventId) -> Result<Option<Event>, Report<BookingError>> {
        Ok(self.state.lock().await.events.get(&id).cloned())
    }

    async fn list_events(&self) -> Result<Vec<Event>, Report<BookingError>> {
        let mut events: Vec<Event> = self.state.lock().await.events.values().cloned().collect();
        events.sort_by(|a, b| b.starts_at().cmp(&a.starts_at()));
        Ok(events)
    }

    async fn delete_event(&self, id: EventId) -> Result<bool, Report<BookingError>> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        if state.events.remove(&id).is_none() {
            return Ok(false);
        }
        state.participations.retain(|(event_id, _), _| *event_id != id);
        Ok(true)
    }

    async fn join_event(
        &self,
        participation: &Participation,
    ) -> Result<Event, Report<BookingError>> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let event_id = participation.event_id();
        let key = (event_id, participation.user_id().clone());

        if state.participations.contains_key(&key) {
            return Err(BookingError::AlreadyJoined {
                event_id,
                user_id: key.1,
            }
            .into());
        }
        let event = state
            .events
            .get_mut(&event_id)
            .ok_or(BookingError::EventNotFound { event_id })?;
        if !event.has_available_spots() {
            return Err(BookingError::EventFull {
                event_id,
                capacity: event.capacity(),
            }
            .into());
        }

        event.record_join();
        state.participations.insert(key, participation.clone());
        Ok(event.clone())
    }

    async fn leave_event(
        &self,
        event_id: EventId,
        user_id: &UserId,
    ) -> Result<Event, Report<BookingError>> {
        let mut guard = self.state.lock().await;
        let state = &mut *guard;
        let key = (event_id, user_id.clone());

        if !state.participations.contains_key(&key) {
            return Err(BookingError::NotJoined {
                event_id,
                user_id: user_id.clone(),
            }
            .into());
        }
        let event = state
            .events
            .get_mut(&event_id)
            .ok_or(BookingError::EventNotFound { event_id })?;

        event.record_leave();
        state.participations.remove(&key);
        Ok(event.clone())
    }

    async fn find_participation(
        &self,
        event_id: EventId,
        user_id: &UserId,
    ) -> Result<Option<Participation>, Report<BookingError>> {
        Ok(self
            .state
            .lock()
            .await
            .participations
            .get(&(event_id, user_id.clone()))
            .cloned())
    }

    async fn participants(
        &self,
        event_id: EventId,
    ) -> Result<Vec<Participation>, Report<BookingError>> {
        let mut participants: Vec<Participation> = self
            .state
            .lock()
            .await
            .participations
            .values()
            .filter(|p| p.event_id() == event_id)
            .cloned()
            .collect();
        participants.sort_by_key(Participation::joined_at);
        Ok(participants)
    }

    async fn events_for_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<EventId>, Report<BookingError>> {
        Ok(self
            .state
            .lock()
            .await
            .participations
            .keys()
            .filter(|(_, uid)| uid == user_id)
            .map(|(event_id, _)| *event_id)
            .collect())
    }
}
