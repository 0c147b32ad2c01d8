//! Event domain types.

use chrono::{DateTime, Utc};
use eventgate_core::{EventId, UserId};
use serde::{Deserialize, Serialize};

use crate::error::BookingError;

/// Fields supplied by an admin when creating an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventDraft {
    pub name: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub location: String,
    /// Maximum number of participants, at least 1.
    pub capacity: u32,
    /// Optional illustration; empty means none.
    #[serde(default)]
    pub image_url: String,
}

impl EventDraft {
    /// Checks required fields and the capacity floor.
    pub fn validate(&self) -> Result<(), BookingError> {
        for (field, value) in [
            ("name", &self.name),
            ("description", &self.description),
            ("location", &self.location),
        ] {
            if value.trim().is_empty() {
                return Err(BookingError::InvalidDraft {
                    field,
                    reason: format!("The {field} is required"),
                });
            }
        }
        if self.capacity < 1 {
            return Err(BookingError::InvalidDraft {
                field: "capacity",
                reason: "An event needs at least one spot".to_string(),
            });
        }
        Ok(())
    }
}

/// A community event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    id: EventId,
    name: String,
    description: String,
    starts_at: DateTime<Utc>,
    location: String,
    capacity: u32,
    image_url: String,
    created_by: UserId,
    created_at: DateTime<Utc>,
    /// Number of participation records; kept in step by the store.
    participant_count: u32,
}

impl Event {
    /// Creates a new event from a validated draft with no participants.
    #[must_use]
    pub fn from_draft(draft: EventDraft, created_by: UserId) -> Self {
        Self {
            id: EventId::new(),
            name: draft.name.trim().to_string(),
            description: draft.description.trim().to_string(),
            starts_at: draft.starts_at,
            location: draft.location.trim().to_string(),
            capacity: draft.capacity,
            image_url: draft.image_url.trim().to_string(),
            created_by,
            created_at: Utc::now(),
            participant_count: 0,
        }
    }

    /// Creates an event with all fields specified.
    ///
    /// Use this when reconstituting an event from storage.
    #[must_use]
    #[expect(clippy::too_many_arguments)]
    pub fn with_all_fields(
        id: EventId,
        name: String,
        description: String,
        starts_at: DateTime<Utc>,
        location: String,
        capacity: u32,
        image_url: String,
        created_by: UserId,
        created_at: DateTime<Utc>,
        participant_count: u32,
    ) -> Self {
        Self {
            id,
            name,
            description,
            starts_at,
            location,
            capacity,
            image_url,
            created_by,
            created_at,
            participant_count,
        }
    }

    #[must_use]
    pub fn id(&self) -> EventId {
        self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn starts_at(&self) -> DateTime<Utc> {
        self.starts_at
    }

    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }

    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Returns the image URL, if one was given.
    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        (!self.image_url.is_empty()).then_some(self.image_url.as_str())
    }

    #[must_use]
    pub fn created_by(&self) -> &UserId {
        &self.created_by
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn participant_count(&self) -> u32 {
        self.participant_count
    }

    /// Returns how many spots are left.
    #[must_use]
    pub fn remaining_spots(&self) -> u32 {
        self.capacity.saturating_sub(self.participant_count)
    }

    #[must_use]
    pub fn has_available_spots(&self) -> bool {
        self.participant_count < self.capacity
    }

    /// Counts one more participant. Stores call this inside the same
    /// atomic unit that creates the participation record.
    pub fn record_join(&mut self) {
        self.participant_count += 1;
    }

    /// Counts one fewer participant, never going below zero.
    pub fn record_leave(&mut self) {
        self.participant_count = self.participant_count.saturating_sub(1);
    }
}
