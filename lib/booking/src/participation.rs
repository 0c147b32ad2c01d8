//! Participation records linking users to events.

use chrono::{DateTime, Utc};
use eventgate_core::{EventId, UserId};
use serde::{Deserialize, Serialize};

/// A user's enrollment in an event.
///
/// At most one record exists per `(event_id, user_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participation {
    event_id: EventId,
    user_id: UserId,
    joined_at: DateTime<Utc>,
}

impl Participation {
    /// Creates a participation stamped with the current time.
    #[must_use]
    pub fn new(event_id: EventId, user_id: UserId) -> Self {
        Self {
            event_id,
            user_id,
            joined_at: Utc::now(),
        }
    }

    /// Reconstitutes a participation from storage.
    #[must_use]
    pub fn with_all_fields(event_id: EventId, user_id: UserId, joined_at: DateTime<Utc>) -> Self {
        Self {
            event_id,
            user_id,
            joined_at,
        }
    }

    #[must_use]
    pub fn event_id(&self) -> EventId {
        self.event_id
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn joined_at(&self) -> DateTime<Utc> {
        self.joined_at
    }
}
