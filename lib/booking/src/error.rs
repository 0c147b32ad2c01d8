//! Error types for event and participation operations.

use eventgate_core::{EventId, UserId};
use std::fmt;

/// How an error is presented to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    /// A rejected action the user can understand and correct.
    Warning,
    /// An unexpected failure.
    Error,
}

/// Errors from booking operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingError {
    /// The event does not exist.
    EventNotFound { event_id: EventId },
    /// The event has no spots left.
    EventFull { event_id: EventId, capacity: u32 },
    /// The user already joined the event.
    AlreadyJoined { event_id: EventId, user_id: UserId },
    /// The user has not joined the event.
    NotJoined { event_id: EventId, user_id: UserId },
    /// An event draft failed validation.
    InvalidDraft { field: &'static str, reason: String },
    /// The acting user lacks the required role.
    PermissionDenied { user_id: UserId, action: &'static str },
    /// The event store failed.
    Storage { details: String },
}

impl BookingError {
    /// Domain rejections are warnings; everything else is an error.
    #[must_use]
    pub fn severity(&self) -> Severity {
        match self {
            Self::Storage { .. } => Severity::Error,
            _ => Severity::Warning,
        }
    }

    /// Returns the message shown to the user.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::EventNotFound { .. } => "This event no longer exists".to_string(),
            Self::EventFull { .. } => "This event is full".to_string(),
            Self::AlreadyJoined { .. } => "You have already joined this event".to_string(),
            Self::NotJoined { .. } => "You have not joined this event".to_string(),
            Self::InvalidDraft { reason, .. } => reason.clone(),
            Self::PermissionDenied { .. } => "You are not allowed to do that".to_string(),
            Self::Storage { .. } => "Something went wrong, please try again".to_string(),
        }
    }
}

impl fmt::Display for BookingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EventNotFound { event_id } => write!(f, "event '{event_id}' not found"),
            Self::EventFull { event_id, capacity } => {
                write!(f, "event '{event_id}' is full ({capacity} spots)")
            }
            Self::AlreadyJoined { event_id, user_id } => {
                write!(f, "user {user_id} already joined event '{event_id}'")
            }
            Self::NotJoined { event_id, user_id } => {
                write!(f, "user {user_id} has not joined event '{event_id}'")
            }
            Self::InvalidDraft { field, reason } => write!(f, "invalid {field}: {reason}"),
            Self::PermissionDenied { user_id, action } => {
                write!(f, "user {user_id} lacks permission to {action}")
            }
            Self::Storage { details } => write!(f, "event store error: {details}"),
        }
    }
}

impl std::error::Error for BookingError {}
