//! Request and response bodies shared by the HTTP handlers.

use chrono::{DateTime, Utc};
use eventgate_booking::Event;
use eventgate_platform_access::{AuthenticatedUser, Role, Screen};
use serde::{Deserialize, Serialize};

/// Notification level shown by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Success,
    Warning,
    Error,
}

/// A message the client shows as a toast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub level: Level,
    pub message: String,
}

impl Notification {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: Level::Success,
            message: message.into(),
        }
    }
}

/// Body of `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Body of `PUT /profile/display-name`.
#[derive(Debug, Deserialize)]
pub struct DisplayNameRequest {
    pub display_name: Option<String>,
}

/// Signed-in user info for display.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserInfo {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: Role,
}

impl From<&AuthenticatedUser> for UserInfo {
    fn from(user: &AuthenticatedUser) -> Self {
        let profile = user.profile();
        Self {
            id: profile.id().to_string(),
            email: profile.email().to_string(),
            display_name: profile.display_name().map(str::to_string),
            role: profile.role(),
        }
    }
}

/// Event summary for lists and detail screens.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EventInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub starts_at: DateTime<Utc>,
    pub location: String,
    pub capacity: u32,
    pub participant_count: u32,
    pub remaining_spots: u32,
    pub image_url: Option<String>,
    /// Whether the viewing user joined; omitted for admins.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub joined: Option<bool>,
}

impl EventInfo {
    pub fn new(event: &Event, joined: Option<bool>) -> Self {
        Self {
            id: event.id().to_string(),
            name: event.name().to_string(),
            description: event.description().to_string(),
            starts_at: event.starts_at(),
            location: event.location().to_string(),
            capacity: event.capacity(),
            participant_count: event.participant_count(),
            remaining_spots: event.remaining_spots(),
            image_url: event.image_url().map(str::to_string),
            joined,
        }
    }
}

impl From<&Event> for EventInfo {
    fn from(event: &Event) -> Self {
        Self::new(event, None)
    }
}

/// Data rendered by a screen.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScreenView {
    pub screen: Screen,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub events: Vec<EventInfo>,
    /// Participant user IDs, shown to admins on the detail screen.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<String>>,
}

impl ScreenView {
    pub fn guest(screen: Screen) -> Self {
        Self {
            screen,
            user: None,
            events: Vec::new(),
            participants: None,
        }
    }

    pub fn for_user(screen: Screen, user: &AuthenticatedUser) -> Self {
        Self {
            user: Some(UserInfo::from(user)),
            ..Self::guest(screen)
        }
    }

    #[must_use]
    pub fn with_events(mut self, events: Vec<EventInfo>) -> Self {
        self.events = events;
        self
    }
}
