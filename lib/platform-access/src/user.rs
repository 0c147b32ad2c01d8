//! User profile domain type.
//!
//! A profile is created once at registration, keyed by the identity
//! provider's user ID, and carries the role used for route gating.

use chrono::{DateTime, Utc};
use eventgate_core::UserId;
use serde::{Deserialize, Serialize};

use crate::role::Role;

/// Stored profile of a registered user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Provider-issued user ID; also the profile's document key.
    id: UserId,
    /// Email address used at registration.
    email: String,
    /// Role assigned at registration.
    role: Role,
    /// Optional name shown in the UI.
    display_name: Option<String>,
    /// When the profile was created.
    created_at: DateTime<Utc>,
}

impl UserProfile {
    /// Creates a new profile stamped with the current time.
    #[must_use]
    pub fn new(id: UserId, email: String, role: Role) -> Self {
        Self {
            id,
            email,
            role,
            display_name: None,
            created_at: Utc::now(),
        }
    }

    /// Creates a profile with all fields specified.
    ///
    /// Use this when reconstituting a profile from storage.
    #[must_use]
    pub fn with_all_fields(
        id: UserId,
        email: String,
        role: Role,
        display_name: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            email,
            role,
            display_name,
            created_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> &UserId {
        &self.id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns true if the profile has the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Sets the display name.
    pub fn set_display_name(&mut self, display_name: Option<String>) {
        self.display_name = display_name;
    }
}
