//! Role types for access control.
//!
//! Every user profile carries exactly one role. Admins manage events;
//! participants browse them and join or leave.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Access role stored on a user's profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Can create and delete events.
    Admin,
    /// Can browse events and join or leave them.
    #[default]
    Participant,
}

impl Role {
    /// Returns true if this role has admin privileges.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }

    /// Returns the stored representation of the role.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Participant => "participant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a stored role value is not a known role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownRole(pub String);

impl fmt::Display for UnknownRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown role '{}'", self.0)
    }
}

impl std::error::Error for UnknownRole {}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "participant" => Ok(Self::Participant),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_is_admin() {
        assert!(Role::Admin.is_admin());
        assert!(!Role::Participant.is_admin());
    }

    #[test]
    fn default_role_is_participant() {
        assert_eq!(Role::default(), Role::Participant);
    }

    #[test]
    fn parse_known_roles() {
        assert_eq!("admin".parse::<Role>(), Ok(Role::Admin));
        assert_eq!("participant".parse::<Role>(), Ok(Role::Participant));
    }

    #[test]
    fn parse_is_case_sensitive_and_strict() {
        assert_eq!(
            "Admin".parse::<Role>(),
            Err(UnknownRole("Admin".to_string()))
        );
        assert!("organizer".parse::<Role>().is_err());
    }

    #[test]
    fn role_serialization_format() {
        let json = serde_json::to_string(&Role::Admin).expect("serialize");
        assert_eq!(json, "\"admin\"");
        let json = serde_json::to_string(&Role::Participant).expect("serialize");
        assert_eq!(json, "\"participant\"");
    }
}
