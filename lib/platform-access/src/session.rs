//! Sessions issued by the identity provider.
//!
//! A session is the opaque handle returned by a successful sign-in or
//! sign-up. The app only observes it: it never mints provider tokens.

use chrono::{DateTime, Duration, Utc};
use eventgate_core::UserId;
use serde::{Deserialize, Serialize};

/// Unique identifier for a session.
///
/// Session IDs are opaque strings; the server uses them as cookie values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Creates a session ID from a string.
    #[must_use]
    pub fn new(id: String) -> Self {
        Self(id)
    }

    /// Generates a fresh session ID.
    #[must_use]
    pub fn generate() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// Returns the session ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for SessionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SessionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An authenticated identity handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique identifier for this session.
    id: SessionId,
    /// The signed-in user's provider ID.
    user_id: UserId,
    /// The signed-in user's email address.
    email: String,
    /// When the session was created.
    created_at: DateTime<Utc>,
    /// When the session expires.
    expires_at: DateTime<Utc>,
    /// Provider ID token.
    id_token: Option<String>,
    /// Provider refresh token.
    refresh_token: Option<String>,
}

impl Session {
    /// Creates a new session valid for the given duration.
    #[must_use]
    pub fn new(user_id: UserId, email: String, duration: Duration) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::generate(),
            user_id,
            email,
            created_at: now,
            expires_at: now + duration,
            id_token: None,
            refresh_token: None,
        }
    }

    /// Attaches provider tokens to the session.
    #[must_use]
    pub fn with_tokens(mut self, id_token: String, refresh_token: Option<String>) -> Self {
        self.id_token = Some(id_token);
        self.refresh_token = refresh_token;
        self
    }

    /// Creates a session with all fields specified.
    ///
    /// Use this when reconstituting a session from storage.
    #[must_use]
    pub fn with_all_fields(
        id: SessionId,
        user_id: UserId,
        email: String,
        created_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
        id_token: Option<String>,
        refresh_token: Option<String>,
    ) -> Self {
        Self {
            id,
            user_id,
            email,
            created_at,
            expires_at,
            id_token,
            refresh_token,
        }
    }

    #[must_use]
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    #[must_use]
    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    #[must_use]
    pub fn id_token(&self) -> Option<&str> {
        self.id_token.as_deref()
    }

    #[must_use]
    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }

    /// Returns true if the session has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Returns a copy of this session with its lifetime reset to `duration`
    /// from now.
    ///
    /// The provider's token lifetime and the server's cookie lifetime are
    /// configured independently; the server calls this before persisting.
    #[must_use]
    pub fn expiring_in(mut self, duration: Duration) -> Self {
        self.expires_at = Utc::now() + duration;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(duration: Duration) -> Session {
        Session::new(UserId::new("u1"), "a@example.com".to_string(), duration)
    }

    #[test]
    fn session_id_from_str() {
        let id: SessionId = "test_session".into();
        assert_eq!(id.as_str(), "test_session");
        assert_eq!(id.to_string(), "test_session");
    }

    #[test]
    fn generated_session_ids_differ() {
        assert_ne!(SessionId::generate(), SessionId::generate());
    }

    #[test]
    fn new_session_has_no_tokens() {
        let session = session(Duration::hours(1));
        assert_eq!(session.user_id().as_str(), "u1");
        assert_eq!(session.email(), "a@example.com");
        assert!(session.id_token().is_none());
        assert!(session.expires_at() > session.created_at());
        assert!(!session.is_expired());
    }

    #[test]
    fn session_with_tokens() {
        let session = session(Duration::hours(1))
            .with_tokens("id-token".to_string(), Some("refresh".to_string()));
        assert_eq!(session.id_token(), Some("id-token"));
        assert_eq!(session.refresh_token(), Some("refresh"));
    }

    #[test]
    fn session_expiration() {
        let session = session(Duration::seconds(-1));
        assert!(session.is_expired());

        let renewed = session.expiring_in(Duration::minutes(5));
        assert!(!renewed.is_expired());
    }
}
