//! Storage and identity-provider seams.
//!
//! The identity provider and the document store are external systems; these
//! traits are the only surface the rest of the workspace sees. Postgres
//! implementations live in the server crate, in-memory ones in
//! [`crate::memory`].

use async_trait::async_trait;
use eventgate_core::UserId;
use rootcause::Report;

use crate::error::{AuthenticationError, AuthorizationError, StoreError};
use crate::role::Role;
use crate::session::{Session, SessionId};
use crate::user::UserProfile;

/// External identity provider.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Short provider name used in logs and errors.
    fn name(&self) -> &str;

    /// Signs in with email and password.
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, Report<AuthenticationError>>;

    /// Creates an account and signs it in.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Session, Report<AuthenticationError>>;

    /// Ends the session with the provider.
    async fn sign_out(&self, session: &Session) -> Result<(), Report<AuthenticationError>>;
}

/// Store of user profiles (`users/{id}`).
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Creates a profile. Fails with [`StoreError::Conflict`] if one exists.
    async fn create_profile(&self, profile: &UserProfile) -> Result<(), Report<StoreError>>;

    /// Finds a profile by user ID.
    async fn find_profile(&self, id: &UserId) -> Result<Option<UserProfile>, Report<StoreError>>;

    /// Sets the display name. Returns false if no profile exists.
    async fn update_display_name(
        &self,
        id: &UserId,
        display_name: Option<&str>,
    ) -> Result<bool, Report<StoreError>>;
}

/// Looks up the role attribute for a user.
#[async_trait]
pub trait RoleResolver: Send + Sync {
    /// Resolves the user's role.
    ///
    /// Fails if the profile is missing, the stored role is unrecognized, or
    /// the lookup itself fails.
    async fn resolve_role(&self, user_id: &UserId) -> Result<Role, Report<AuthorizationError>>;
}

/// Server-side session records, keyed by session ID.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persists a session.
    async fn create_session(&self, session: &Session) -> Result<(), Report<StoreError>>;

    /// Finds a session by ID.
    async fn find_session(&self, id: &SessionId) -> Result<Option<Session>, Report<StoreError>>;

    /// Deletes a session by ID.
    async fn delete_session(&self, id: &SessionId) -> Result<(), Report<StoreError>>;

    /// Deletes all expired sessions, returning how many were removed.
    async fn delete_expired(&self) -> Result<u64, Report<StoreError>>;
}
