//! Authentication module for the eventgate server.
//!
//! This module provides:
//! - Email/password sign-in and registration against the identity provider
//! - Database-backed session management behind an HTTP-only cookie
//! - Extractors that run the [`RouteGate`] before a handler executes
//!
//! # Authorization Model
//!
//! Access is decided per request from the session cookie and the role stored
//! on the user's profile. The role is looked up on every check rather than
//! cached in the session, so a role change applies on the next request.

pub mod db;
pub mod middleware;
pub mod routes;

use crate::config::SessionConfig;
use eventgate_booking::{BookingService, EventStore};
use eventgate_platform_access::{
    AuthService, IdentityProvider, ProfileStore, RoleResolver, RouteGate, SessionStore,
};
use sqlx::PgPool;
use std::sync::Arc;

pub use db::{ProfileRepository, SessionRepository};
pub use middleware::{AdminUser, CurrentSession, ParticipantUser, RequireAuth};
pub use routes::{login, logout, register};

/// Shared application state.
pub struct AppState {
    /// Account and profile operations.
    pub auth: AuthService,
    /// Event and participation operations.
    pub booking: BookingService,
    /// Route gate evaluated before screens and actions.
    pub gate: RouteGate,
    /// Server-side session records.
    pub sessions: Arc<dyn SessionStore>,
    /// Session configuration.
    pub session_config: SessionConfig,
}

impl AppState {
    /// Creates a new application state from its stores.
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        profiles: Arc<dyn ProfileStore>,
        roles: Arc<dyn RoleResolver>,
        events: Arc<dyn EventStore>,
        sessions: Arc<dyn SessionStore>,
        session_config: SessionConfig,
    ) -> Self {
        Self {
            auth: AuthService::new(identity, profiles),
            booking: BookingService::new(events, roles.clone()),
            gate: RouteGate::new(roles),
            sessions,
            session_config,
        }
    }

    /// Creates application state backed by PostgreSQL.
    pub fn postgres(
        db_pool: PgPool,
        identity: Arc<dyn IdentityProvider>,
        session_config: SessionConfig,
    ) -> Self {
        let profiles = Arc::new(ProfileRepository::new(db_pool.clone()));
        Self::new(
            identity,
            profiles.clone(),
            profiles,
            Arc::new(crate::db::EventRepository::new(db_pool.clone())),
            Arc::new(SessionRepository::new(db_pool)),
            session_config,
        )
    }
}
