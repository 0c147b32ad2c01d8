//! Sessions, roles and route gating for eventgate.
//!
//! This crate provides:
//! - User profiles carrying a [`Role`] (admin or participant)
//! - Sessions issued by an external [`IdentityProvider`] (Firebase
//!   Authentication, or the in-memory provider for development)
//! - [`SessionObserver`], the process-scoped holder of the current session
//!   and role
//! - [`RouteGate`], the pre-navigation check deciding whether a session may
//!   enter a [`Screen`]
//!
//! # Example
//!
//! ```
//! use eventgate_platform_access::{
//!     GateDecision, RouteGate, Screen,
//!     memory::{InMemoryIdentityProvider, InMemoryProfileStore},
//!     AuthService, Registration, Role,
//! };
//! use std::sync::Arc;
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let profiles = Arc::new(InMemoryProfileStore::new());
//! let auth = AuthService::new(Arc::new(InMemoryIdentityProvider::new()), profiles.clone());
//! let gate = RouteGate::new(profiles);
//!
//! let (session, _profile) = auth
//!     .register(Registration {
//!         email: "alice@example.com".to_string(),
//!         password: "secret1".to_string(),
//!         role: Role::Participant,
//!         display_name: None,
//!     })
//!     .await
//!     .unwrap();
//!
//! assert_eq!(
//!     gate.check(Screen::AdminHome, Some(&session)).await,
//!     GateDecision::Redirect(Screen::ParticipantHome)
//! );
//! # });
//! ```

pub mod auth;
pub mod error;
pub mod firebase;
pub mod gate;
pub mod memory;
pub mod observer;
pub mod role;
pub mod session;
pub mod store;
pub mod user;

// Re-export main types at crate root
pub use auth::{AuthService, AuthenticatedUser, Registration};
pub use error::{AuthenticationError, AuthorizationError, ProfileError, StoreError};
pub use firebase::{FirebaseConfig, FirebaseIdentityProvider};
pub use gate::{Access, GateDecision, RouteGate, Screen};
pub use observer::{SessionObserver, SessionState};
pub use role::Role;
pub use session::{Session, SessionId};
pub use store::{IdentityProvider, ProfileStore, RoleResolver, SessionStore};
pub use user::UserProfile;
