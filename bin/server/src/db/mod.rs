//! Database repositories for the eventgate server.
//!
//! This module provides data access for events and participations. Profile
//! and session repositories live next to the authentication code in
//! [`crate::auth::db`].

pub mod event;

pub use event::EventRepository;
