//! Core domain types and utilities for the eventgate platform.
//!
//! This crate provides the identifier types and error handling foundation
//! shared by the access-control, booking and server crates.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{EventId, ParseIdError, UserId};
