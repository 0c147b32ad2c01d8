//! Events and participations for eventgate.
//!
//! Admins create and delete [`Event`]s; participants join and leave them.
//! Every join or leave changes the [`Participation`] record and the event's
//! participant count in one atomic [`EventStore`] operation, so the count
//! always equals the number of records.

pub mod error;
pub mod event;
pub mod memory;
pub mod participation;
pub mod service;
pub mod store;

pub use error::{BookingError, Severity};
pub use event::{Event, EventDraft};
pub use memory::InMemoryEventStore;
pub use participation::Participation;
pub use service::BookingService;
pub use store::EventStore;
