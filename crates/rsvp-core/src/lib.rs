//! RSVP domain logic: guest search, submission validation, create-or-update
//! reconciliation and dashboard aggregation.
//!
//! Everything here talks to storage through the capability traits in
//! [`store`]; the SQLite adapter lives in `rsvp-db` and [`memory::MemoryStore`]
//! backs the tests.

pub mod attendees;
pub mod error;
pub mod guests;
pub mod invite;
pub mod memory;
pub mod reconcile;
pub mod roster;
pub mod search;
pub mod stats;
pub mod store;

pub use error::{RsvpError, StoreError};
pub use store::{AdminStore, GuestStore, RsvpStore};
