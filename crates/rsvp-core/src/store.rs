//! Storage capabilities the domain depends on.
//!
//! Lookups return `Ok(None)` for a missing record so callers handle found,
//! not-found and failure separately. Creates and updates are conditional
//! writes: adapters must report [`StoreError::Conflict`] instead of silently
//! overwriting or resurrecting a record.

use rsvp_types::models::{AdminUser, Guest, Rsvp};

use crate::error::StoreError;

pub trait GuestStore: Send + Sync {
    fn get_guest(&self, guest_id: &str) -> Result<Option<Guest>, StoreError>;

    /// Exact match on an already-normalized invitation code.
    fn get_guest_by_code(&self, code: &str) -> Result<Option<Guest>, StoreError>;

    /// Fails with `Conflict` if the id or the invitation code is taken.
    fn create_guest(&self, guest: &Guest) -> Result<(), StoreError>;

    fn list_guests(&self) -> Result<Vec<Guest>, StoreError>;
}

pub trait RsvpStore: Send + Sync {
    fn get_rsvp(&self, rsvp_id: &str) -> Result<Option<Rsvp>, StoreError>;

    fn get_rsvp_by_guest(&self, guest_id: &str) -> Result<Option<Rsvp>, StoreError>;

    /// Fails with `Conflict` if the id exists or the guest already answered.
    fn create_rsvp(&self, rsvp: &Rsvp) -> Result<(), StoreError>;

    /// Fails with `Conflict` if no record with this id and guest exists.
    fn update_rsvp(&self, rsvp: &Rsvp) -> Result<(), StoreError>;

    fn list_rsvps(&self) -> Result<Vec<Rsvp>, StoreError>;
}

pub trait AdminStore: Send + Sync {
    fn get_admin(&self, email: &str) -> Result<Option<AdminUser>, StoreError>;

    /// Fails with `Conflict` if the email is already provisioned.
    fn create_admin(&self, admin: &AdminUser) -> Result<(), StoreError>;

    /// Fails with `Conflict` if the admin does not exist.
    fn record_login(
        &self,
        email: &str,
        at: chrono::DateTime<chrono::Utc>,
    ) -> Result<(), StoreError>;
}
