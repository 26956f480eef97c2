//! In-process store with the same conditional-write semantics as the SQLite
//! adapter. Used by tests and local tooling.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::anyhow;
use chrono::{DateTime, Utc};
use rsvp_types::models::{AdminUser, Guest, Rsvp};

use crate::error::StoreError;
use crate::store::{AdminStore, GuestStore, RsvpStore};

#[derive(Default)]
pub struct MemoryStore {
    guests: RwLock<HashMap<String, Guest>>,
    rsvps: RwLock<HashMap<String, Rsvp>>,
    admins: RwLock<HashMap<String, AdminUser>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn read<'a, T>(lock: &'a RwLock<T>, what: &str) -> Result<RwLockReadGuard<'a, T>, StoreError> {
    lock.read()
        .map_err(|e| StoreError::Unavailable(anyhow!("{} lock poisoned: {}", what, e)))
}

fn write<'a, T>(lock: &'a RwLock<T>, what: &str) -> Result<RwLockWriteGuard<'a, T>, StoreError> {
    lock.write()
        .map_err(|e| StoreError::Unavailable(anyhow!("{} lock poisoned: {}", what, e)))
}

impl GuestStore for MemoryStore {
    fn get_guest(&self, guest_id: &str) -> Result<Option<Guest>, StoreError> {
        Ok(read(&self.guests, "guests")?.get(guest_id).cloned())
    }

    fn get_guest_by_code(&self, code: &str) -> Result<Option<Guest>, StoreError> {
        Ok(read(&self.guests, "guests")?
            .values()
            .find(|g| g.invitation_code == code)
            .cloned())
    }

    fn create_guest(&self, guest: &Guest) -> Result<(), StoreError> {
        let mut guests = write(&self.guests, "guests")?;
        if guests.contains_key(&guest.guest_id) {
            return Err(StoreError::Conflict(format!("guest {} already exists", guest.guest_id)));
        }
        if guests.values().any(|g| g.invitation_code == guest.invitation_code) {
            return Err(StoreError::Conflict(format!(
                "invitation code {} already in use",
                guest.invitation_code
            )));
        }
        guests.insert(guest.guest_id.clone(), guest.clone());
        Ok(())
    }

    fn list_guests(&self) -> Result<Vec<Guest>, StoreError> {
        let mut all: Vec<Guest> = read(&self.guests, "guests")?.values().cloned().collect();
        all.sort_by(|a, b| (a.created_at, &a.guest_id).cmp(&(b.created_at, &b.guest_id)));
        Ok(all)
    }
}

impl RsvpStore for MemoryStore {
    fn get_rsvp(&self, rsvp_id: &str) -> Result<Option<Rsvp>, StoreError> {
        Ok(read(&self.rsvps, "rsvps")?.get(rsvp_id).cloned())
    }

    fn get_rsvp_by_guest(&self, guest_id: &str) -> Result<Option<Rsvp>, StoreError> {
        Ok(read(&self.rsvps, "rsvps")?
            .values()
            .find(|r| r.guest_id == guest_id)
            .cloned())
    }

    fn create_rsvp(&self, rsvp: &Rsvp) -> Result<(), StoreError> {
        let mut rsvps = write(&self.rsvps, "rsvps")?;
        if rsvps.contains_key(&rsvp.rsvp_id) || rsvps.values().any(|r| r.guest_id == rsvp.guest_id) {
            return Err(StoreError::Conflict(format!(
                "guest {} already has an rsvp",
                rsvp.guest_id
            )));
        }
        rsvps.insert(rsvp.rsvp_id.clone(), rsvp.clone());
        Ok(())
    }

    fn update_rsvp(&self, rsvp: &Rsvp) -> Result<(), StoreError> {
        let mut rsvps = write(&self.rsvps, "rsvps")?;
        match rsvps.get_mut(&rsvp.rsvp_id) {
            Some(existing) if existing.guest_id == rsvp.guest_id => {
                *existing = rsvp.clone();
                Ok(())
            }
            _ => Err(StoreError::Conflict(format!("rsvp {} no longer exists", rsvp.rsvp_id))),
        }
    }

    fn list_rsvps(&self) -> Result<Vec<Rsvp>, StoreError> {
        let mut all: Vec<Rsvp> = read(&self.rsvps, "rsvps")?.values().cloned().collect();
        all.sort_by(|a, b| (a.submitted_at, &a.rsvp_id).cmp(&(b.submitted_at, &b.rsvp_id)));
        Ok(all)
    }
}

impl AdminStore for MemoryStore {
    fn get_admin(&self, email: &str) -> Result<Option<AdminUser>, StoreError> {
        Ok(read(&self.admins, "admins")?.get(email).cloned())
    }

    fn create_admin(&self, admin: &AdminUser) -> Result<(), StoreError> {
        let mut admins = write(&self.admins, "admins")?;
        if admins.contains_key(&admin.email) {
            return Err(StoreError::Conflict(format!("admin {} already exists", admin.email)));
        }
        admins.insert(admin.email.clone(), admin.clone());
        Ok(())
    }

    fn record_login(&self, email: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut admins = write(&self.admins, "admins")?;
        let admin = admins
            .get_mut(email)
            .ok_or_else(|| StoreError::Conflict(format!("admin {} does not exist", email)))?;
        admin.last_login = Some(at);
        admin.updated_at = at;
        Ok(())
    }
}
