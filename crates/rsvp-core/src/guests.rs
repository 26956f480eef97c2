//! Guest creation, bulk import and invitation-code lookup.

use chrono::{DateTime, Utc};
use rsvp_types::api::CreateGuestRequest;
use rsvp_types::models::{Address, Guest};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::attendees::ValidationError;
use crate::error::{RsvpError, StoreError};
use crate::invite::{generate_code, normalize_code};
use crate::store::GuestStore;

/// Fresh codes drawn before giving up on a collision streak.
pub const CODE_ATTEMPTS: usize = 5;

pub const DEFAULT_COUNTRY: &str = "USA";

/// A household to be invited, before it has an id or code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGuest {
    pub primary_guest: String,
    pub household_members: Vec<String>,
    pub max_party_size: u32,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Address,
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value.map(str::trim).filter(|v| !v.is_empty()).map(str::to_string)
}

impl TryFrom<&CreateGuestRequest> for NewGuest {
    type Error = ValidationError;

    fn try_from(req: &CreateGuestRequest) -> Result<Self, Self::Error> {
        let primary_guest = req.primary_guest.trim();
        if primary_guest.is_empty() {
            return Err(ValidationError::MissingPrimaryGuest);
        }

        let max_party_size = match req.max_party_size {
            Some(n) if n >= 1 => u32::try_from(n).unwrap_or(u32::MAX),
            _ => 1,
        };

        let mut address = Address {
            street: req.address.street.trim().to_string(),
            city: req.address.city.trim().to_string(),
            state: req.address.state.trim().to_string(),
            zip: req.address.zip.trim().to_string(),
            country: req.address.country.trim().to_string(),
        };
        if address.country.is_empty() {
            address.country = DEFAULT_COUNTRY.to_string();
        }

        Ok(Self {
            primary_guest: primary_guest.to_string(),
            household_members: req
                .household_members
                .iter()
                .map(|m| m.trim())
                .filter(|m| !m.is_empty())
                .map(str::to_string)
                .collect(),
            max_party_size,
            email: non_empty(req.email.as_deref()),
            phone: non_empty(req.phone.as_deref()),
            address,
        })
    }
}

/// Insert a guest under a fresh id, redrawing the invitation code whenever
/// the store reports it taken.
pub fn create_guest(
    store: &dyn GuestStore,
    new: NewGuest,
    now: DateTime<Utc>,
) -> Result<Guest, RsvpError> {
    let mut guest = Guest {
        guest_id: Uuid::new_v4().to_string(),
        invitation_code: String::new(),
        primary_guest: new.primary_guest,
        household_members: new.household_members,
        max_party_size: new.max_party_size,
        email: new.email,
        phone: new.phone,
        address: new.address,
        created_at: now,
        updated_at: now,
    };

    for attempt in 1..=CODE_ATTEMPTS {
        guest.invitation_code = generate_code();
        match store.create_guest(&guest) {
            Ok(()) => {
                info!(guest = %guest.primary_guest, code = %guest.invitation_code, "guest created");
                return Ok(guest);
            }
            Err(StoreError::Conflict(detail)) => {
                warn!(attempt, %detail, "invitation code collision");
            }
            Err(e) => return Err(e.into()),
        }
    }

    Err(RsvpError::Conflict(format!(
        "no unique invitation code after {} attempts",
        CODE_ATTEMPTS
    )))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub failed: usize,
}

/// Create each guest in turn. Rows that lose every code draw are counted as
/// failed; a storage outage aborts the import.
pub fn import_guests(
    store: &dyn GuestStore,
    rows: Vec<NewGuest>,
    now: DateTime<Utc>,
) -> Result<ImportSummary, RsvpError> {
    let mut summary = ImportSummary::default();
    for row in rows {
        let name = row.primary_guest.clone();
        match create_guest(store, row, now) {
            Ok(_) => summary.imported += 1,
            Err(RsvpError::Conflict(detail)) => {
                error!(guest = %name, %detail, "failed to import guest");
                summary.failed += 1;
            }
            Err(e) => return Err(e),
        }
    }
    info!(imported = summary.imported, failed = summary.failed, "guest import completed");
    Ok(summary)
}

/// Look a household up by the code printed on its card.
pub fn find_by_code(store: &dyn GuestStore, raw_code: &str) -> Result<Guest, RsvpError> {
    let code = normalize_code(raw_code).ok_or(RsvpError::InvalidCode)?;
    store.get_guest_by_code(&code)?.ok_or(RsvpError::GuestNotFound)
}
