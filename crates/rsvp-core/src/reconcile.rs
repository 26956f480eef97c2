//! Create-or-update of a household's single RSVP record.
//!
//! The existing record (if any) is looked up by guest id, then exactly one
//! conditional write is issued. Identity and `submitted_at` survive updates;
//! everything else is overwritten. Serialization between concurrent
//! submissions is left to the store's conditional writes.

use chrono::{DateTime, Utc};
use rsvp_types::api::SubmitRsvpRequest;
use rsvp_types::models::{Attendee, Guest, Rsvp};
use tracing::{info, warn};
use uuid::Uuid;

use crate::attendees::{ValidatedParty, ValidationError, validate_attendees};
use crate::error::{RsvpError, StoreError};
use crate::store::{GuestStore, RsvpStore};

/// Who sent the submission.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// A validated response, not yet bound to a record identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsvpDraft {
    pub guest_id: String,
    pub attending: bool,
    pub party_size: u32,
    pub attendees: Vec<Attendee>,
    pub dietary_restrictions: Vec<String>,
    pub special_requests: String,
    pub client: ClientMeta,
}

impl RsvpDraft {
    /// Declining households carry no party details at all.
    pub fn new(
        guest_id: &str,
        req: &SubmitRsvpRequest,
        party: ValidatedParty,
        client: ClientMeta,
    ) -> Self {
        let (dietary_restrictions, special_requests) = if req.attending {
            (
                req.dietary_restrictions
                    .iter()
                    .map(|d| d.trim())
                    .filter(|d| !d.is_empty())
                    .map(str::to_string)
                    .collect(),
                req.special_requests.as_deref().unwrap_or_default().trim().to_string(),
            )
        } else {
            (Vec::new(), String::new())
        };

        Self {
            guest_id: guest_id.to_string(),
            attending: req.attending,
            party_size: party.party_size,
            attendees: party.attendees,
            dietary_restrictions,
            special_requests,
            client,
        }
    }

    fn into_rsvp(self, rsvp_id: String, submitted_at: DateTime<Utc>, now: DateTime<Utc>) -> Rsvp {
        let attendee_names = self.attendees.iter().map(|a| a.name.clone()).collect();
        Rsvp {
            rsvp_id,
            guest_id: self.guest_id,
            attending: self.attending,
            party_size: self.party_size,
            attendees: self.attendees,
            attendee_names,
            dietary_restrictions: self.dietary_restrictions,
            special_requests: self.special_requests,
            submitted_at,
            updated_at: now,
            ip_address: self.client.ip_address,
            user_agent: self.client.user_agent,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciled {
    Created(Rsvp),
    Updated(Rsvp),
}

impl Reconciled {
    pub fn rsvp(&self) -> &Rsvp {
        match self {
            Self::Created(rsvp) | Self::Updated(rsvp) => rsvp,
        }
    }

    pub fn into_rsvp(self) -> Rsvp {
        match self {
            Self::Created(rsvp) | Self::Updated(rsvp) => rsvp,
        }
    }
}

/// One lookup, one conditional write.
pub fn reconcile(
    store: &dyn RsvpStore,
    draft: RsvpDraft,
    now: DateTime<Utc>,
) -> Result<Reconciled, StoreError> {
    match store.get_rsvp_by_guest(&draft.guest_id)? {
        Some(existing) => {
            let rsvp = draft.into_rsvp(existing.rsvp_id, existing.submitted_at, now);
            store.update_rsvp(&rsvp)?;
            Ok(Reconciled::Updated(rsvp))
        }
        None => {
            let rsvp = draft.into_rsvp(Uuid::new_v4().to_string(), now, now);
            store.create_rsvp(&rsvp)?;
            Ok(Reconciled::Created(rsvp))
        }
    }
}

/// Resolve the guest, validate, then reconcile. A lost race is retried once
/// from the lookup before surfacing as `Conflict`.
pub fn submit_rsvp(
    guests: &dyn GuestStore,
    rsvps: &dyn RsvpStore,
    req: &SubmitRsvpRequest,
    client: ClientMeta,
    now: DateTime<Utc>,
) -> Result<(Guest, Reconciled), RsvpError> {
    let guest_id = req.guest_id.trim();
    if guest_id.is_empty() {
        return Err(ValidationError::MissingGuestId.into());
    }

    let guest = guests.get_guest(guest_id)?.ok_or(RsvpError::GuestNotFound)?;
    let party = validate_attendees(req, guest.max_party_size)?;
    let draft = RsvpDraft::new(&guest.guest_id, req, party, client);

    let outcome = match reconcile(rsvps, draft.clone(), now) {
        Err(StoreError::Conflict(detail)) => {
            warn!(guest_id = %guest.guest_id, %detail, "rsvp write lost a race, retrying once");
            reconcile(rsvps, draft, now)?
        }
        other => other?,
    };

    let saved = outcome.rsvp();
    info!(
        guest = %guest.primary_guest,
        attending = saved.attending,
        party_size = saved.party_size,
        created = matches!(outcome, Reconciled::Created(_)),
        "rsvp saved"
    );

    Ok((guest, outcome))
}
