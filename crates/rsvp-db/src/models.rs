//! Database row types. Lists and attendees are stored as JSON text and
//! timestamps as fixed-width RFC 3339 so they sort lexically.

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, SecondsFormat, Utc};
use rsvp_types::models::{Address, AdminRole, AdminUser, Guest, Rsvp};

pub fn format_ts(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Nanos, true)
}

pub fn parse_ts(raw: &str) -> Result<DateTime<Utc>> {
    Ok(DateTime::parse_from_rfc3339(raw)
        .with_context(|| format!("bad timestamp {:?}", raw))?
        .with_timezone(&Utc))
}

pub struct GuestRow {
    pub guest_id: String,
    pub invitation_code: String,
    pub primary_guest: String,
    pub household_members: String,
    pub max_party_size: u32,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<GuestRow> for Guest {
    type Error = anyhow::Error;

    fn try_from(row: GuestRow) -> Result<Self> {
        Ok(Guest {
            household_members: serde_json::from_str(&row.household_members)
                .with_context(|| format!("guest {} household_members", row.guest_id))?,
            created_at: parse_ts(&row.created_at)?,
            updated_at: parse_ts(&row.updated_at)?,
            guest_id: row.guest_id,
            invitation_code: row.invitation_code,
            primary_guest: row.primary_guest,
            max_party_size: row.max_party_size,
            email: row.email,
            phone: row.phone,
            address: Address {
                street: row.street,
                city: row.city,
                state: row.state,
                zip: row.zip,
                country: row.country,
            },
        })
    }
}

pub struct RsvpRow {
    pub rsvp_id: String,
    pub guest_id: String,
    pub attending: bool,
    pub party_size: u32,
    pub attendees: String,
    pub attendee_names: String,
    pub dietary_restrictions: String,
    pub special_requests: String,
    pub submitted_at: String,
    pub updated_at: String,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl TryFrom<RsvpRow> for Rsvp {
    type Error = anyhow::Error;

    fn try_from(row: RsvpRow) -> Result<Self> {
        let ctx = |column: &str| format!("rsvp {} {}", row.rsvp_id, column);
        Ok(Rsvp {
            attendees: serde_json::from_str(&row.attendees).with_context(|| ctx("attendees"))?,
            attendee_names: serde_json::from_str(&row.attendee_names)
                .with_context(|| ctx("attendee_names"))?,
            dietary_restrictions: serde_json::from_str(&row.dietary_restrictions)
                .with_context(|| ctx("dietary_restrictions"))?,
            submitted_at: parse_ts(&row.submitted_at)?,
            updated_at: parse_ts(&row.updated_at)?,
            rsvp_id: row.rsvp_id,
            guest_id: row.guest_id,
            attending: row.attending,
            party_size: row.party_size,
            special_requests: row.special_requests,
            ip_address: row.ip_address,
            user_agent: row.user_agent,
        })
    }
}

pub struct AdminRow {
    pub email: String,
    pub password_hash: String,
    pub name: String,
    pub role: String,
    pub created_at: String,
    pub updated_at: String,
    pub last_login: Option<String>,
}

impl TryFrom<AdminRow> for AdminUser {
    type Error = anyhow::Error;

    fn try_from(row: AdminRow) -> Result<Self> {
        let role: AdminRole = row.role.parse().map_err(|e: String| anyhow!(e))?;
        Ok(AdminUser {
            created_at: parse_ts(&row.created_at)?,
            updated_at: parse_ts(&row.updated_at)?,
            last_login: row.last_login.as_deref().map(parse_ts).transpose()?,
            email: row.email,
            password_hash: row.password_hash,
            name: row.name,
            role,
        })
    }
}
