use serde::{Deserialize, Serialize};

use crate::models::{Address, AdminRole, Attendee, Guest, Rsvp};

// -- JWT Claims --

/// Claims carried by the `admin_token` cookie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub name: String,
    pub role: AdminRole,
    pub iss: String,
    pub iat: usize,
    pub nbf: usize,
    pub exp: usize,
}

// -- Errors --

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

// -- Guest search --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SearchRequest {
    pub name: String,
}

/// The public view of a guest: no code, contact details or address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuestSummary {
    pub guest_id: String,
    pub primary_guest: String,
    pub household_members: Vec<String>,
    pub max_party_size: u32,
}

impl From<&Guest> for GuestSummary {
    fn from(guest: &Guest) -> Self {
        Self {
            guest_id: guest.guest_id.clone(),
            primary_guest: guest.primary_guest.clone(),
            household_members: guest.household_members.clone(),
            max_party_size: guest.max_party_size,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub guests: Vec<GuestSummary>,
    pub count: usize,
}

/// The answers a household already gave, without ids, timestamps or
/// submitter metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RsvpPrefill {
    pub attending: bool,
    pub party_size: u32,
    pub attendees: Vec<Attendee>,
    pub dietary_restrictions: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub special_requests: String,
}

impl From<&Rsvp> for RsvpPrefill {
    fn from(rsvp: &Rsvp) -> Self {
        Self {
            attending: rsvp.attending,
            party_size: rsvp.party_size,
            attendees: rsvp.attendees.clone(),
            dietary_restrictions: rsvp.dietary_restrictions.clone(),
            special_requests: rsvp.special_requests.clone(),
        }
    }
}

/// Guest summary plus its existing response, used to pre-fill the form.
#[derive(Debug, Serialize, Deserialize)]
pub struct GuestLookupResponse {
    pub guest: GuestSummary,
    pub rsvp: Option<RsvpPrefill>,
}

// -- RSVP submission --

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AttendeeInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub meal: String,
}

/// Submissions are accepted leniently: older form builds send extra fields
/// and only the flat `attendee_names` list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubmitRsvpRequest {
    #[serde(default)]
    pub guest_id: String,
    pub attending: bool,
    #[serde(default)]
    pub party_size: Option<i64>,
    #[serde(default)]
    pub attendees: Vec<AttendeeInput>,
    #[serde(default)]
    pub attendee_names: Vec<String>,
    #[serde(default)]
    pub special_requests: Option<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitRsvpResponse {
    pub success: bool,
    pub message: String,
    pub attending: bool,
}

// -- Admin auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub email: String,
    pub name: String,
    pub role: AdminRole,
}

// -- Admin guest management --

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateGuestRequest {
    pub primary_guest: String,
    #[serde(default)]
    pub household_members: Vec<String>,
    #[serde(default)]
    pub max_party_size: Option<i64>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Address,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateGuestResponse {
    pub guest_id: String,
    pub invitation_code: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ImportResponse {
    pub imported: usize,
    pub failed: usize,
    pub skipped: usize,
}
