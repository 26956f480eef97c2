use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Mailing address printed on the invitation envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub street: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub city: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub state: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub zip: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub country: String,
}

impl Address {
    pub fn is_empty(&self) -> bool {
        self.street.is_empty()
            && self.city.is_empty()
            && self.state.is_empty()
            && self.zip.is_empty()
            && self.country.is_empty()
    }
}

/// One invited household.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Guest {
    pub guest_id: String,
    pub invitation_code: String,
    pub primary_guest: String,
    #[serde(default)]
    pub household_members: Vec<String>,
    pub max_party_size: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Address::is_empty")]
    pub address: Address,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A named person inside an attending household, paired with a meal choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attendee {
    pub name: String,
    pub meal: String,
}

/// A household's response. At most one exists per guest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rsvp {
    pub rsvp_id: String,
    pub guest_id: String,
    pub attending: bool,
    pub party_size: u32,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    /// Flat name list kept alongside `attendees` for older readers.
    #[serde(default)]
    pub attendee_names: Vec<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub special_requests: String,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdminRole {
    /// Full access, including guest creation and import.
    Admin,
    /// Read-only dashboard access.
    Viewer,
}

impl AdminRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Viewer => "viewer",
        }
    }
}

impl fmt::Display for AdminRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdminRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "admin" => Ok(Self::Admin),
            "viewer" => Ok(Self::Viewer),
            other => Err(format!("invalid role '{}' (must be 'admin' or 'viewer')", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub name: String,
    pub role: AdminRole,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login: Option<DateTime<Utc>>,
}

// -- Dashboard views --

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_invited: usize,
    pub total_households: usize,
    pub total_invited_guests: u64,
    pub total_responses: usize,
    pub total_attending: usize,
    pub total_declined: usize,
    pub total_pending: usize,
    pub response_rate: f64,
    pub attending_guests: u64,
    pub meal_breakdown: BTreeMap<String, usize>,
    pub recent_rsvps: Vec<RecentRsvp>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecentRsvp {
    pub guest_name: String,
    pub attending: bool,
    pub party_size: u32,
    pub submitted_at: DateTime<Utc>,
}

/// A guest joined with its response, if any.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GuestWithRsvp {
    pub guest: Guest,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsvp: Option<Rsvp>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_hash_is_never_serialized() {
        let now = Utc::now();
        let admin = AdminUser {
            email: "host@example.com".into(),
            password_hash: "$argon2id$secret".into(),
            name: "Host".into(),
            role: AdminRole::Viewer,
            created_at: now,
            updated_at: now,
            last_login: None,
        };
        let json = serde_json::to_value(&admin).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["role"], "viewer");
    }

    #[test]
    fn test_guest_omits_empty_contact_details() {
        let now = Utc::now();
        let guest = Guest {
            guest_id: "g1".into(),
            invitation_code: "ABCDEFGH".into(),
            primary_guest: "Maria Lopez".into(),
            household_members: vec![],
            max_party_size: 1,
            email: None,
            phone: None,
            address: Address::default(),
            created_at: now,
            updated_at: now,
        };
        let json = serde_json::to_value(&guest).unwrap();
        assert!(json.get("email").is_none());
        assert!(json.get("address").is_none());

        let back: Guest = serde_json::from_value(json).unwrap();
        assert_eq!(back, guest);
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(" Admin ".parse::<AdminRole>(), Ok(AdminRole::Admin));
        assert!("owner".parse::<AdminRole>().is_err());
    }
}
