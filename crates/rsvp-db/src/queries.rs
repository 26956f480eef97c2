use crate::Database;
use crate::models::{AdminRow, GuestRow, RsvpRow, format_ts};
use anyhow::Result;
use chrono::{DateTime, Utc};
use rsvp_core::{AdminStore, GuestStore, RsvpStore, StoreError};
use rsvp_types::models::{AdminUser, Guest, Rsvp};
use rusqlite::{Connection, ErrorCode, Row, params};

const GUEST_COLUMNS: &str = "guest_id, invitation_code, primary_guest, household_members, \
     max_party_size, email, phone, street, city, state, zip, country, created_at, updated_at";

const RSVP_COLUMNS: &str = "rsvp_id, guest_id, attending, party_size, attendees, attendee_names, \
     dietary_restrictions, special_requests, submitted_at, updated_at, ip_address, user_agent";

const ADMIN_COLUMNS: &str =
    "email, password_hash, name, role, created_at, updated_at, last_login";

impl Database {
    // -- Guests --

    pub fn insert_guest(&self, guest: &Guest) -> Result<()> {
        let household = serde_json::to_string(&guest.household_members)?;
        self.with_conn(|conn| {
            conn.execute(
                &format!(
                    "INSERT INTO guests ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
                    GUEST_COLUMNS
                ),
                params![
                    guest.guest_id,
                    guest.invitation_code,
                    guest.primary_guest,
                    household,
                    guest.max_party_size,
                    guest.email,
                    guest.phone,
                    guest.address.street,
                    guest.address.city,
                    guest.address.state,
                    guest.address.zip,
                    guest.address.country,
                    format_ts(guest.created_at),
                    format_ts(guest.updated_at),
                ],
            )?;
            Ok(())
        })
    }

    pub fn guest_by(&self, key: GuestKey, value: &str) -> Result<Option<Guest>> {
        self.with_conn(|conn| query_guest(conn, key, value))?
            .map(Guest::try_from)
            .transpose()
    }

    pub fn all_guests(&self) -> Result<Vec<Guest>> {
        let rows = self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM guests ORDER BY created_at, guest_id",
                GUEST_COLUMNS
            ))?;
            let rows = stmt
                .query_map([], guest_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;
        rows.into_iter().map(Guest::try_from).collect()
    }

    // -- RSVPs --

    pub fn insert_rsvp(&self, rsvp: &Rsvp) -> Result<()> {
        let attendees = serde_json::to_string(&rsvp.attendees)?;
        let names = serde_json::to_string(&rsvp.attendee_names)?;
        let dietary = serde_json::to_string(&rsvp.dietary_restrictions)?;
        self.with_conn(|conn| {
            conn.execute(
                &format!(
                    "INSERT INTO rsvps ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                    RSVP_COLUMNS
                ),
                params![
                    rsvp.rsvp_id,
                    rsvp.guest_id,
                    rsvp.attending,
                    rsvp.party_size,
                    attendees,
                    names,
                    dietary,
                    rsvp.special_requests,
                    format_ts(rsvp.submitted_at),
                    format_ts(rsvp.updated_at),
                    rsvp.ip_address,
                    rsvp.user_agent,
                ],
            )?;
            Ok(())
        })
    }

    /// Overwrites the mutable fields of an existing response. Returns the
    /// number of rows touched: 0 means the record is gone.
    pub fn overwrite_rsvp(&self, rsvp: &Rsvp) -> Result<usize> {
        let attendees = serde_json::to_string(&rsvp.attendees)?;
        let names = serde_json::to_string(&rsvp.attendee_names)?;
        let dietary = serde_json::to_string(&rsvp.dietary_restrictions)?;
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE rsvps SET
                    attending = ?3, party_size = ?4, attendees = ?5, attendee_names = ?6,
                    dietary_restrictions = ?7, special_requests = ?8, submitted_at = ?9,
                    updated_at = ?10, ip_address = ?11, user_agent = ?12
                 WHERE rsvp_id = ?1 AND guest_id = ?2",
                params![
                    rsvp.rsvp_id,
                    rsvp.guest_id,
                    rsvp.attending,
                    rsvp.party_size,
                    attendees,
                    names,
                    dietary,
                    rsvp.special_requests,
                    format_ts(rsvp.submitted_at),
                    format_ts(rsvp.updated_at),
                    rsvp.ip_address,
                    rsvp.user_agent,
                ],
            )?;
            Ok(changed)
        })
    }

    pub fn rsvp_by(&self, key: RsvpKey, value: &str) -> Result<Option<Rsvp>> {
        self.with_conn(|conn| query_rsvp(conn, key, value))?
            .map(Rsvp::try_from)
            .transpose()
    }

    pub fn all_rsvps(&self) -> Result<Vec<Rsvp>> {
        let rows = self.with_conn(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM rsvps ORDER BY submitted_at, rsvp_id",
                RSVP_COLUMNS
            ))?;
            let rows = stmt
                .query_map([], rsvp_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })?;
        rows.into_iter().map(Rsvp::try_from).collect()
    }

    // -- Admins --

    pub fn insert_admin(&self, admin: &AdminUser) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                &format!("INSERT INTO admins ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)", ADMIN_COLUMNS),
                params![
                    admin.email,
                    admin.password_hash,
                    admin.name,
                    admin.role.as_str(),
                    format_ts(admin.created_at),
                    format_ts(admin.updated_at),
                    admin.last_login.map(format_ts),
                ],
            )?;
            Ok(())
        })
    }

    pub fn admin_by_email(&self, email: &str) -> Result<Option<AdminUser>> {
        self.with_conn(|conn| {
            conn.query_row(
                &format!("SELECT {} FROM admins WHERE email = ?1", ADMIN_COLUMNS),
                [email],
                admin_row,
            )
            .optional()
        })?
        .map(AdminUser::try_from)
        .transpose()
    }

    pub fn touch_admin_login(&self, email: &str, at: DateTime<Utc>) -> Result<usize> {
        self.with_conn(|conn| {
            let changed = conn.execute(
                "UPDATE admins SET last_login = ?2, updated_at = ?2 WHERE email = ?1",
                params![email, format_ts(at)],
            )?;
            Ok(changed)
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub enum GuestKey {
    Id,
    Code,
}

impl GuestKey {
    fn column(self) -> &'static str {
        match self {
            Self::Id => "guest_id",
            Self::Code => "invitation_code",
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub enum RsvpKey {
    Id,
    Guest,
}

impl RsvpKey {
    fn column(self) -> &'static str {
        match self {
            Self::Id => "rsvp_id",
            Self::Guest => "guest_id",
        }
    }
}

fn guest_row(row: &Row) -> rusqlite::Result<GuestRow> {
    Ok(GuestRow {
        guest_id: row.get(0)?,
        invitation_code: row.get(1)?,
        primary_guest: row.get(2)?,
        household_members: row.get(3)?,
        max_party_size: row.get(4)?,
        email: row.get(5)?,
        phone: row.get(6)?,
        street: row.get(7)?,
        city: row.get(8)?,
        state: row.get(9)?,
        zip: row.get(10)?,
        country: row.get(11)?,
        created_at: row.get(12)?,
        updated_at: row.get(13)?,
    })
}

fn rsvp_row(row: &Row) -> rusqlite::Result<RsvpRow> {
    Ok(RsvpRow {
        rsvp_id: row.get(0)?,
        guest_id: row.get(1)?,
        attending: row.get(2)?,
        party_size: row.get(3)?,
        attendees: row.get(4)?,
        attendee_names: row.get(5)?,
        dietary_restrictions: row.get(6)?,
        special_requests: row.get(7)?,
        submitted_at: row.get(8)?,
        updated_at: row.get(9)?,
        ip_address: row.get(10)?,
        user_agent: row.get(11)?,
    })
}

fn admin_row(row: &Row) -> rusqlite::Result<AdminRow> {
    Ok(AdminRow {
        email: row.get(0)?,
        password_hash: row.get(1)?,
        name: row.get(2)?,
        role: row.get(3)?,
        created_at: row.get(4)?,
        updated_at: row.get(5)?,
        last_login: row.get(6)?,
    })
}

fn query_guest(conn: &Connection, key: GuestKey, value: &str) -> Result<Option<GuestRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM guests WHERE {} = ?1",
        GUEST_COLUMNS,
        key.column()
    ))?;
    stmt.query_row([value], guest_row).optional()
}

fn query_rsvp(conn: &Connection, key: RsvpKey, value: &str) -> Result<Option<RsvpRow>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM rsvps WHERE {} = ?1",
        RSVP_COLUMNS,
        key.column()
    ))?;
    stmt.query_row([value], rsvp_row).optional()
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

/// UNIQUE, CHECK and foreign-key failures are lost conditional writes;
/// anything else means the database itself is in trouble.
fn store_error(err: anyhow::Error) -> StoreError {
    let constraint = err
        .downcast_ref::<rusqlite::Error>()
        .and_then(rusqlite::Error::sqlite_error_code)
        == Some(ErrorCode::ConstraintViolation);
    if constraint {
        StoreError::Conflict(err.to_string())
    } else {
        StoreError::Unavailable(err)
    }
}

impl GuestStore for Database {
    fn get_guest(&self, guest_id: &str) -> Result<Option<Guest>, StoreError> {
        self.guest_by(GuestKey::Id, guest_id).map_err(store_error)
    }

    fn get_guest_by_code(&self, code: &str) -> Result<Option<Guest>, StoreError> {
        self.guest_by(GuestKey::Code, code).map_err(store_error)
    }

    fn create_guest(&self, guest: &Guest) -> Result<(), StoreError> {
        self.insert_guest(guest).map_err(store_error)
    }

    fn list_guests(&self) -> Result<Vec<Guest>, StoreError> {
        self.all_guests().map_err(store_error)
    }
}

impl RsvpStore for Database {
    fn get_rsvp(&self, rsvp_id: &str) -> Result<Option<Rsvp>, StoreError> {
        self.rsvp_by(RsvpKey::Id, rsvp_id).map_err(store_error)
    }

    fn get_rsvp_by_guest(&self, guest_id: &str) -> Result<Option<Rsvp>, StoreError> {
        self.rsvp_by(RsvpKey::Guest, guest_id).map_err(store_error)
    }

    fn create_rsvp(&self, rsvp: &Rsvp) -> Result<(), StoreError> {
        self.insert_rsvp(rsvp).map_err(store_error)
    }

    fn update_rsvp(&self, rsvp: &Rsvp) -> Result<(), StoreError> {
        match self.overwrite_rsvp(rsvp).map_err(store_error)? {
            0 => Err(StoreError::Conflict(format!("rsvp {} no longer exists", rsvp.rsvp_id))),
            _ => Ok(()),
        }
    }

    fn list_rsvps(&self) -> Result<Vec<Rsvp>, StoreError> {
        self.all_rsvps().map_err(store_error)
    }
}

impl AdminStore for Database {
    fn get_admin(&self, email: &str) -> Result<Option<AdminUser>, StoreError> {
        self.admin_by_email(email).map_err(store_error)
    }

    fn create_admin(&self, admin: &AdminUser) -> Result<(), StoreError> {
        self.insert_admin(admin).map_err(store_error)
    }

    fn record_login(&self, email: &str, at: DateTime<Utc>) -> Result<(), StoreError> {
        match self.touch_admin_login(email, at).map_err(store_error)? {
            0 => Err(StoreError::Conflict(format!("admin {} does not exist", email))),
            _ => Ok(()),
        }
    }
}
