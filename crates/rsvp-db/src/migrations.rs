use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub const SCHEMA_VERSION: i64 = 1;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_version (
            version     INTEGER PRIMARY KEY,
            applied_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS guests (
            guest_id            TEXT PRIMARY KEY,
            invitation_code     TEXT NOT NULL UNIQUE,
            primary_guest       TEXT NOT NULL,
            household_members   TEXT NOT NULL DEFAULT '[]',
            max_party_size      INTEGER NOT NULL DEFAULT 1,
            email               TEXT,
            phone               TEXT,
            street              TEXT NOT NULL DEFAULT '',
            city                TEXT NOT NULL DEFAULT '',
            state               TEXT NOT NULL DEFAULT '',
            zip                 TEXT NOT NULL DEFAULT '',
            country             TEXT NOT NULL DEFAULT '',
            created_at          TEXT NOT NULL,
            updated_at          TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_guests_created
            ON guests(created_at);

        -- One response per household, enforced by the UNIQUE guest_id.
        CREATE TABLE IF NOT EXISTS rsvps (
            rsvp_id                 TEXT PRIMARY KEY,
            guest_id                TEXT NOT NULL UNIQUE REFERENCES guests(guest_id),
            attending               INTEGER NOT NULL,
            party_size              INTEGER NOT NULL DEFAULT 0,
            attendees               TEXT NOT NULL DEFAULT '[]',
            attendee_names          TEXT NOT NULL DEFAULT '[]',
            dietary_restrictions    TEXT NOT NULL DEFAULT '[]',
            special_requests        TEXT NOT NULL DEFAULT '',
            submitted_at            TEXT NOT NULL,
            updated_at              TEXT NOT NULL,
            ip_address              TEXT,
            user_agent              TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_rsvps_submitted
            ON rsvps(submitted_at);

        CREATE TABLE IF NOT EXISTS admins (
            email           TEXT PRIMARY KEY,
            password_hash   TEXT NOT NULL,
            name            TEXT NOT NULL,
            role            TEXT NOT NULL CHECK (role IN ('admin', 'viewer')),
            created_at      TEXT NOT NULL,
            updated_at      TEXT NOT NULL,
            last_login      TEXT
        );
        ",
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [SCHEMA_VERSION],
    )?;

    info!("Database migrations complete");
    Ok(())
}
