//! CSV in and out: the guest roster import and the RSVP export sheet.

use std::collections::HashMap;
use std::io;

use rsvp_types::models::{Address, GuestWithRsvp, Rsvp};
use thiserror::Error;

use crate::guests::{DEFAULT_COUNTRY, NewGuest};
use crate::invite::{parse_household_members, parse_max_party_size};

#[derive(Debug, Error)]
pub enum RosterError {
    #[error("Failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write CSV: {0}")]
    Io(#[from] io::Error),

    #[error("CSV must have a header and at least one data row")]
    Empty,

    #[error("CSV must include primary_guest column")]
    MissingPrimaryGuestColumn,
}

pub const EXPORT_HEADERS: [&str; 10] = [
    "Primary Guest",
    "Email",
    "Invitation Code",
    "Max Party Size",
    "RSVP Status",
    "Attending",
    "Party Size",
    "Attendee Meals",
    "Special Requests",
    "Submitted At",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRoster {
    pub guests: Vec<NewGuest>,
    /// Data rows without a primary guest.
    pub skipped: usize,
}

struct Columns(HashMap<String, usize>);

impl Columns {
    fn cell<'r>(&self, record: &'r csv::StringRecord, column: &str) -> &'r str {
        self.0
            .get(column)
            .and_then(|&idx| record.get(idx))
            .map(str::trim)
            .unwrap_or_default()
    }
}

fn optional(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| value.to_string())
}

/// Columns are located by (case-insensitive) header name, so extra or
/// reordered columns are fine. Only `primary_guest` is required.
pub fn parse_guest_csv<R: io::Read>(reader: R) -> Result<ParsedRoster, RosterError> {
    let mut rdr = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let columns = Columns(
        rdr.headers()?
            .iter()
            .enumerate()
            .map(|(idx, name)| (name.trim().to_lowercase(), idx))
            .filter(|(name, _)| !name.is_empty())
            .collect(),
    );

    let mut rows = 0;
    let mut roster = ParsedRoster {
        guests: Vec::new(),
        skipped: 0,
    };
    for record in rdr.records() {
        let record = record?;
        rows += 1;

        // Checked per row so an empty file reports `Empty` first.
        if !columns.0.contains_key("primary_guest") {
            return Err(RosterError::MissingPrimaryGuestColumn);
        }

        let primary_guest = columns.cell(&record, "primary_guest");
        if primary_guest.is_empty() {
            roster.skipped += 1;
            continue;
        }

        let country = columns.cell(&record, "country");
        roster.guests.push(NewGuest {
            primary_guest: primary_guest.to_string(),
            household_members: parse_household_members(columns.cell(&record, "household_members")),
            max_party_size: parse_max_party_size(columns.cell(&record, "max_party_size")),
            email: optional(columns.cell(&record, "email")),
            phone: optional(columns.cell(&record, "phone")),
            address: Address {
                street: columns.cell(&record, "street").to_string(),
                city: columns.cell(&record, "city").to_string(),
                state: columns.cell(&record, "state").to_string(),
                zip: columns.cell(&record, "zip").to_string(),
                country: if country.is_empty() { DEFAULT_COUNTRY } else { country }.to_string(),
            },
        });
    }

    if rows == 0 {
        return Err(RosterError::Empty);
    }
    Ok(roster)
}

/// `Name (meal); Name (meal)`, falling back to the flat name list for
/// responses recorded before meals were collected.
pub fn format_attendee_meals(rsvp: &Rsvp) -> String {
    if rsvp.attendees.is_empty() {
        return rsvp.attendee_names.join("; ");
    }

    rsvp.attendees
        .iter()
        .filter_map(|a| {
            let name = a.name.trim();
            let meal = a.meal.trim();
            match (name.is_empty(), meal.is_empty()) {
                (true, true) => None,
                (false, true) => Some(name.to_string()),
                (true, false) => Some(meal.to_string()),
                (false, false) => Some(format!("{} ({})", name, meal)),
            }
        })
        .collect::<Vec<_>>()
        .join("; ")
}

pub fn write_export_csv<W: io::Write>(writer: W, rows: &[GuestWithRsvp]) -> Result<(), RosterError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(EXPORT_HEADERS)?;

    for row in rows {
        let guest = &row.guest;
        let mut record = vec![
            guest.primary_guest.clone(),
            guest.email.clone().unwrap_or_default(),
            guest.invitation_code.clone(),
            guest.max_party_size.to_string(),
        ];
        match &row.rsvp {
            Some(rsvp) => record.extend([
                "Responded".to_string(),
                rsvp.attending.to_string(),
                rsvp.party_size.to_string(),
                format_attendee_meals(rsvp),
                rsvp.special_requests.clone(),
                rsvp.submitted_at.format("%Y-%m-%d %H:%M:%S").to_string(),
            ]),
            None => {
                record.push("Pending".to_string());
                record.extend(std::iter::repeat_n(String::new(), 5));
            }
        }
        wtr.write_record(&record)?;
    }

    wtr.flush()?;
    Ok(())
}
