//! Validation of an incoming submission against the guest's party limit.
//!
//! Rules run in a fixed order and the first failure is reported. A declining
//! household skips every check and always normalizes to an empty party.

use rsvp_types::api::SubmitRsvpRequest;
use rsvp_types::models::Attendee;
use thiserror::Error;

/// Meals offered on the reply card. Comparison is case-insensitive and the
/// stored selection is the case-folded form.
pub const MEAL_OPTIONS: &[&str] = &[
    "Roasted Boneless Chicken Breast",
    "Grilled Brandt Farms 10oz NY Strip",
    "Roasted Cauliflower Al Pastor (GF-V)",
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Guest ID is required")]
    MissingGuestId,

    #[error("Each attending guest must include a name")]
    MissingName,

    #[error("Each attending guest must select a meal")]
    MissingMeal,

    #[error("One or more meal selections are invalid")]
    InvalidMeal,

    #[error("At least one attending guest is required")]
    NoAttendees,

    #[error("Party size must be at least 1")]
    PartySizeTooSmall,

    #[error("Party size exceeds maximum allowed")]
    PartySizeExceedsMaximum,

    #[error("Guest count and party size must match")]
    PartySizeMismatch,

    #[error("Primary guest name is required")]
    MissingPrimaryGuest,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedParty {
    pub attendees: Vec<Attendee>,
    pub party_size: u32,
}

impl ValidatedParty {
    fn declined() -> Self {
        Self {
            attendees: Vec::new(),
            party_size: 0,
        }
    }
}

/// Case-fold a meal and check it against [`MEAL_OPTIONS`].
pub fn canonical_meal(meal: &str) -> Option<String> {
    let folded = meal.trim().to_lowercase();
    MEAL_OPTIONS
        .iter()
        .any(|option| option.to_lowercase() == folded)
        .then_some(folded)
}

pub fn validate_attendees(
    req: &SubmitRsvpRequest,
    max_party_size: u32,
) -> Result<ValidatedParty, ValidationError> {
    if !req.attending {
        return Ok(ValidatedParty::declined());
    }

    let mut attendees = Vec::with_capacity(req.attendees.len());
    for input in &req.attendees {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        if input.meal.trim().is_empty() {
            return Err(ValidationError::MissingMeal);
        }
        let meal = canonical_meal(&input.meal).ok_or(ValidationError::InvalidMeal)?;
        attendees.push(Attendee {
            name: name.to_string(),
            meal,
        });
    }

    // Stale clients post only the flat name list.
    if attendees.is_empty() && !req.attendee_names.is_empty() {
        return Err(ValidationError::MissingMeal);
    }
    if attendees.is_empty() {
        return Err(ValidationError::NoAttendees);
    }

    let count = attendees.len() as i64;
    let requested = match req.party_size {
        None | Some(0) => count,
        Some(n) => n,
    };
    if requested < 1 {
        return Err(ValidationError::PartySizeTooSmall);
    }
    if requested > i64::from(max_party_size) {
        return Err(ValidationError::PartySizeExceedsMaximum);
    }
    if requested != count {
        return Err(ValidationError::PartySizeMismatch);
    }

    let party_size = u32::try_from(requested).map_err(|_| ValidationError::PartySizeExceedsMaximum)?;
    Ok(ValidatedParty {
        attendees,
        party_size,
    })
}
