//! Guest name search.
//!
//! Queries and candidates go through the same [`normalize`] so casing and
//! spacing never affect a match. A candidate matches when it contains the
//! query verbatim, or when every query token is a substring of some candidate
//! token, which lets "jess sahagian" find "Jess & Evan Sahagian".

use rsvp_types::models::Guest;

use crate::error::StoreError;
use crate::store::GuestStore;

/// Lowercase, trim and collapse runs of whitespace to a single space.
pub fn normalize(value: &str) -> String {
    value
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn tokens(value: &str) -> Vec<&str> {
    value
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect()
}

/// `normalized_query` must already have been through [`normalize`].
pub fn text_matches(candidate: &str, normalized_query: &str) -> bool {
    let candidate = normalize(candidate);
    if candidate.is_empty() || normalized_query.is_empty() {
        return false;
    }

    if candidate.contains(normalized_query) {
        return true;
    }

    let candidate_tokens = tokens(&candidate);
    let query_tokens = tokens(normalized_query);
    if candidate_tokens.is_empty() || query_tokens.is_empty() {
        return false;
    }

    query_tokens
        .iter()
        .all(|q| candidate_tokens.iter().any(|c| c.contains(q)))
}

/// Primary name first, then each household member.
pub fn guest_matches(guest: Option<&Guest>, normalized_query: &str) -> bool {
    let Some(guest) = guest else {
        return false;
    };

    text_matches(&guest.primary_guest, normalized_query)
        || guest
            .household_members
            .iter()
            .any(|member| text_matches(member, normalized_query))
}

/// Full scan of the guest collection. A blank query matches nothing.
pub fn search_guests(store: &dyn GuestStore, name: &str) -> Result<Vec<Guest>, StoreError> {
    let query = normalize(name);
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let matches = store
        .list_guests()?
        .into_iter()
        .filter(|guest| guest_matches(Some(guest), &query))
        .collect();

    Ok(matches)
}
