//! Invitation codes and the small parsers shared by guest creation and import.

use rand::Rng;

/// No I, O, 0 or 1: codes are read off printed cards.
pub const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
pub const CODE_LENGTH: usize = 8;

/// Draws a code from the thread-local CSPRNG.
pub fn generate_code() -> String {
    let mut rng = rand::rng();
    (0..CODE_LENGTH)
        .map(|_| CODE_ALPHABET[rng.random_range(0..CODE_ALPHABET.len())] as char)
        .collect()
}

/// Upper-case and check the shape of a code typed by a guest.
pub fn normalize_code(raw: &str) -> Option<String> {
    let code = raw.trim().to_ascii_uppercase();
    let well_formed = code.len() == CODE_LENGTH
        && code.bytes().all(|b| CODE_ALPHABET.contains(&b));
    well_formed.then_some(code)
}

/// Split a `;`-separated household list, dropping blank entries.
pub fn parse_household_members(members: &str) -> Vec<String> {
    members
        .split(';')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

/// Unparsable or non-positive sizes fall back to a party of one.
pub fn parse_max_party_size(raw: &str) -> u32 {
    match raw.trim().parse::<i64>() {
        Ok(n) if n >= 1 => u32::try_from(n).unwrap_or(u32::MAX),
        _ => 1,
    }
}
