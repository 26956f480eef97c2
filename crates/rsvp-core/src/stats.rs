//! Dashboard figures, folded over the full guest and RSVP collections.

use std::collections::{BTreeMap, HashMap};

use rsvp_types::models::{DashboardStats, Guest, GuestWithRsvp, RecentRsvp, Rsvp};

use crate::error::{RsvpError, StoreError};
use crate::store::{GuestStore, RsvpStore};

pub const RECENT_RSVP_LIMIT: usize = 10;

/// Invited head-count for one household. Legacy rows without a usable
/// party size count the primary guest plus each listed member.
fn invited_count(guest: &Guest) -> u64 {
    if guest.max_party_size > 0 {
        u64::from(guest.max_party_size)
    } else {
        guest.household_members.len() as u64 + 1
    }
}

pub fn dashboard_stats(guests: &[Guest], rsvps: &[Rsvp]) -> DashboardStats {
    let households = guests.len();
    let mut stats = DashboardStats {
        total_invited: households,
        total_households: households,
        total_invited_guests: guests.iter().map(invited_count).sum(),
        total_responses: rsvps.len(),
        ..Default::default()
    };

    let mut meals: BTreeMap<String, usize> = BTreeMap::new();
    for rsvp in rsvps {
        if !rsvp.attending {
            stats.total_declined += 1;
            continue;
        }
        stats.total_attending += 1;
        stats.attending_guests += u64::from(rsvp.party_size);
        for attendee in &rsvp.attendees {
            let meal = attendee.meal.trim().to_lowercase();
            if !meal.is_empty() {
                *meals.entry(meal).or_default() += 1;
            }
        }
    }
    stats.meal_breakdown = meals;

    stats.total_pending = households.saturating_sub(stats.total_responses);
    if households > 0 {
        stats.response_rate = stats.total_responses as f64 / households as f64 * 100.0;
    }

    let by_id: HashMap<&str, &Guest> = guests.iter().map(|g| (g.guest_id.as_str(), g)).collect();
    stats.recent_rsvps = recent_rsvps(rsvps, &by_id, RECENT_RSVP_LIMIT);

    stats
}

/// Newest first. Responses whose guest is gone are skipped.
pub fn recent_rsvps(
    rsvps: &[Rsvp],
    guests: &HashMap<&str, &Guest>,
    limit: usize,
) -> Vec<RecentRsvp> {
    let mut sorted: Vec<&Rsvp> = rsvps.iter().collect();
    sorted.sort_by(|a, b| b.submitted_at.cmp(&a.submitted_at));

    sorted
        .into_iter()
        .filter_map(|rsvp| {
            guests.get(rsvp.guest_id.as_str()).map(|guest| RecentRsvp {
                guest_name: guest.primary_guest.clone(),
                attending: rsvp.attending,
                party_size: rsvp.party_size,
                submitted_at: rsvp.submitted_at,
            })
        })
        .take(limit)
        .collect()
}

/// Every guest, in store order, with its response attached when there is one.
pub fn join_guests_with_rsvps(guests: Vec<Guest>, rsvps: Vec<Rsvp>) -> Vec<GuestWithRsvp> {
    let mut by_guest: HashMap<String, Rsvp> = rsvps
        .into_iter()
        .map(|rsvp| (rsvp.guest_id.clone(), rsvp))
        .collect();

    guests
        .into_iter()
        .map(|guest| {
            let rsvp = by_guest.remove(&guest.guest_id);
            GuestWithRsvp { guest, rsvp }
        })
        .collect()
}

pub fn load_dashboard(
    guests: &dyn GuestStore,
    rsvps: &dyn RsvpStore,
) -> Result<DashboardStats, StoreError> {
    let all_guests = guests.list_guests()?;
    let all_rsvps = rsvps.list_rsvps()?;
    Ok(dashboard_stats(&all_guests, &all_rsvps))
}

pub fn load_guests_with_rsvps(
    guests: &dyn GuestStore,
    rsvps: &dyn RsvpStore,
) -> Result<Vec<GuestWithRsvp>, StoreError> {
    Ok(join_guests_with_rsvps(guests.list_guests()?, rsvps.list_rsvps()?))
}

pub fn load_guest_with_rsvp(
    guests: &dyn GuestStore,
    rsvps: &dyn RsvpStore,
    guest_id: &str,
) -> Result<GuestWithRsvp, RsvpError> {
    let guest = guests.get_guest(guest_id)?.ok_or(RsvpError::GuestNotFound)?;
    let rsvp = rsvps.get_rsvp_by_guest(guest_id)?;
    Ok(GuestWithRsvp { guest, rsvp })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use rsvp_types::models::{Address, Attendee};

    fn guest(id: &str, name: &str, max: u32, household: usize) -> Guest {
        let now = Utc::now();
        Guest {
            guest_id: id.to_string(),
            invitation_code: format!("{:A>8}", id),
            primary_guest: name.to_string(),
            household_members: (0..household).map(|i| format!("member {}", i)).collect(),
            max_party_size: max,
            email: None,
            phone: None,
            address: Address::default(),
            created_at: now,
            updated_at: now,
        }
    }

    fn rsvp(guest_id: &str, attending: bool, meals: &[&str], at: DateTime<Utc>) -> Rsvp {
        let attendees: Vec<Attendee> = meals
            .iter()
            .enumerate()
            .map(|(i, meal)| Attendee {
                name: format!("attendee {}", i),
                meal: meal.to_string(),
            })
            .collect();
        Rsvp {
            rsvp_id: format!("r-{}", guest_id),
            guest_id: guest_id.to_string(),
            attending,
            party_size: attendees.len() as u32,
            attendee_names: attendees.iter().map(|a| a.name.clone()).collect(),
            attendees,
            dietary_restrictions: vec![],
            special_requests: String::new(),
            submitted_at: at,
            updated_at: at,
            ip_address: None,
            user_agent: None,
        }
    }

    #[test]
    fn test_dashboard_totals() {
        let now = Utc::now();
        let guests = vec![guest("g1", "One", 1, 0), guest("g2", "Two", 2, 1), guest("g3", "Four", 4, 3)];
        let rsvps = vec![
            rsvp("g2", true, &["Steak", " steak "], now),
            rsvp("g3", false, &[], now - Duration::hours(1)),
        ];

        let stats = dashboard_stats(&guests, &rsvps);
        assert_eq!(stats.total_households, 3);
        assert_eq!(stats.total_invited, 3);
        assert_eq!(stats.total_invited_guests, 7);
        assert_eq!(stats.total_responses, 2);
        assert_eq!(stats.total_attending, 1);
        assert_eq!(stats.attending_guests, 2);
        assert_eq!(stats.total_declined, 1);
        assert_eq!(stats.total_pending, 1);
        assert!((stats.response_rate - 200.0 / 3.0).abs() < 1e-9);
        assert_eq!(stats.meal_breakdown.get("steak"), Some(&2));
        assert_eq!(stats.meal_breakdown.len(), 1);

        let names: Vec<_> = stats.recent_rsvps.iter().map(|r| r.guest_name.as_str()).collect();
        assert_eq!(names, vec!["Two", "Four"]);
    }

    #[test]
    fn test_empty_collections() {
        let stats = dashboard_stats(&[], &[]);
        assert_eq!(stats.response_rate, 0.0);
        assert_eq!(stats.total_pending, 0);
        assert!(stats.recent_rsvps.is_empty());
    }

    #[test]
    fn test_malformed_party_size_falls_back_to_household() {
        let guests = vec![guest("g1", "Legacy", 0, 2), guest("g2", "Normal", 3, 0)];
        assert_eq!(dashboard_stats(&guests, &[]).total_invited_guests, 6);
    }

    #[test]
    fn test_recent_rsvps_limit_and_orphans() {
        let base = Utc::now();
        let mut guests = Vec::new();
        let mut rsvps = Vec::new();
        for i in 0..12 {
            let id = format!("g{}", i);
            guests.push(guest(&id, &format!("Guest {}", i), 2, 0));
            rsvps.push(rsvp(&id, i % 2 == 0, &[], base + Duration::minutes(i)));
        }
        // Newest response belongs to a guest that no longer exists.
        rsvps.push(rsvp("ghost", true, &[], base + Duration::hours(1)));

        let stats = dashboard_stats(&guests, &rsvps);
        assert_eq!(stats.recent_rsvps.len(), RECENT_RSVP_LIMIT);
        assert_eq!(stats.recent_rsvps[0].guest_name, "Guest 11");
        assert_eq!(stats.recent_rsvps[9].guest_name, "Guest 2");
        assert!(stats.recent_rsvps.iter().all(|r| r.guest_name != "ghost"));
    }

    #[test]
    fn test_join_guests_with_rsvps() {
        let now = Utc::now();
        let joined = join_guests_with_rsvps(
            vec![guest("g1", "One", 1, 0), guest("g2", "Two", 2, 0)],
            vec![rsvp("g2", false, &[], now), rsvp("ghost", true, &[], now)],
        );
        assert_eq!(joined.len(), 2);
        assert!(joined[0].rsvp.is_none());
        assert_eq!(joined[1].rsvp.as_ref().map(|r| r.guest_id.as_str()), Some("g2"));
    }
}
