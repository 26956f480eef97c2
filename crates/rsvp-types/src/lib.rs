//! Shared record and wire types for the RSVP service.
//!
//! `models` holds the stored aggregates (guests, RSVPs, admins) and the
//! derived dashboard views; `api` holds the request/response shapes used by
//! the HTTP layer and the admin token claims.

pub mod api;
pub mod models;
