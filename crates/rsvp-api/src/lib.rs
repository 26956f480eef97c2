pub mod admin;
pub mod auth;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod rsvp;
pub mod state;
