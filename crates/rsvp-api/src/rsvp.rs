//! Public guest-facing endpoints: find your invitation, then reply.

use std::convert::Infallible;
use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, FromRequestParts, Path, State, rejection::JsonRejection},
    http::{header, request::Parts},
};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::{debug, error};

use rsvp_core::RsvpError;
use rsvp_core::guests::find_by_code;
use rsvp_core::reconcile::{ClientMeta, submit_rsvp};
use rsvp_core::search::search_guests;
use rsvp_types::api::{
    GuestLookupResponse, GuestSummary, RsvpPrefill, SearchRequest, SearchResponse, SubmitRsvpRequest,
    SubmitRsvpResponse,
};

use crate::error::ApiError;
use crate::state::{AppState, run_blocking};

/// Submitter address and user agent. The first `X-Forwarded-For` hop wins
/// over the socket peer, since the service normally sits behind a proxy.
pub struct Client(pub ClientMeta);

impl<S> FromRequestParts<S> for Client
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty())
            .map(str::to_string);

        let ip_address = forwarded.or_else(|| {
            parts
                .extensions
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.to_string())
        });

        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        Ok(Self(ClientMeta {
            ip_address,
            user_agent,
        }))
    }
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn search(
    State(state): State<AppState>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Result<Json<SearchResponse>, ApiError> {
    let Json(req) = payload?;
    if req.name.trim().is_empty() {
        return Err(ApiError::BadRequest("Name is required".into()));
    }

    let guests = state.guests.clone();
    let matches = run_blocking(move || {
        search_guests(guests.as_ref(), &req.name).map_err(|e| {
            error!("guest search failed: {}", e);
            ApiError::from(e)
        })
    })
    .await?;

    debug!(count = matches.len(), "guest search");
    let guests: Vec<GuestSummary> = matches.iter().map(GuestSummary::from).collect();
    Ok(Json(SearchResponse {
        count: guests.len(),
        guests,
    }))
}

pub async fn lookup_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<GuestSummary>, ApiError> {
    let guests = state.guests.clone();
    let guest = run_blocking(move || Ok(find_by_code(guests.as_ref(), &code)?)).await?;
    Ok(Json(GuestSummary::from(&guest)))
}

pub async fn lookup_guest(
    State(state): State<AppState>,
    Path(guest_id): Path<String>,
) -> Result<Json<GuestLookupResponse>, ApiError> {
    let guests = state.guests.clone();
    let rsvps = state.rsvps.clone();
    let (guest, rsvp) = run_blocking(move || {
        let guest = guests.get_guest(&guest_id)?.ok_or(RsvpError::GuestNotFound)?;
        let rsvp = rsvps.get_rsvp_by_guest(&guest_id)?;
        Ok((guest, rsvp))
    })
    .await?;

    Ok(Json(GuestLookupResponse {
        guest: GuestSummary::from(&guest),
        rsvp: rsvp.as_ref().map(RsvpPrefill::from),
    }))
}

pub async fn submit(
    State(state): State<AppState>,
    Client(client): Client,
    payload: Result<Json<SubmitRsvpRequest>, JsonRejection>,
) -> Result<Json<SubmitRsvpResponse>, ApiError> {
    let Json(req) = payload?;

    let guests = state.guests.clone();
    let rsvps = state.rsvps.clone();
    let (_, outcome) = run_blocking(move || {
        submit_rsvp(guests.as_ref(), rsvps.as_ref(), &req, client, Utc::now()).map_err(|e| match e {
            // An unknown guest on submit is a bad form, not a missing page.
            RsvpError::GuestNotFound => ApiError::BadRequest("Guest not found".into()),
            other => ApiError::from(other),
        })
    })
    .await?;

    Ok(Json(SubmitRsvpResponse {
        success: true,
        message: "RSVP submitted successfully".into(),
        attending: outcome.rsvp().attending,
    }))
}
