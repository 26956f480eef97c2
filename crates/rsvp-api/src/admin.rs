use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
};
use chrono::Utc;
use tracing::{error, info};

use rsvp_core::RsvpError;
use rsvp_core::guests::{NewGuest, create_guest, import_guests};
use rsvp_core::roster::{parse_guest_csv, write_export_csv};
use rsvp_core::stats::{load_dashboard, load_guest_with_rsvp, load_guests_with_rsvps};
use rsvp_types::api::{Claims, CreateGuestRequest, CreateGuestResponse, ImportResponse};
use rsvp_types::models::{DashboardStats, GuestWithRsvp, Rsvp};

use crate::error::ApiError;
use crate::middleware::RequireAdmin;
use crate::state::{AppState, run_blocking};

pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardStats>, ApiError> {
    let guests = state.guests.clone();
    let rsvps = state.rsvps.clone();
    let stats = run_blocking(move || Ok(load_dashboard(guests.as_ref(), rsvps.as_ref())?)).await?;
    Ok(Json(stats))
}

pub async fn list_guests(
    State(state): State<AppState>,
) -> Result<Json<Vec<GuestWithRsvp>>, ApiError> {
    let guests = state.guests.clone();
    let rsvps = state.rsvps.clone();
    let rows =
        run_blocking(move || Ok(load_guests_with_rsvps(guests.as_ref(), rsvps.as_ref())?)).await?;
    Ok(Json(rows))
}

pub async fn get_guest(
    State(state): State<AppState>,
    Path(guest_id): Path<String>,
) -> Result<Json<GuestWithRsvp>, ApiError> {
    let guests = state.guests.clone();
    let rsvps = state.rsvps.clone();
    let row = run_blocking(move || {
        Ok(load_guest_with_rsvp(guests.as_ref(), rsvps.as_ref(), &guest_id)?)
    })
    .await?;
    Ok(Json(row))
}

pub async fn get_rsvp(
    State(state): State<AppState>,
    Path(rsvp_id): Path<String>,
) -> Result<Json<Rsvp>, ApiError> {
    let rsvps = state.rsvps.clone();
    let rsvp = run_blocking(move || Ok(rsvps.get_rsvp(&rsvp_id)?.ok_or(RsvpError::RsvpNotFound)?))
        .await?;
    Ok(Json(rsvp))
}

pub async fn export_csv(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let guests = state.guests.clone();
    let rsvps = state.rsvps.clone();
    let rows =
        run_blocking(move || Ok(load_guests_with_rsvps(guests.as_ref(), rsvps.as_ref())?)).await?;

    let mut body = Vec::new();
    write_export_csv(&mut body, &rows).map_err(|e| {
        error!("failed to write CSV export: {}", e);
        ApiError::Internal
    })?;

    info!(email = %claims.email, rows = rows.len(), "rsvp export generated");

    let disposition = format!(
        "attachment; filename=\"rsvps_{}.csv\"",
        Utc::now().format("%Y-%m-%d")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

pub async fn add_guest(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
    payload: Result<Json<CreateGuestRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(req) = payload?;
    let new = NewGuest::try_from(&req).map_err(RsvpError::from)?;

    let guests = state.guests.clone();
    let guest = run_blocking(move || Ok(create_guest(guests.as_ref(), new, Utc::now())?)).await?;

    info!(email = %claims.email, guest_id = %guest.guest_id, "guest added by admin");
    Ok((
        StatusCode::CREATED,
        Json(CreateGuestResponse {
            guest_id: guest.guest_id,
            invitation_code: guest.invitation_code,
        }),
    ))
}

/// CSV roster in the request body.
pub async fn import_roster(
    State(state): State<AppState>,
    RequireAdmin(claims): RequireAdmin,
    body: String,
) -> Result<Json<ImportResponse>, ApiError> {
    let roster = parse_guest_csv(body.as_bytes())?;
    let skipped = roster.skipped;

    let guests = state.guests.clone();
    let summary =
        run_blocking(move || Ok(import_guests(guests.as_ref(), roster.guests, Utc::now())?)).await?;

    info!(
        email = %claims.email,
        imported = summary.imported,
        failed = summary.failed,
        skipped,
        "guest roster imported"
    );
    Ok(Json(ImportResponse {
        imported: summary.imported,
        failed: summary.failed,
        skipped,
    }))
}
