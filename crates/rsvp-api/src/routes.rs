use axum::{
    Router, middleware,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::middleware::{require_auth, security_headers};
use crate::state::AppState;
use crate::{admin, auth, rsvp};

pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(rsvp::health))
        .route("/api/rsvp/search", post(rsvp::search))
        .route("/api/rsvp/code/{code}", get(rsvp::lookup_code))
        .route("/api/rsvp/guests/{guest_id}", get(rsvp::lookup_guest))
        .route("/api/rsvp/submit", post(rsvp::submit))
        .route("/api/admin/login", post(auth::login))
        .route("/api/admin/logout", post(auth::logout));

    // Mutating endpoints additionally demand the admin role via `RequireAdmin`.
    let admin_routes = Router::new()
        .route("/api/admin/dashboard", get(admin::dashboard))
        .route("/api/admin/guests", get(admin::list_guests).post(admin::add_guest))
        .route("/api/admin/guests/import", post(admin::import_roster))
        .route("/api/admin/guests/{guest_id}", get(admin::get_guest))
        .route("/api/admin/rsvps/{rsvp_id}", get(admin::get_rsvp))
        .route("/api/admin/export", get(admin::export_csv))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .layer(middleware::from_fn(security_headers))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
