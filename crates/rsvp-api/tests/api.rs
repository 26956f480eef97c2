use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{HeaderMap, Request, StatusCode, header},
};
use chrono::Utc;
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use rsvp_api::auth::hash_password;
use rsvp_api::config::Config;
use rsvp_api::routes::router;
use rsvp_api::state::AppStateInner;
use rsvp_core::guests::{NewGuest, create_guest};
use rsvp_core::memory::MemoryStore;
use rsvp_core::{AdminStore, RsvpStore};
use rsvp_types::models::{Address, AdminRole, AdminUser, Guest};

const CHICKEN: &str = "Roasted Boneless Chicken Breast";
const STEAK: &str = "Grilled Brandt Farms 10oz NY Strip";

struct TestApp {
    app: Router,
    store: Arc<MemoryStore>,
    sahagians: Guest,
    maria: Guest,
}

fn config() -> Config {
    Config {
        host: "127.0.0.1".into(),
        port: 0,
        db_path: PathBuf::from(":memory:"),
        jwt_secret: "integration-test-secret".into(),
        token_ttl_hours: 24,
        admin_whitelist: vec!["host@example.com".into(), "viewer@example.com".into()],
    }
}

fn household(name: &str, members: &[&str], max: u32) -> NewGuest {
    NewGuest {
        primary_guest: name.into(),
        household_members: members.iter().map(|m| m.to_string()).collect(),
        max_party_size: max,
        email: None,
        phone: None,
        address: Address::default(),
    }
}

fn seed_admin(store: &MemoryStore, email: &str, role: AdminRole) {
    let now = Utc::now();
    store
        .create_admin(&AdminUser {
            email: email.into(),
            password_hash: hash_password("wedding-password").unwrap(),
            name: "Host".into(),
            role,
            created_at: now,
            updated_at: now,
            last_login: None,
        })
        .unwrap();
}

fn setup() -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let now = Utc::now();
    let sahagians = create_guest(
        store.as_ref(),
        household("Jess & Evan Sahagian", &["Jess Sahagian", "Evan Sahagian"], 2),
        now,
    )
    .unwrap();
    let maria = create_guest(store.as_ref(), household("Maria Lopez", &[], 1), now).unwrap();

    let app = router(AppStateInner::new(store.clone(), config()));
    TestApp {
        app,
        store,
        sahagians,
        maria,
    }
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let headers = resp.headers().clone();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, headers, body)
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn with_cookie(mut req: Request<Body>, cookie: &str) -> Request<Body> {
    req.headers_mut()
        .insert(header::COOKIE, cookie.parse().unwrap());
    req
}

async fn login(app: &Router, email: &str) -> String {
    let (status, headers, body) = send(
        app,
        post_json(
            "/api/admin/login",
            json!({ "email": email, "password": "wedding-password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {}", body);

    let set_cookie = headers.get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Strict"));
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn test_health_carries_security_headers() {
    let t = setup();
    let (status, headers, body) = send(&t.app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(headers.get("x-frame-options").unwrap(), "DENY");
    assert_eq!(headers.get("x-content-type-options").unwrap(), "nosniff");
    assert!(headers.get("content-security-policy").is_some());
}

#[tokio::test]
async fn test_search_by_partial_name() {
    let t = setup();
    let (status, _, body) = send(&t.app, post_json("/api/rsvp/search", json!({ "name": "evan" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["guests"][0]["primary_guest"], "Jess & Evan Sahagian");
    assert_eq!(body["guests"][0]["guest_id"], t.sahagians.guest_id.as_str());
    // Summaries never expose the invitation code.
    assert!(body["guests"][0].get("invitation_code").is_none());

    let (status, _, body) = send(&t.app, post_json("/api/rsvp/search", json!({ "name": "  " }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Name is required");

    let (status, _, body) = send(&t.app, post_json("/api/rsvp/search", json!({ "nom": "x" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid request format");
}

#[tokio::test]
async fn test_lookup_by_code() {
    let t = setup();
    let code = t.maria.invitation_code.to_lowercase();
    let (status, _, body) = send(&t.app, get(&format!("/api/rsvp/code/{}", code))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["primary_guest"], "Maria Lopez");

    let (status, _, body) = send(&t.app, get("/api/rsvp/code/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Invalid invitation code");
}

#[tokio::test]
async fn test_submit_then_decline_keeps_submitted_at() {
    let t = setup();
    let guest_id = t.sahagians.guest_id.as_str();

    let mut attend = post_json(
        "/api/rsvp/submit",
        json!({
            "guest_id": guest_id,
            "attending": true,
            "attendees": [
                { "name": "Jess Sahagian", "meal": CHICKEN },
                { "name": "Evan Sahagian", "meal": STEAK },
            ],
            "special_requests": "Near the dance floor",
        }),
    );
    attend
        .headers_mut()
        .insert("x-forwarded-for", "198.51.100.4, 10.0.0.1".parse().unwrap());
    let (status, _, body) = send(&t.app, attend).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["success"], true);
    assert_eq!(body["attending"], true);

    let stored = t.store.get_rsvp_by_guest(guest_id).unwrap().unwrap();
    assert_eq!(stored.party_size, 2);
    assert_eq!(stored.attendees[1].meal, STEAK.to_lowercase());
    assert_eq!(stored.ip_address.as_deref(), Some("198.51.100.4"));

    let (_, _, prefill) = send(&t.app, get(&format!("/api/rsvp/guests/{}", guest_id))).await;
    assert_eq!(prefill["rsvp"]["attending"], true);
    assert_eq!(prefill["rsvp"]["party_size"], 2);

    let (status, _, body) = send(
        &t.app,
        post_json(
            "/api/rsvp/submit",
            json!({ "guest_id": guest_id, "attending": false, "special_requests": "So sorry" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["attending"], false);

    let (_, _, prefill) = send(&t.app, get(&format!("/api/rsvp/guests/{}", guest_id))).await;
    let rsvp = &prefill["rsvp"];
    assert_eq!(rsvp["attending"], false);
    assert_eq!(rsvp["party_size"], 0);
    assert_eq!(rsvp["attendees"], json!([]));
    assert!(rsvp.get("special_requests").is_none());
    let declined = t.store.get_rsvp_by_guest(guest_id).unwrap().unwrap();
    assert_eq!(declined.submitted_at, stored.submitted_at);
    assert_eq!(declined.rsvp_id, stored.rsvp_id);
    assert_eq!(t.store.list_rsvps().unwrap().len(), 1);
}

#[tokio::test]
async fn test_prefill_hides_submitter_metadata() {
    let t = setup();
    let guest_id = t.maria.guest_id.as_str();

    let mut attend = post_json(
        "/api/rsvp/submit",
        json!({
            "guest_id": guest_id,
            "attending": true,
            "attendees": [{ "name": "Maria Lopez", "meal": CHICKEN }],
            "dietary_restrictions": ["shellfish allergy"],
        }),
    );
    attend
        .headers_mut()
        .insert("x-forwarded-for", "198.51.100.77".parse().unwrap());
    attend
        .headers_mut()
        .insert(header::USER_AGENT, "Maria-Phone/1.0".parse().unwrap());
    let (status, _, body) = send(&t.app, attend).await;
    assert_eq!(status, StatusCode::OK, "{}", body);

    let stored = t.store.get_rsvp_by_guest(guest_id).unwrap().unwrap();
    assert_eq!(stored.ip_address.as_deref(), Some("198.51.100.77"));
    assert_eq!(stored.user_agent.as_deref(), Some("Maria-Phone/1.0"));

    let (status, _, prefill) = send(&t.app, get(&format!("/api/rsvp/guests/{}", guest_id))).await;
    assert_eq!(status, StatusCode::OK);
    let rsvp = prefill["rsvp"].as_object().unwrap();
    for hidden in ["ip_address", "user_agent", "rsvp_id", "submitted_at", "updated_at"] {
        assert!(!rsvp.contains_key(hidden), "{} leaked: {}", hidden, prefill);
    }
    assert_eq!(rsvp["attendees"][0]["name"], "Maria Lopez");
    assert_eq!(rsvp["dietary_restrictions"], json!(["shellfish allergy"]));
    assert!(!prefill.to_string().contains("198.51.100.77"));
}

#[tokio::test]
async fn test_submit_rejections() {
    let t = setup();

    let (status, _, body) = send(
        &t.app,
        post_json(
            "/api/rsvp/submit",
            json!({
                "guest_id": t.maria.guest_id,
                "attending": true,
                "attendees": [
                    { "name": "Maria Lopez", "meal": CHICKEN },
                    { "name": "Plus One", "meal": CHICKEN },
                ],
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Party size exceeds maximum allowed");

    let (status, _, body) = send(
        &t.app,
        post_json(
            "/api/rsvp/submit",
            json!({ "guest_id": t.maria.guest_id, "attending": true, "attendees": [] }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "At least one attending guest is required");

    let (status, _, body) = send(
        &t.app,
        post_json("/api/rsvp/submit", json!({ "guest_id": "missing", "attending": false })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Guest not found");

    let (status, _, _) = send(&t.app, get("/api/rsvp/guests/missing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(t.store.list_rsvps().unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_requires_login() {
    let t = setup();
    seed_admin(&t.store, "host@example.com", AdminRole::Admin);

    let (status, _, body) = send(&t.app, get("/api/admin/dashboard")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Authentication required");

    let (status, _, _) = send(
        &t.app,
        with_cookie(get("/api/admin/dashboard"), "admin_token=forged"),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Wrong password and non-whitelisted email look the same.
    let (status, _, wrong) = send(
        &t.app,
        post_json("/api/admin/login", json!({ "email": "host@example.com", "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _, unlisted) = send(
        &t.app,
        post_json(
            "/api/admin/login",
            json!({ "email": "stranger@example.com", "password": "wedding-password" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, unlisted);
}

#[tokio::test]
async fn test_admin_dashboard_and_guest_views() {
    let t = setup();
    seed_admin(&t.store, "host@example.com", AdminRole::Admin);
    let cookie = login(&t.app, "HOST@example.com").await;
    assert!(t.store.get_admin("host@example.com").unwrap().unwrap().last_login.is_some());

    send(
        &t.app,
        post_json(
            "/api/rsvp/submit",
            json!({
                "guest_id": t.sahagians.guest_id,
                "attending": true,
                "attendees": [{ "name": "Jess", "meal": CHICKEN }, { "name": "Evan", "meal": CHICKEN }],
            }),
        ),
    )
    .await;

    let (status, _, stats) = send(&t.app, with_cookie(get("/api/admin/dashboard"), &cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_households"], 2);
    assert_eq!(stats["total_invited_guests"], 3);
    assert_eq!(stats["total_attending"], 1);
    assert_eq!(stats["attending_guests"], 2);
    assert_eq!(stats["total_pending"], 1);
    assert_eq!(stats["meal_breakdown"][CHICKEN.to_lowercase()], 2);
    assert_eq!(stats["recent_rsvps"][0]["guest_name"], "Jess & Evan Sahagian");

    let (status, _, rows) = send(&t.app, with_cookie(get("/api/admin/guests"), &cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows.as_array().unwrap().len(), 2);

    let (_, _, one) = send(
        &t.app,
        with_cookie(get(&format!("/api/admin/guests/{}", t.sahagians.guest_id)), &cookie),
    )
    .await;
    assert_eq!(one["guest"]["invitation_code"], t.sahagians.invitation_code.as_str());
    let rsvp_id = one["rsvp"]["rsvp_id"].as_str().unwrap().to_string();

    let (status, _, rsvp) = send(
        &t.app,
        with_cookie(get(&format!("/api/admin/rsvps/{}", rsvp_id)), &cookie),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rsvp["party_size"], 2);

    let (status, _, _) = send(&t.app, with_cookie(get("/api/admin/rsvps/unknown"), &cookie)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_viewer_cannot_manage_guests() {
    let t = setup();
    seed_admin(&t.store, "viewer@example.com", AdminRole::Viewer);
    let cookie = login(&t.app, "viewer@example.com").await;

    let (status, _, _) = send(&t.app, with_cookie(get("/api/admin/dashboard"), &cookie)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, body) = send(
        &t.app,
        with_cookie(
            post_json("/api/admin/guests", json!({ "primary_guest": "Sam Patel" })),
            &cookie,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "Insufficient permissions");
}

#[tokio::test]
async fn test_admin_creates_imports_and_exports() {
    let t = setup();
    seed_admin(&t.store, "host@example.com", AdminRole::Admin);
    let cookie = login(&t.app, "host@example.com").await;

    let (status, _, created) = send(
        &t.app,
        with_cookie(
            post_json(
                "/api/admin/guests",
                json!({ "primary_guest": "Sam Patel", "max_party_size": 2 }),
            ),
            &cookie,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["invitation_code"].as_str().unwrap().len(), 8);

    let (status, _, body) = send(
        &t.app,
        with_cookie(post_json("/api/admin/guests", json!({ "primary_guest": " " })), &cookie),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Primary guest name is required");

    let csv = "primary_guest,household_members,max_party_size\n\
               Ana Ruiz,Ana Ruiz; Leo Ruiz,2\n\
               ,nobody,1\n";
    let import = Request::post("/api/admin/guests/import")
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from(csv))
        .unwrap();
    let (status, _, summary) = send(&t.app, with_cookie(import, &cookie)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(summary, json!({ "imported": 1, "failed": 0, "skipped": 1 }));

    let bad = Request::post("/api/admin/guests/import")
        .body(Body::from("name\nAna\n"))
        .unwrap();
    let (status, _, body) = send(&t.app, with_cookie(bad, &cookie)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "CSV must include primary_guest column");

    let resp = t
        .app
        .clone()
        .oneshot(with_cookie(get("/api/admin/export"), &cookie))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(
        resp.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .starts_with("attachment; filename=\"rsvps_")
    );
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    let mut lines = text.lines();
    assert!(lines.next().unwrap().starts_with("Primary Guest,Email,Invitation Code"));
    assert_eq!(lines.count(), 4);
}
