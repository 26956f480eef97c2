use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::{SaltString, rand_core::OsRng}};
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::HeaderMap,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde_json::{Value, json};
use tracing::{info, warn};

use rsvp_core::RsvpError;
use rsvp_types::api::{Claims, LoginRequest, LoginResponse};
use rsvp_types::models::AdminUser;

use crate::config::MAX_TOKEN_TTL_HOURS;
use crate::error::ApiError;
use crate::state::{AppState, run_blocking};

pub const TOKEN_COOKIE: &str = "admin_token";
pub const TOKEN_ISSUER: &str = "rsvp-server";
pub const MIN_PASSWORD_LEN: usize = 8;

/// Issues and checks the HS256 tokens carried in the admin cookie.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours.clamp(1, MAX_TOKEN_TTL_HOURS)),
        }
    }

    pub fn issue(&self, admin: &AdminUser, now: DateTime<Utc>) -> anyhow::Result<String> {
        let issued = now.timestamp() as usize;
        let claims = Claims {
            email: admin.email.clone(),
            name: admin.name.clone(),
            role: admin.role,
            iss: TOKEN_ISSUER.to_string(),
            iat: issued,
            nbf: issued,
            exp: (now + self.ttl).timestamp() as usize,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        Ok(token)
    }

    /// `None` for anything that is not a live token signed by us.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TOKEN_ISSUER]);
        validation.validate_nbf = true;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .ok()
    }
}

pub fn hash_password(password: &str) -> anyhow::Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("failed to hash password: {}", e))?
        .to_string();
    Ok(hash)
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

fn is_https(headers: &HeaderMap) -> bool {
    headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|proto| proto.eq_ignore_ascii_case("https"))
}

fn token_cookie(value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, value))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .build()
}

pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    jar: CookieJar,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginResponse>), ApiError> {
    let Json(req) = payload?;
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || req.password.is_empty() {
        return Err(ApiError::BadRequest("Email and password are required".into()));
    }

    // Allow-list first, so unlisted addresses never reach the store.
    if !state.config.is_whitelisted(&email) {
        warn!(%email, reason = "not whitelisted", "admin login rejected");
        return Err(ApiError::InvalidCredentials);
    }

    let admins = state.admins.clone();
    let lookup = email.clone();
    let (admin, password_ok) = run_blocking(move || {
        let Some(admin) = admins.get_admin(&lookup)? else {
            return Ok((None, false));
        };
        let ok = verify_password(&req.password, &admin.password_hash);
        Ok((Some(admin), ok))
    })
    .await?;

    let admin = match admin {
        Some(admin) if password_ok => admin,
        Some(_) => {
            warn!(%email, reason = "bad password", "admin login rejected");
            return Err(ApiError::InvalidCredentials);
        }
        None => {
            warn!(%email, reason = "unknown admin", "admin login rejected");
            return Err(ApiError::InvalidCredentials);
        }
    };

    let now = Utc::now();
    let token = state
        .tokens
        .issue(&admin, now)
        .map_err(|e| ApiError::from(RsvpError::Unavailable(e)))?;

    let admins = state.admins.clone();
    let login_email = admin.email.clone();
    let recorded = run_blocking(move || Ok(admins.record_login(&login_email, now))).await?;
    if let Err(e) = recorded {
        warn!(email = %admin.email, "failed to record last login: {}", e);
    }

    info!(email = %admin.email, role = %admin.role, "admin login accepted");

    let jar = jar.add(token_cookie(token, is_https(&headers)));
    Ok((
        jar,
        Json(LoginResponse {
            email: admin.email,
            name: admin.name,
            role: admin.role,
        }),
    ))
}

pub async fn logout(headers: HeaderMap, jar: CookieJar) -> (CookieJar, Json<Value>) {
    let jar = jar.remove(token_cookie(String::new(), is_https(&headers)));
    (jar, Json(json!({ "success": true })))
}
