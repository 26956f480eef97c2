use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Placeholder JWT secrets that MUST NOT be used.
pub const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
    "your-secret-key-here",
];

/// Thirty days. Admins sign in again after that regardless of the setting.
pub const MAX_TOKEN_TTL_HOURS: i64 = 24 * 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("RSVP_JWT_SECRET is unset or still a placeholder")]
    MissingSecret,

    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// Process-wide settings, read once at startup and never mutated.
#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub jwt_secret: String,
    pub token_ttl_hours: i64,
    /// Lower-cased emails allowed to sign in to the admin area.
    pub admin_whitelist: Vec<String>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("db_path", &self.db_path)
            .field("jwt_secret", &"<redacted>")
            .field("token_ttl_hours", &self.token_ttl_hours)
            .field("admin_whitelist", &self.admin_whitelist)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let jwt_secret = lookup("RSVP_JWT_SECRET").unwrap_or_default();
        if jwt_secret.trim().is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            return Err(ConfigError::MissingSecret);
        }

        let port = lookup("RSVP_PORT").unwrap_or_else(|| "8080".into());
        let port: u16 = port.parse().map_err(|_| ConfigError::Invalid {
            name: "RSVP_PORT",
            value: port.clone(),
        })?;

        let ttl = lookup("RSVP_TOKEN_TTL_HOURS").unwrap_or_else(|| "24".into());
        let token_ttl_hours = match ttl.parse::<i64>() {
            Ok(hours) if (1..=MAX_TOKEN_TTL_HOURS).contains(&hours) => hours,
            _ => {
                return Err(ConfigError::Invalid {
                    name: "RSVP_TOKEN_TTL_HOURS",
                    value: ttl,
                });
            }
        };

        Ok(Self {
            host: lookup("RSVP_HOST").unwrap_or_else(|| "0.0.0.0".into()),
            port,
            db_path: lookup("RSVP_DB_PATH").unwrap_or_else(|| "rsvp.db".into()).into(),
            jwt_secret,
            token_ttl_hours,
            admin_whitelist: parse_whitelist(&lookup("ADMIN_EMAIL_WHITELIST").unwrap_or_default()),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_whitelisted(&self, email: &str) -> bool {
        let email = email.trim().to_lowercase();
        self.admin_whitelist.iter().any(|allowed| *allowed == email)
    }
}

pub fn parse_whitelist(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .collect()
}
