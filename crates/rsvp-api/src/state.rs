use std::sync::Arc;

use rsvp_core::{AdminStore, GuestStore, RsvpStore};
use tracing::error;

use crate::auth::TokenService;
use crate::config::Config;
use crate::error::ApiError;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub guests: Arc<dyn GuestStore>,
    pub rsvps: Arc<dyn RsvpStore>,
    pub admins: Arc<dyn AdminStore>,
    pub config: Arc<Config>,
    pub tokens: TokenService,
}

impl AppStateInner {
    /// Wire every capability to the same backing store.
    pub fn new<S>(store: Arc<S>, config: Config) -> AppState
    where
        S: GuestStore + RsvpStore + AdminStore + 'static,
    {
        let tokens = TokenService::new(&config.jwt_secret, config.token_ttl_hours);
        Arc::new(Self {
            guests: store.clone(),
            rsvps: store.clone(),
            admins: store,
            config: Arc::new(config),
            tokens,
        })
    }
}

/// Run blocking storage work off the async runtime.
pub async fn run_blocking<F, T>(f: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, ApiError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f).await.map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal
    })?
}
