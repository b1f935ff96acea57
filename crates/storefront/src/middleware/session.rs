//! Session middleware configuration.
//!
//! Sets up in-memory sessions using tower-sessions with a signed cookie.
//! Sessions only hold the commerce API token and profile, so losing them on
//! restart just signs customers out.

use axum::Router;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::{ConfigError, StorefrontConfig};

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "bazaar_session";

/// Session expiry time in seconds (7 days).
const SESSION_EXPIRY_SECONDS: i64 = 7 * 24 * 60 * 60;

/// Wrap a router in the session layer backed by the in-memory store.
///
/// # Errors
///
/// Returns an error if the signing key cannot be derived from the secret.
pub fn with_session_layer(router: Router, config: &StorefrontConfig) -> Result<Router, ConfigError> {
    let store = MemoryStore::default();
    let key = config.session_key()?;

    let layer = SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key);

    Ok(router.layer(layer))
}
