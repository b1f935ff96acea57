//! Authentication middleware and extractors.
//!
//! Provides extractors for requiring a signed-in customer in route handlers.
//! Credentials whose commerce token has expired are removed from the session
//! and treated as signed out.

use axum::{
    Json,
    extract::{FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use bazaar_core::{Locale, UserId};
use serde_json::json;
use tower_sessions::Session;

use crate::error::{clear_sentry_user, set_sentry_user};
use crate::i18n::{Message, t};
use crate::middleware::locale::RequestLocale;
use crate::models::{SessionCredentials, session_keys};

/// Extractor that requires a signed-in customer.
///
/// API requests are rejected with 401; page requests are redirected to the
/// localized login page with a `callbackUrl` back to where they were.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAuth(customer): RequireAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", customer.user.name)
/// }
/// ```
pub struct RequireAuth(pub SessionCredentials);

/// Error returned when authentication is required but the customer is not logged in.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the login page (for page requests).
    RedirectToLogin { locale: Locale, callback: String },
    /// Unauthorized response (for API requests).
    Unauthorized(Locale),
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin { locale, callback } => Redirect::to(&format!(
                "/{locale}/login?callbackUrl={}",
                urlencoding::encode(&callback)
            ))
            .into_response(),
            Self::Unauthorized(locale) => (
                StatusCode::UNAUTHORIZED,
                Json(json!({
                    "status": "error",
                    "message": t(locale, Message::LoginRequired),
                })),
            )
                .into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAuth
where
    S: Send + Sync,
{
    type Rejection = AuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(RequestLocale(locale)) = RequestLocale::from_request_parts(parts, state).await;
        // Nested routers see a stripped URI; decide on the one the client sent.
        let uri = parts
            .extensions
            .get::<OriginalUri>()
            .map_or_else(|| parts.uri.clone(), |original| original.0.clone());
        let reject = || {
            if uri.path().starts_with("/api/") {
                AuthRejection::Unauthorized(locale)
            } else {
                AuthRejection::RedirectToLogin {
                    locale,
                    callback: uri
                        .path_and_query()
                        .map_or_else(|| uri.path().to_string(), ToString::to_string),
                }
            }
        };

        // Get the session from extensions (set by SessionManagerLayer)
        let Some(session) = parts.extensions.get::<Session>() else {
            return Err(reject());
        };

        match load_credentials(session).await {
            Some(credentials) => Ok(Self(credentials)),
            None => Err(reject()),
        }
    }
}

/// Extractor that optionally gets the signed-in customer.
///
/// Unlike `RequireAuth`, this does not reject the request if the customer is not logged in.
pub struct OptionalAuth(pub Option<SessionCredentials>);

impl<S> FromRequestParts<S> for OptionalAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let credentials = match parts.extensions.get::<Session>() {
            Some(session) => load_credentials(session).await,
            None => None,
        };

        Ok(Self(credentials))
    }
}

/// Read unexpired credentials, clearing expired ones.
async fn load_credentials(session: &Session) -> Option<SessionCredentials> {
    let credentials: SessionCredentials = session
        .get(session_keys::CREDENTIALS)
        .await
        .ok()
        .flatten()?;

    if credentials.is_expired() {
        tracing::info!(user_id = %credentials.user_id, "Commerce token expired, clearing session");
        if let Err(e) = session.flush().await {
            tracing::warn!(error = %e, "Failed to clear expired session");
        }
        return None;
    }

    Some(credentials)
}

/// Start an authenticated session.
///
/// Rotates the session id and drops any cart owner left by a previous
/// customer before storing credentials.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn establish_session(
    session: &Session,
    credentials: &SessionCredentials,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    // A previous customer's cart owner must not steer this one's order lookups.
    session.remove_value(session_keys::CART_OWNER).await?;
    session
        .insert(session_keys::CREDENTIALS, credentials)
        .await?;
    set_sentry_user(&credentials.user_id, Some(&credentials.user.email));
    Ok(())
}

/// End the session entirely (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be flushed.
pub async fn end_session(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await?;
    clear_sentry_user();
    Ok(())
}

/// Remember the cart owner id reported by the commerce API.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn remember_cart_owner(
    session: &Session,
    owner: &UserId,
) -> Result<(), tower_sessions::session::Error> {
    let current: Option<UserId> = session.get(session_keys::CART_OWNER).await?;
    if current.as_ref() != Some(owner) {
        session.insert(session_keys::CART_OWNER, owner).await?;
    }
    Ok(())
}

/// The id to look up order history with: the remembered cart owner, else
/// the id from the token.
pub async fn order_owner(session: &Session, credentials: &SessionCredentials) -> UserId {
    session
        .get::<UserId>(session_keys::CART_OWNER)
        .await
        .ok()
        .flatten()
        .unwrap_or_else(|| credentials.user_id.clone())
}
