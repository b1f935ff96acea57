//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.
//! Error bodies are JSON: `{ "status": "error", "message": ..., "errors"?: [...] }`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bazaar_core::ValidationError;
use serde::Serialize;
use thiserror::Error;

use crate::commerce::CommerceError;
use crate::services::auth::AuthError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Commerce API operation failed.
    #[error("Commerce error: {0}")]
    Commerce(#[from] CommerceError),

    /// Authentication operation failed.
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

    /// Form fields failed validation.
    #[error("Validation failed")]
    Validation(Vec<ValidationError>),

    /// Session store failure.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// JSON error body.
#[derive(Debug, Serialize)]
struct ErrorBody {
    status: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    errors: Vec<ValidationError>,
}

const EXTERNAL_SERVICE_ERROR: &str = "External service error";
const INTERNAL_SERVER_ERROR: &str = "Internal server error";

impl AppError {
    /// Whether this error should be reported to Sentry.
    fn is_server_fault(&self) -> bool {
        match self {
            Self::Session(_) => true,
            Self::Commerce(err) | Self::Auth(AuthError::Commerce(err)) => {
                err.is_upstream_failure()
            }
            Self::Auth(AuthError::MalformedToken(_) | AuthError::Session(_)) => true,
            _ => false,
        }
    }

    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            Self::Commerce(err) | Self::Auth(AuthError::Commerce(err)) => commerce_response(err),
            Self::Auth(err) => match err {
                AuthError::Validation(_) => (StatusCode::BAD_REQUEST, "Validation failed".to_string()),
                AuthError::InvalidCredentials(message) => {
                    (StatusCode::UNAUTHORIZED, message.clone())
                }
                AuthError::RegistrationRejected(message) => {
                    (StatusCode::BAD_REQUEST, message.clone())
                }
                AuthError::MissingUserId => (StatusCode::UNAUTHORIZED, err.to_string()),
                AuthError::MalformedToken(_) => {
                    (StatusCode::BAD_GATEWAY, EXTERNAL_SERVICE_ERROR.to_string())
                }
                AuthError::Session(_) | AuthError::Commerce(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    INTERNAL_SERVER_ERROR.to_string(),
                ),
            },
            Self::Validation(_) => (StatusCode::BAD_REQUEST, "Validation failed".to_string()),
            Self::Session(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                INTERNAL_SERVER_ERROR.to_string(),
            ),
            Self::NotFound(message) => (StatusCode::NOT_FOUND, message.clone()),
            Self::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
        }
    }
}

/// Map a commerce API failure to a client-facing status and message.
///
/// Upstream 4xx messages pass through; everything else is opaque.
fn commerce_response(err: &CommerceError) -> (StatusCode, String) {
    match err {
        CommerceError::Api { status, message } => (*status, message.clone()),
        CommerceError::NotFound(message) => (StatusCode::NOT_FOUND, message.clone()),
        CommerceError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, message.clone()),
        CommerceError::RateLimited(_) => (
            StatusCode::TOO_MANY_REQUESTS,
            "Too many requests".to_string(),
        ),
        CommerceError::Http(_) | CommerceError::Upstream { .. } | CommerceError::Parse(_) => {
            (StatusCode::BAD_GATEWAY, EXTERNAL_SERVICE_ERROR.to_string())
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_fault() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let (status, message) = self.status_and_message();

        let errors = match self {
            Self::Validation(errors) | Self::Auth(AuthError::Validation(errors)) => errors,
            _ => Vec::new(),
        };

        let body = ErrorBody {
            status: "error",
            message,
            errors,
        };

        (status, Json(body)).into_response()
    }
}

/// Set the Sentry user context from a user ID.
///
/// Call this after successful authentication to associate errors with users.
pub fn set_sentry_user(user_id: &impl ToString, email: Option<&str>) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(user_id.to_string()),
            email: email.map(String::from),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
///
/// Call this on logout to stop associating errors with the user.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

/// Add a breadcrumb for user actions.
///
/// Breadcrumbs appear in Sentry error reports to show the trail of user actions
/// leading up to an error.
///
/// # Example
///
/// ```rust,ignore
/// add_breadcrumb("cart", "Added to cart", Some(&[("product_id", "6428ebc6")]));
/// ```
pub fn add_breadcrumb(category: &str, message: &str, data: Option<&[(&str, &str)]>) {
    let mut breadcrumb = sentry::Breadcrumb {
        category: Some(category.to_string()),
        message: Some(message.to_string()),
        level: sentry::Level::Info,
        ..Default::default()
    };

    if let Some(pairs) = data {
        for (key, value) in pairs {
            breadcrumb.data.insert(
                (*key).to_string(),
                serde_json::Value::String((*value).to_string()),
            );
        }
    }

    sentry::add_breadcrumb(breadcrumb);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product-123".to_string());
        assert_eq!(err.to_string(), "Not found: product-123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::BadRequest("test".to_string())),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_commerce_errors_map_to_gateway_or_passthrough() {
        assert_eq!(
            get_status(AppError::Commerce(CommerceError::Upstream {
                status: StatusCode::SERVICE_UNAVAILABLE
            })),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            get_status(AppError::Commerce(CommerceError::Api {
                status: StatusCode::BAD_REQUEST,
                message: "Invalid product".to_string()
            })),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Commerce(CommerceError::RateLimited(3))),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn test_auth_errors() {
        assert_eq!(
            get_status(AppError::Auth(AuthError::InvalidCredentials(
                "Incorrect email or password".to_string()
            ))),
            StatusCode::UNAUTHORIZED
        );
        let (status, message) = AppError::Auth(AuthError::MissingUserId).status_and_message();
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(message, "User ID not found in token");
    }

    #[test]
    fn test_upstream_message_hidden() {
        let (_, message) = AppError::Commerce(CommerceError::Upstream {
            status: StatusCode::INTERNAL_SERVER_ERROR,
        })
        .status_and_message();
        assert_eq!(message, "External service error");
    }

    #[test]
    fn test_validation_errors_in_body() {
        let err = AppError::Validation(vec![ValidationError {
            field: "phone",
            reason: "this field is required".to_string(),
        }]);
        assert_eq!(get_status(err), StatusCode::BAD_REQUEST);
    }
}
