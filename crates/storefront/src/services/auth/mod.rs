//! Authentication service.
//!
//! Signs customers in and up against the commerce API and turns the token it
//! returns into session credentials.

mod error;
pub mod jwt;

pub use error::AuthError;

use bazaar_core::{Email, ValidationError, email_error, validate_registration};
use chrono::Utc;
use tracing::instrument;

use crate::commerce::{AuthUser, CommerceClient, CommerceError, SignUpRequest};
use crate::models::{SessionCredentials, SessionUser};

/// Message used when the API rejects credentials without saying why.
const DEFAULT_LOGIN_FAILURE: &str = "Wrong credentials";

/// Raw sign-up form fields.
#[derive(Debug, Clone, Copy)]
pub struct SignUpForm<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub re_password: &'a str,
    pub phone: &'a str,
}

/// Authentication service.
///
/// Handles customer sign-in and registration through the commerce API.
pub struct AuthService<'a> {
    commerce: &'a CommerceClient,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(commerce: &'a CommerceClient) -> Self {
        Self { commerce }
    }

    /// Sign a customer in and build their session credentials.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` for a malformed email or empty password.
    /// Returns `AuthError::InvalidCredentials` if the API rejects the login.
    /// Returns `AuthError::MissingUserId` if the token carries no id claim.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionCredentials, AuthError> {
        let mut errors = Vec::new();
        let email = Email::parse(email)
            .map_err(|e| errors.push(email_error("email", &e)))
            .ok();
        if password.is_empty() {
            errors.push(ValidationError {
                field: "password",
                reason: "this field is required".to_string(),
            });
        }
        let Some(email) = email.filter(|_| errors.is_empty()) else {
            return Err(AuthError::Validation(errors));
        };

        let response = self
            .commerce
            .sign_in(email.as_str(), password)
            .await
            .map_err(rejected_as(AuthError::InvalidCredentials))?;

        if !response.is_success() {
            let message = response
                .status_msg
                .filter(|m| !m.is_empty() && m != "fail")
                .or_else(|| Some(response.message).filter(|m| !m.is_empty()))
                .unwrap_or_else(|| DEFAULT_LOGIN_FAILURE.to_string());
            return Err(AuthError::InvalidCredentials(message));
        }

        let token = response
            .token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::MalformedToken("response carried no token".to_string()))?;

        credentials_from_token(token, response.user, email.as_str())
    }

    /// Register a new customer. Registration does not sign the customer in.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Validation` with every failing field.
    /// Returns `AuthError::RegistrationRejected` if the API refuses the account.
    #[instrument(skip(self, form), fields(email = %form.email))]
    pub async fn register(&self, form: SignUpForm<'_>) -> Result<AuthUser, AuthError> {
        let registration = validate_registration(
            form.name,
            form.email,
            form.password,
            form.re_password,
            form.phone,
        )
        .map_err(AuthError::Validation)?;

        let request = SignUpRequest {
            name: registration.name.as_str(),
            email: registration.email.as_str(),
            password: registration.password.expose(),
            re_password: registration.password.expose(),
            phone: registration.phone.as_str(),
        };

        let response = self
            .commerce
            .sign_up(&request)
            .await
            .map_err(rejected_as(AuthError::RegistrationRejected))?;

        if !response.is_success() {
            return Err(AuthError::RegistrationRejected(response.message));
        }

        Ok(response.user.unwrap_or_else(|| AuthUser {
            name: registration.name.as_str().to_string(),
            email: registration.email.as_str().to_string(),
            role: "user".to_string(),
        }))
    }
}

/// Map API rejections (4xx with a message) to the given variant.
fn rejected_as(variant: fn(String) -> AuthError) -> impl Fn(CommerceError) -> AuthError {
    move |err| match err {
        CommerceError::Unauthorized(message) | CommerceError::Api { message, .. } => {
            variant(message)
        }
        other => AuthError::Commerce(other),
    }
}

/// Build session credentials from a commerce API token.
///
/// The profile comes from the sign-in response when present, else from the
/// token claims.
///
/// # Errors
///
/// Returns an error if the token cannot be decoded or has no id claim.
pub fn credentials_from_token(
    token: String,
    user: Option<AuthUser>,
    fallback_email: &str,
) -> Result<SessionCredentials, AuthError> {
    let claims = jwt::decode_claims(&token)?;
    let user_id = claims.resolve_user_id()?;

    let user = user.map_or_else(
        || SessionUser {
            name: claims.name.clone().unwrap_or_default(),
            email: claims
                .email
                .clone()
                .unwrap_or_else(|| fallback_email.to_string()),
            role: claims.role.clone().unwrap_or_else(|| "user".to_string()),
        },
        |u| SessionUser {
            name: u.name,
            email: u.email,
            role: u.role,
        },
    );

    Ok(SessionCredentials {
        user_id,
        user,
        token,
        issued_at: Utc::now(),
        expires_at: claims.expires_at(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use jwt::tests::token_with;

    #[test]
    fn test_credentials_from_token_prefers_response_profile() {
        let token = token_with(&serde_json::json!({
            "id": "u1",
            "name": "Claim Name",
            "exp": 4_102_444_800_i64
        }));
        let creds = credentials_from_token(
            token.clone(),
            Some(AuthUser {
                name: "Ahmed".to_string(),
                email: "ahmed@example.com".to_string(),
                role: "user".to_string(),
            }),
            "ignored@example.com",
        )
        .unwrap();
        assert_eq!(creds.user_id.as_str(), "u1");
        assert_eq!(creds.user.name, "Ahmed");
        assert_eq!(creds.token, token);
        assert!(!creds.is_expired());
    }

    #[test]
    fn test_credentials_from_token_falls_back_to_claims() {
        let token = token_with(&serde_json::json!({ "userId": "u2", "name": "Mona" }));
        let creds = credentials_from_token(token, None, "mona@example.com").unwrap();
        assert_eq!(creds.user_id.as_str(), "u2");
        assert_eq!(creds.user.name, "Mona");
        assert_eq!(creds.user.email, "mona@example.com");
        assert_eq!(creds.expires_at, None);
    }

    #[test]
    fn test_credentials_require_user_id() {
        let token = token_with(&serde_json::json!({ "name": "Nobody" }));
        assert!(matches!(
            credentials_from_token(token, None, "x@example.com"),
            Err(AuthError::MissingUserId)
        ));
    }

    #[test]
    fn test_rejected_as_maps_api_messages() {
        let map = rejected_as(AuthError::InvalidCredentials);
        let err = map(CommerceError::Unauthorized("Incorrect email or password".to_string()));
        assert!(
            matches!(err, AuthError::InvalidCredentials(ref m) if m == "Incorrect email or password")
        );

        let err = map(CommerceError::RateLimited(5));
        assert!(matches!(err, AuthError::Commerce(_)));
    }
}
