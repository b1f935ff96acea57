//! Session-related types.
//!
//! Types stored in the session for authentication state.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use bazaar_core::UserId;

/// Seconds of clock skew tolerated when checking token expiry.
pub const EXPIRY_SKEW_SECS: i64 = 60;

/// Profile fields shown for the signed-in customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub name: String,
    pub email: String,
    pub role: String,
}

/// Session-stored credentials for a signed-in customer.
///
/// Wraps the commerce API token together with the identity decoded from it.
/// `Debug` never prints the token.
#[derive(Clone, Serialize, Deserialize)]
pub struct SessionCredentials {
    /// Customer id resolved from the token claims.
    pub user_id: UserId,
    /// Profile returned at sign-in.
    pub user: SessionUser,
    /// Token sent in the `token` header on every commerce API call.
    pub token: String,
    /// When the storefront issued this session.
    pub issued_at: DateTime<Utc>,
    /// Token expiry from the `exp` claim, when present.
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionCredentials {
    /// Check if the token is expired (with 60s buffer).
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// Expiry check against an explicit clock.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at
            .is_some_and(|expires_at| now >= expires_at - Duration::seconds(EXPIRY_SKEW_SECS))
    }

    /// Public view of the session, safe to send to the browser.
    #[must_use]
    pub fn view(&self) -> SessionView {
        SessionView {
            authenticated: true,
            user_id: Some(self.user_id.clone()),
            name: Some(self.user.name.clone()),
            email: Some(self.user.email.clone()),
            role: Some(self.user.role.clone()),
            expires_at: self.expires_at,
        }
    }
}

impl fmt::Debug for SessionCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionCredentials")
            .field("user_id", &self.user_id)
            .field("user", &self.user)
            .field("token", &"[REDACTED]")
            .field("issued_at", &self.issued_at)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// What `GET /api/auth/session` returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SessionView {
    /// The view for a visitor who is not signed in.
    #[must_use]
    pub const fn anonymous() -> Self {
        Self {
            authenticated: false,
            user_id: None,
            name: None,
            email: None,
            role: None,
            expires_at: None,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for the signed-in customer's credentials.
    pub const CREDENTIALS: &str = "credentials";

    /// Key for the cart owner id last reported by the commerce API.
    pub const CART_OWNER: &str = "cart_owner";
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn credentials(expires_at: Option<DateTime<Utc>>) -> SessionCredentials {
        SessionCredentials {
            user_id: UserId::parse("6407cf6f515bdcf347c09f17").unwrap(),
            user: SessionUser {
                name: "Ahmed".to_string(),
                email: "ahmed@example.com".to_string(),
                role: "user".to_string(),
            },
            token: "header.payload.signature".to_string(),
            issued_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn test_expiry_with_skew() {
        let now = Utc::now();
        assert!(!credentials(None).is_expired_at(now));
        assert!(!credentials(Some(now + Duration::hours(1))).is_expired_at(now));
        assert!(credentials(Some(now + Duration::seconds(30))).is_expired_at(now));
        assert!(credentials(Some(now - Duration::seconds(1))).is_expired_at(now));
    }

    #[test]
    fn test_debug_redacts_token() {
        let debug = format!("{:?}", credentials(None));
        assert!(!debug.contains("payload"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_view_omits_token() {
        let json = serde_json::to_value(credentials(None).view()).unwrap();
        assert_eq!(json["authenticated"], true);
        assert_eq!(json["userId"], "6407cf6f515bdcf347c09f17");
        assert!(json.get("token").is_none());

        let anonymous = serde_json::to_value(SessionView::anonymous()).unwrap();
        assert_eq!(anonymous, serde_json::json!({"authenticated": false}));
    }
}
