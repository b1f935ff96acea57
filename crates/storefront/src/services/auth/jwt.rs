//! JWT claim decoding for commerce API tokens.
//!
//! The commerce API signs its tokens with a key the storefront never sees, so
//! only the payload is decoded here. The API verifies the signature itself on
//! every call that carries the token.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use bazaar_core::UserId;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::AuthError;

/// Claims the storefront reads from a commerce API token.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenClaims {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default, rename = "_id")]
    pub underscore_id: Option<Value>,
    #[serde(default, rename = "userId")]
    pub user_id: Option<Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub iat: Option<i64>,
    #[serde(default)]
    pub exp: Option<i64>,
}

impl TokenClaims {
    /// Resolve the customer id, checking `id`, then `_id`, then `userId`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::MissingUserId` if no claim holds a usable id.
    pub fn resolve_user_id(&self) -> Result<UserId, AuthError> {
        [&self.id, &self.underscore_id, &self.user_id]
            .into_iter()
            .filter_map(|claim| claim.as_ref().and_then(claim_string))
            .find_map(|raw| UserId::parse(&raw).ok())
            .ok_or(AuthError::MissingUserId)
    }

    /// Expiry as a timestamp, when the token carries `exp`.
    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }
}

/// Id claims arrive as strings, occasionally as numbers.
fn claim_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Decode the payload segment of a JWT without verifying the signature.
///
/// # Errors
///
/// Returns `AuthError::MalformedToken` if the token is not three segments or
/// the payload is not base64url-encoded JSON.
pub fn decode_claims(token: &str) -> Result<TokenClaims, AuthError> {
    let mut segments = token.trim().split('.');
    let (Some(_header), Some(payload), Some(_signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(AuthError::MalformedToken(
            "expected three dot-separated segments".to_string(),
        ));
    };

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| AuthError::MalformedToken(format!("payload is not base64url: {e}")))?;

    serde_json::from_slice(&bytes)
        .map_err(|e| AuthError::MalformedToken(format!("payload is not JSON: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use super::*;

    /// Build an unsigned token with the given payload.
    pub(crate) fn token_with(payload: &Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let body = URL_SAFE_NO_PAD.encode(payload.to_string());
        format!("{header}.{body}.signature")
    }

    #[test]
    fn test_decode_resolves_id_claim() {
        let token = token_with(&serde_json::json!({
            "id": "6407cf6f515bdcf347c09f17",
            "name": "Ahmed",
            "role": "user",
            "iat": 1_700_000_000,
            "exp": 1_707_776_000
        }));
        let claims = decode_claims(&token).unwrap();
        assert_eq!(
            claims.resolve_user_id().unwrap().as_str(),
            "6407cf6f515bdcf347c09f17"
        );
        assert_eq!(claims.expires_at().unwrap().timestamp(), 1_707_776_000);
    }

    #[test]
    fn test_user_id_fallback_order() {
        let claims = decode_claims(&token_with(&serde_json::json!({
            "_id": "from-underscore",
            "userId": "from-user-id"
        })))
        .unwrap();
        assert_eq!(claims.resolve_user_id().unwrap().as_str(), "from-underscore");

        let claims =
            decode_claims(&token_with(&serde_json::json!({ "id": "", "userId": 42 }))).unwrap();
        assert_eq!(claims.resolve_user_id().unwrap().as_str(), "42");
    }

    #[test]
    fn test_missing_user_id() {
        let claims = decode_claims(&token_with(&serde_json::json!({ "name": "x" }))).unwrap();
        let err = claims.resolve_user_id().unwrap_err();
        assert_eq!(err.to_string(), "User ID not found in token");
    }

    #[test]
    fn test_malformed_tokens() {
        assert!(matches!(
            decode_claims("not-a-jwt"),
            Err(AuthError::MalformedToken(_))
        ));
        assert!(matches!(
            decode_claims("a.!!!.c"),
            Err(AuthError::MalformedToken(_))
        ));
        assert!(matches!(
            decode_claims("a.b.c.d"),
            Err(AuthError::MalformedToken(_))
        ));
        let not_json = format!("h.{}.s", URL_SAFE_NO_PAD.encode("plain text"));
        assert!(matches!(
            decode_claims(&not_json),
            Err(AuthError::MalformedToken(_))
        ));
    }
}
