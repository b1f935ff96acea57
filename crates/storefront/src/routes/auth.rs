//! Authentication route handlers.
//!
//! Handles login, registration, logout and the session probe against the
//! commerce API. The login and register pages are JSON descriptors telling
//! the client which fields to post where.

use axum::{
    Json,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use bazaar_core::Locale;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, add_breadcrumb};
use crate::i18n::{Message, t};
use crate::middleware::{OptionalAuth, RequestLocale, end_session, establish_session};
use crate::models::SessionView;
use crate::routes::views::Page;
use crate::services::{AuthService, SignUpForm};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Login form data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub callback_url: Option<String>,
}

/// Registration form data.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub re_password: String,
    #[serde(default)]
    pub phone: String,
}

/// Query parameters on the login page.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallbackQuery {
    pub callback_url: Option<String>,
}

// =============================================================================
// Response Types
// =============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AuthBody {
    status: &'static str,
    message: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    session: Option<SessionView>,
    redirect: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FormDescriptor {
    action: &'static str,
    method: &'static str,
    fields: &'static [&'static str],
    #[serde(skip_serializing_if = "Option::is_none")]
    callback_url: Option<String>,
    alternate_url: String,
}

const LOGIN_FIELDS: &[&str] = &["email", "password"];
const REGISTER_FIELDS: &[&str] = &["name", "email", "password", "rePassword", "phone"];

/// Keep callback URLs on this site.
///
/// Only absolute paths are allowed; protocol-relative and backslash tricks
/// are dropped.
fn safe_callback(raw: Option<&str>) -> Option<String> {
    let raw = raw?.trim();
    let on_site = raw.starts_with('/')
        && !raw.starts_with("//")
        && !raw.starts_with("/\\")
        && !raw.contains(['\r', '\n']);
    on_site.then(|| raw.to_string())
}

fn home_path(locale: Locale) -> String {
    format!("/{locale}")
}

// =============================================================================
// Pages
// =============================================================================

/// Login page descriptor. Signed-in customers go straight to the callback.
pub async fn login_page(
    RequestLocale(locale): RequestLocale,
    OptionalAuth(customer): OptionalAuth,
    Query(query): Query<CallbackQuery>,
) -> Response {
    let callback_url = safe_callback(query.callback_url.as_deref());
    if customer.is_some() {
        let target = callback_url.unwrap_or_else(|| home_path(locale));
        return Redirect::to(&target).into_response();
    }

    Page::new(
        locale,
        Message::LoginTitle,
        FormDescriptor {
            action: "/api/auth/login",
            method: "POST",
            fields: LOGIN_FIELDS,
            callback_url,
            alternate_url: format!("/{locale}/register"),
        },
    )
    .into_response()
}

/// Registration page descriptor.
pub async fn register_page(
    RequestLocale(locale): RequestLocale,
    OptionalAuth(customer): OptionalAuth,
) -> Response {
    if customer.is_some() {
        return Redirect::to(&home_path(locale)).into_response();
    }

    Page::new(
        locale,
        Message::RegisterTitle,
        FormDescriptor {
            action: "/api/auth/register",
            method: "POST",
            fields: REGISTER_FIELDS,
            callback_url: None,
            alternate_url: format!("/{locale}/login"),
        },
    )
    .into_response()
}

// =============================================================================
// API
// =============================================================================

/// Sign in and start a session.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    session: Session,
    Json(form): Json<LoginForm>,
) -> Result<impl IntoResponse, AppError> {
    let credentials = AuthService::new(state.commerce())
        .login(&form.email, &form.password)
        .await?;

    establish_session(&session, &credentials).await?;
    add_breadcrumb("auth", "Customer logged in", None);
    tracing::info!(user_id = %credentials.user_id, "Customer logged in");

    Ok(Json(AuthBody {
        status: "success",
        message: t(locale, Message::LoginSuccess),
        session: Some(credentials.view()),
        redirect: safe_callback(form.callback_url.as_deref())
            .unwrap_or_else(|| home_path(locale)),
    }))
}

/// Create an account. The customer still has to log in afterwards.
#[instrument(skip(state, form), fields(email = %form.email))]
pub async fn register(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Json(form): Json<RegisterForm>,
) -> Result<impl IntoResponse, AppError> {
    let user = AuthService::new(state.commerce())
        .register(SignUpForm {
            name: &form.name,
            email: &form.email,
            password: &form.password,
            re_password: &form.re_password,
            phone: &form.phone,
        })
        .await?;

    tracing::info!(email = %user.email, "Customer registered");

    Ok(Json(AuthBody {
        status: "success",
        message: t(locale, Message::RegisterSuccess),
        session: None,
        redirect: format!("/{locale}/login"),
    }))
}

/// End the session and drop the cart snapshot.
#[instrument(skip(state, session, customer))]
pub async fn logout(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    OptionalAuth(customer): OptionalAuth,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    if let Some(customer) = customer {
        state.cart_sync().invalidate(&customer.user_id).await;
        tracing::info!(user_id = %customer.user_id, "Customer logged out");
    }
    end_session(&session).await?;

    Ok(Json(AuthBody {
        status: "success",
        message: t(locale, Message::LoggedOut),
        session: Some(SessionView::anonymous()),
        redirect: format!("/{locale}/login"),
    }))
}

/// Current session, or `{ "authenticated": false }`.
pub async fn session(OptionalAuth(customer): OptionalAuth) -> Json<SessionView> {
    Json(
        customer
            .as_ref()
            .map_or_else(SessionView::anonymous, |c| c.view()),
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_callback() {
        assert_eq!(safe_callback(Some("/en/cart")).as_deref(), Some("/en/cart"));
        assert_eq!(
            safe_callback(Some("/ar/orders/1?x=2")).as_deref(),
            Some("/ar/orders/1?x=2")
        );
        assert_eq!(safe_callback(Some("//evil.example")), None);
        assert_eq!(safe_callback(Some("/\\evil.example")), None);
        assert_eq!(safe_callback(Some("https://evil.example")), None);
        assert_eq!(safe_callback(Some("/en\r\nSet-Cookie: x")), None);
        assert_eq!(safe_callback(None), None);
    }

    #[test]
    fn test_register_form_missing_fields_default_empty() {
        let form: RegisterForm = serde_json::from_str(r#"{"email":"a@b.co"}"#).unwrap();
        assert_eq!(form.email, "a@b.co");
        assert!(form.re_password.is_empty());
    }
}
