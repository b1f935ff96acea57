//! Router assembly.
//!
//! Builds the full storefront service with its middleware stack. The binary
//! and the integration tests share this so both exercise the same layers.

use axum::{
    Router,
    http::{Request, Response},
    middleware::{from_fn, from_fn_with_state},
    response::IntoResponse,
};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::config::ConfigError;
use crate::error::AppError;
use crate::i18n::{Message, t};
use crate::middleware::{
    RequestLocale, api_rate_limiter, auth_rate_limiter, locale_middleware,
    request_id_middleware, security_headers_middleware, with_session_layer,
};
use crate::routes;
use crate::state::AppState;

/// Whether per-IP rate limiting is applied to the API.
///
/// Limits key on the client IP, which needs the server to record peer
/// addresses (`into_make_service_with_connect_info`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimits {
    Enabled,
    Disabled,
}

/// Build the storefront router with every middleware layer.
///
/// # Errors
///
/// Returns an error if the session signing key cannot be derived.
pub fn build_router(state: AppState, rate_limits: RateLimits) -> Result<Router, ConfigError> {
    let mut auth_api = routes::auth_api_routes();
    let mut api = routes::api_routes();
    if rate_limits == RateLimits::Enabled {
        auth_api = auth_api.layer(auth_rate_limiter());
        api = api.layer(api_rate_limiter());
    }

    let router = Router::new()
        .merge(routes::health_routes())
        .nest("/api/auth", auth_api)
        .nest("/api", api)
        .nest("/{locale}", routes::page_routes())
        .fallback(not_found)
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn_with_state(state.clone(), locale_middleware))
        .with_state(state.clone());

    let router = with_session_layer(router, state.config())?;

    Ok(router
        .layer(from_fn(request_id_middleware))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &Response<_>, latency: std::time::Duration, span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction()))
}

/// Localized 404 for unknown paths.
async fn not_found(RequestLocale(locale): RequestLocale) -> impl IntoResponse {
    AppError::NotFound(t(locale, Message::PageNotFound).to_string())
}
