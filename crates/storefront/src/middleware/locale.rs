//! Locale routing middleware and extractor.
//!
//! Page URLs always carry a locale prefix. Unprefixed page requests are
//! redirected to the negotiated locale: the `locale` cookie first, then
//! `Accept-Language`, then the configured default. API and asset paths are
//! left alone but still get a negotiated [`RequestLocale`] for their messages.

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{
        HeaderMap, HeaderValue,
        header::{ACCEPT_LANGUAGE, COOKIE, SET_COOKIE},
        request::Parts,
    },
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use bazaar_core::Locale;
use tower_sessions::cookie::{Cookie, SameSite};

use crate::state::AppState;

/// Cookie remembering the customer's chosen locale.
pub const LOCALE_COOKIE: &str = "locale";

/// One year, in seconds.
const LOCALE_COOKIE_MAX_AGE: i64 = 365 * 24 * 60 * 60;

/// Path prefixes that never get a locale prefix.
const BYPASS_PREFIXES: &[&str] = &["/api", "/health", "/static", "/assets", "/favicon.ico"];

/// The locale resolved for the current request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RequestLocale(pub Locale);

impl<S> FromRequestParts<S> for RequestLocale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(locale) = parts.extensions.get::<Self>() {
            return Ok(*locale);
        }
        let locale = Locale::strip_prefix(parts.uri.path())
            .map(|(locale, _)| locale)
            .or_else(|| preferred_locale(&parts.headers))
            .unwrap_or_default();
        Ok(Self(locale))
    }
}

/// Whether a path is served without a locale prefix.
#[must_use]
pub fn is_bypassed(path: &str) -> bool {
    BYPASS_PREFIXES.iter().any(|prefix| {
        path.strip_prefix(prefix)
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    })
}

/// Locale from the cookie, else from `Accept-Language`.
fn preferred_locale(headers: &HeaderMap) -> Option<Locale> {
    cookie_locale(headers).or_else(|| {
        headers
            .get(ACCEPT_LANGUAGE)
            .and_then(|v| v.to_str().ok())
            .and_then(Locale::negotiate)
    })
}

fn cookie_locale(headers: &HeaderMap) -> Option<Locale> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == LOCALE_COOKIE)
        .and_then(|cookie| cookie.value().parse().ok())
}

/// Redirect unprefixed page requests and record the request locale.
pub async fn locale_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    if let Some((locale, _)) = Locale::strip_prefix(&path) {
        let remembered = cookie_locale(request.headers());
        request.extensions_mut().insert(RequestLocale(locale));
        let mut response = next.run(request).await;
        if remembered != Some(locale)
            && let Ok(value) = HeaderValue::from_str(&locale_cookie(locale))
        {
            response.headers_mut().append(SET_COOKIE, value);
        }
        return response;
    }

    let locale = preferred_locale(request.headers()).unwrap_or(state.config().default_locale);

    if is_bypassed(&path) {
        request.extensions_mut().insert(RequestLocale(locale));
        return next.run(request).await;
    }

    let target = localized_target(locale, &path, request.uri().query());
    Redirect::temporary(&target).into_response()
}

/// `/{locale}{path}` with the original query string.
fn localized_target(locale: Locale, path: &str, query: Option<&str>) -> String {
    let path = if path == "/" { "" } else { path };
    match query {
        Some(query) if !query.is_empty() => format!("/{locale}{path}?{query}"),
        _ => format!("/{locale}{path}"),
    }
}

fn locale_cookie(locale: Locale) -> String {
    Cookie::build((LOCALE_COOKIE, locale.as_str()))
        .path("/")
        .same_site(SameSite::Lax)
        .max_age(tower_sessions::cookie::time::Duration::seconds(
            LOCALE_COOKIE_MAX_AGE,
        ))
        .build()
        .to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_bypass_paths() {
        assert!(is_bypassed("/api/cart"));
        assert!(is_bypassed("/api"));
        assert!(is_bypassed("/health"));
        assert!(is_bypassed("/favicon.ico"));
        assert!(!is_bypassed("/apiary"));
        assert!(!is_bypassed("/products"));
    }

    #[test]
    fn test_localized_target() {
        assert_eq!(localized_target(Locale::Ar, "/", None), "/ar");
        assert_eq!(
            localized_target(Locale::En, "/products", Some("page=2")),
            "/en/products?page=2"
        );
        assert_eq!(localized_target(Locale::En, "/cart", Some("")), "/en/cart");
    }

    #[test]
    fn test_cookie_beats_accept_language() {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; locale=ar"));
        assert_eq!(preferred_locale(&headers), Some(Locale::Ar));

        headers.remove(COOKIE);
        assert_eq!(preferred_locale(&headers), Some(Locale::En));

        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("fr-FR"));
        assert_eq!(preferred_locale(&headers), None);
    }

    #[test]
    fn test_locale_cookie_format() {
        let cookie = locale_cookie(Locale::Ar);
        assert!(cookie.starts_with("locale=ar"));
        assert!(cookie.contains("Path=/"));
    }
}
