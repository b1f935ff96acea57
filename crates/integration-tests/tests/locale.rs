//! Integration tests for locale prefix routing and negotiation.
//!
//! Run with: cargo test -p bazaar-integration-tests --test locale

#![allow(clippy::unwrap_used)]

use bazaar_core::Locale;
use bazaar_integration_tests::TestContext;
use reqwest::{
    StatusCode,
    header::{ACCEPT_LANGUAGE, COOKIE, LOCATION, SET_COOKIE},
};

async fn location_for(ctx: &TestContext, path: &str, headers: &[(&str, &str)]) -> String {
    let mut request = ctx.client.get(ctx.url(path));
    for (name, value) in headers {
        request = request.header(*name, *value);
    }
    let response = request.send().await.unwrap();
    assert_eq!(response.status(), StatusCode::TEMPORARY_REDIRECT, "{path}");
    response.headers()[LOCATION].to_str().unwrap().to_string()
}

#[tokio::test]
async fn test_unprefixed_paths_redirect_to_default_locale() {
    let ctx = TestContext::new().await;

    assert_eq!(location_for(&ctx, "/", &[]).await, "/en");
    assert_eq!(location_for(&ctx, "/products", &[]).await, "/en/products");
    assert_eq!(
        location_for(&ctx, "/products/prod-shawl?ref=home", &[]).await,
        "/en/products/prod-shawl?ref=home"
    );
}

#[tokio::test]
async fn test_configured_default_locale() {
    let ctx = TestContext::with_default_locale(Locale::Ar).await;

    assert_eq!(location_for(&ctx, "/cart", &[]).await, "/ar/cart");
}

#[tokio::test]
async fn test_accept_language_negotiation() {
    let ctx = TestContext::new().await;

    let target = location_for(
        &ctx,
        "/brands",
        &[(ACCEPT_LANGUAGE.as_str(), "fr-FR,ar;q=0.8,en;q=0.5")],
    )
    .await;
    assert_eq!(target, "/ar/brands");
}

#[tokio::test]
async fn test_cookie_beats_accept_language() {
    let ctx = TestContext::new().await;

    let target = location_for(
        &ctx,
        "/categories",
        &[
            (ACCEPT_LANGUAGE.as_str(), "en-US,en;q=0.9"),
            (COOKIE.as_str(), "locale=ar"),
        ],
    )
    .await;
    assert_eq!(target, "/ar/categories");
}

#[tokio::test]
async fn test_prefixed_visit_remembers_locale() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/ar/categories").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .get_all(SET_COOKIE)
            .iter()
            .any(|v| v.to_str().unwrap().starts_with("locale=ar"))
    );

    // The client's cookie store now steers unprefixed requests.
    assert_eq!(location_for(&ctx, "/products", &[]).await, "/ar/products");
}

#[tokio::test]
async fn test_bypass_paths_are_not_redirected() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let (status, body) = ctx.get_json("/api/auth/session").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["authenticated"], false);
}

#[tokio::test]
async fn test_page_metadata_per_locale() {
    let ctx = TestContext::new().await;

    let (_, page) = ctx.get_json("/en/categories").await;
    assert_eq!(page["locale"], "en");
    assert_eq!(page["dir"], "ltr");

    let (_, page) = ctx.get_json("/ar/categories").await;
    assert_eq!(page["locale"], "ar");
    assert_eq!(page["dir"], "rtl");
    assert_eq!(page["title"], "الفئات");
}

#[tokio::test]
async fn test_unknown_page_is_localized_404() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get_json("/ar/no/such/page").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "الصفحة غير موجودة");

    let (status, body) = ctx.get_json("/api/nothing-here").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Page not found");
}

#[tokio::test]
async fn test_security_headers_present() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/en/categories").await;
    assert_eq!(response.headers()["x-content-type-options"], "nosniff");
    assert!(response.headers().contains_key("x-request-id"));
}
