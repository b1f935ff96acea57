//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                          - Liveness check
//! GET  /health/ready                    - Readiness (commerce API reachable)
//!
//! # Pages (JSON views, always locale-prefixed)
//! GET  /{locale}                        - Home
//! GET  /{locale}/products               - Product listing
//! GET  /{locale}/products/{id}          - Product detail
//! GET  /{locale}/categories             - Category listing
//! GET  /{locale}/categories/{id}/subcategories - Subcategories
//! GET  /{locale}/brands                 - Brand listing
//! GET  /{locale}/cart                   - Cart (requires auth)
//! GET  /{locale}/allorders              - Order history (requires auth)
//! GET  /{locale}/orders/{id}            - Order detail (requires auth)
//! GET  /{locale}/profile                - Profile (requires auth)
//! GET  /{locale}/login                  - Login form descriptor
//! GET  /{locale}/register               - Register form descriptor
//!
//! # Auth API
//! POST /api/auth/login                  - Sign in
//! POST /api/auth/register               - Create account
//! POST /api/auth/logout                 - Sign out
//! GET  /api/auth/session                - Current session
//!
//! # Cart API (requires auth)
//! GET    /api/cart                      - Fetch cart
//! POST   /api/cart/add                  - Add product
//! GET    /api/cart/count                - Distinct product count
//! PUT    /api/cart/{productId}          - Set count
//! DELETE /api/cart/{productId}          - Remove product
//! DELETE /api/cart                      - Clear cart
//!
//! # Orders & checkout API (requires auth)
//! GET  /api/orders                      - Page of orders
//! GET  /api/orders/{id}                 - One order
//! POST /api/checkout                    - Card or cash checkout
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod home;
pub mod orders;
pub mod products;
pub mod views;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde_json::json;

use crate::state::AppState;

/// Router type used throughout the storefront.
pub type Router = axum::Router<AppState>;

/// Localized page routes, mounted under `/{locale}`.
pub fn page_routes() -> Router {
    Router::new()
        .route("/", get(home::home))
        .route("/products", get(products::index))
        .route("/products/{id}", get(products::show))
        .route("/categories", get(catalog::categories))
        .route("/categories/{id}/subcategories", get(catalog::subcategories))
        .route("/brands", get(catalog::brands))
        .route("/cart", get(cart::show))
        .route("/allorders", get(orders::history))
        .route("/orders/{id}", get(orders::detail))
        .route("/profile", get(account::profile))
        .route("/login", get(auth::login_page))
        .route("/register", get(auth::register_page))
}

/// Auth API routes, mounted under `/api/auth`.
pub fn auth_api_routes() -> Router {
    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::session))
}

/// Cart, order and checkout API routes, mounted under `/api`.
pub fn api_routes() -> Router {
    Router::new()
        .route("/cart", get(cart::get_cart).delete(cart::clear))
        .route("/cart/add", post(cart::add))
        .route("/cart/count", get(cart::count))
        .route("/cart/{id}", put(cart::update).delete(cart::remove))
        .route("/orders", get(orders::list))
        .route("/orders/{id}", get(orders::show))
        .route("/checkout", post(checkout::checkout))
}

/// Health check routes.
pub fn health_routes() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
}

/// Liveness probe.
async fn health() -> &'static str {
    "ok"
}

/// Readiness probe: the commerce API answers a catalog request.
async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    match state.commerce().get_categories().await {
        Ok(_) => (StatusCode::OK, Json(json!({"status": "ready"}))),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({"status": "unavailable"})),
            )
        }
    }
}
