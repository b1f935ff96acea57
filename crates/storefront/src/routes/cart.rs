//! Cart route handlers.
//!
//! Every operation goes through [`CartSync`](crate::services::CartSync) so
//! concurrent requests for the same customer see a consistent cart. The cart
//! owner id reported by the commerce API is remembered in the session.

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};
use bazaar_core::Locale;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::i18n::{Message, t};
use crate::middleware::{RequestLocale, RequireAuth, remember_cart_owner};
use crate::routes::products::parse_product_id;
use crate::routes::views::{CartView, IdPath, Page};
use crate::services::CartSnapshot;
use crate::state::AppState;

/// Body of `POST /api/cart/add`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartForm {
    #[serde(default)]
    pub product_id: String,
    #[serde(default = "default_quantity")]
    pub quantity: i64,
}

const fn default_quantity() -> i64 {
    1
}

/// Body of `PUT /api/cart/{productId}`.
#[derive(Debug, Deserialize)]
pub struct UpdateCountForm {
    #[serde(default)]
    pub count: i64,
}

/// JSON body for cart API responses.
#[derive(Debug, Serialize)]
pub struct CartResponseBody {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub cart: CartView,
}

#[derive(Debug, Serialize)]
struct CountBody {
    count: u32,
}

#[derive(Debug, Serialize)]
struct CartPageView {
    cart: CartView,
}

/// Positive quantity that fits the API's count, or a localized error.
fn positive(value: i64, locale: Locale, message: Message) -> Result<u32, AppError> {
    u32::try_from(value)
        .ok()
        .filter(|v| *v > 0)
        .ok_or_else(|| AppError::BadRequest(t(locale, message).to_string()))
}

/// Store the owner id and build the response body.
async fn respond(
    session: &Session,
    snapshot: &CartSnapshot,
    locale: Locale,
    message: Option<Message>,
) -> Result<Json<CartResponseBody>, AppError> {
    if let Some(owner) = &snapshot.cart.owner {
        remember_cart_owner(session, owner).await?;
    }
    Ok(Json(CartResponseBody {
        status: "success",
        message: message.map(|m| t(locale, m)),
        cart: CartView::new(&snapshot.cart, locale),
    }))
}

/// Display the cart page.
#[instrument(skip(state, session, customer), fields(user_id = %customer.user_id))]
pub async fn show(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    RequireAuth(customer): RequireAuth,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = state
        .cart_sync()
        .refresh(&customer.user_id, &customer.token)
        .await?;
    if let Some(owner) = &snapshot.cart.owner {
        remember_cart_owner(&session, owner).await?;
    }

    Ok(Page::new(
        locale,
        Message::CartTitle,
        CartPageView {
            cart: CartView::new(&snapshot.cart, locale),
        },
    ))
}

/// Fetch the cart from the commerce API.
#[instrument(skip(state, session, customer), fields(user_id = %customer.user_id))]
pub async fn get_cart(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    RequireAuth(customer): RequireAuth,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = state
        .cart_sync()
        .refresh(&customer.user_id, &customer.token)
        .await?;
    respond(&session, &snapshot, locale, None).await
}

/// Number of distinct products in the cart, from the snapshot when present.
#[instrument(skip(state, customer), fields(user_id = %customer.user_id))]
pub async fn count(
    State(state): State<AppState>,
    RequireAuth(customer): RequireAuth,
) -> Result<impl IntoResponse, AppError> {
    let count = state
        .cart_sync()
        .count(&customer.user_id, &customer.token)
        .await?;
    Ok(Json(CountBody { count }))
}

/// Add a product to the cart.
#[instrument(skip(state, session, customer, form), fields(user_id = %customer.user_id))]
pub async fn add(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    RequireAuth(customer): RequireAuth,
    session: Session,
    Json(form): Json<AddToCartForm>,
) -> Result<impl IntoResponse, AppError> {
    let product_id = parse_product_id(&form.product_id, locale)?;
    let quantity = positive(form.quantity, locale, Message::QuantityMustBePositive)?;

    let snapshot = state
        .cart_sync()
        .add(&customer.user_id, &customer.token, &product_id, quantity)
        .await?;

    tracing::info!(product_id = %product_id, quantity, "Added to cart");
    respond(&session, &snapshot, locale, Some(Message::AddedToCart)).await
}

/// Set the count of one product.
#[instrument(skip(state, session, customer, form), fields(user_id = %customer.user_id, product_id = %path.id))]
pub async fn update(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    RequireAuth(customer): RequireAuth,
    session: Session,
    Path(path): Path<IdPath>,
    Json(form): Json<UpdateCountForm>,
) -> Result<impl IntoResponse, AppError> {
    let product_id = parse_product_id(&path.id, locale)?;
    let count = positive(form.count, locale, Message::CountMustBePositive)?;

    let snapshot = state
        .cart_sync()
        .update(&customer.user_id, &customer.token, &product_id, count)
        .await?;

    respond(&session, &snapshot, locale, Some(Message::CartUpdated)).await
}

/// Remove one product.
#[instrument(skip(state, session, customer), fields(user_id = %customer.user_id, product_id = %path.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    RequireAuth(customer): RequireAuth,
    session: Session,
    Path(path): Path<IdPath>,
) -> Result<impl IntoResponse, AppError> {
    let product_id = parse_product_id(&path.id, locale)?;

    let snapshot = state
        .cart_sync()
        .remove(&customer.user_id, &customer.token, &product_id)
        .await?;

    respond(&session, &snapshot, locale, Some(Message::RemovedFromCart)).await
}

/// Empty the cart.
#[instrument(skip(state, session, customer), fields(user_id = %customer.user_id))]
pub async fn clear(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    RequireAuth(customer): RequireAuth,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    let snapshot = state
        .cart_sync()
        .clear(&customer.user_id, &customer.token)
        .await?;

    respond(&session, &snapshot, locale, Some(Message::CartCleared)).await
}
