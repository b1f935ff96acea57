//! Checkout route handler.
//!
//! Card payments open a hosted payment session and send the customer there;
//! cash orders are placed immediately and land on the order history.

use axum::{Json, extract::State, response::IntoResponse};
use bazaar_core::{OrderId, PaymentMethod, ShippingAddress};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::{AppError, add_breadcrumb};
use crate::i18n::{Message, t};
use crate::middleware::{RequestLocale, RequireAuth};
use crate::state::AppState;

/// Raw shipping address fields; validated before use.
#[derive(Debug, Default, Deserialize)]
pub struct AddressForm {
    #[serde(default)]
    pub details: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub city: String,
}

/// Body of `POST /api/checkout`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutForm {
    #[serde(default)]
    pub shipping_address: AddressForm,
    #[serde(default)]
    pub payment_method: PaymentMethod,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CheckoutResponse {
    status: &'static str,
    message: &'static str,
    payment_method: PaymentMethod,
    redirect: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    order_id: Option<OrderId>,
}

/// Place an order for the current cart.
#[instrument(skip(state, customer, form), fields(user_id = %customer.user_id, payment_method = ?form.payment_method))]
pub async fn checkout(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    RequireAuth(customer): RequireAuth,
    Json(form): Json<CheckoutForm>,
) -> Result<impl IntoResponse, AppError> {
    let address = ShippingAddress::parse(
        &form.shipping_address.details,
        &form.shipping_address.phone,
        &form.shipping_address.city,
    )
    .map_err(AppError::Validation)?;

    let snapshot = state
        .cart_sync()
        .refresh(&customer.user_id, &customer.token)
        .await?;
    let cart_id = match (&snapshot.cart.id, snapshot.cart.is_empty()) {
        (Some(id), false) => id.clone(),
        _ => return Err(AppError::BadRequest(t(locale, Message::CartEmpty).to_string())),
    };

    add_breadcrumb(
        "checkout",
        "Checkout started",
        Some(&[("cart_id", cart_id.as_str())]),
    );

    let response = match form.payment_method {
        PaymentMethod::Card => {
            let session = state
                .commerce()
                .create_checkout_session(
                    &customer.token,
                    &cart_id,
                    &state.config().base_url,
                    &address,
                )
                .await?;
            tracing::info!(cart_id = %cart_id, "Card checkout session created");
            CheckoutResponse {
                status: "success",
                message: t(locale, Message::RedirectingToPayment),
                payment_method: PaymentMethod::Card,
                redirect: session.url,
                order_id: None,
            }
        }
        PaymentMethod::Cash => {
            let order = state
                .commerce()
                .create_cash_order(&customer.token, &cart_id, &address)
                .await?;
            state.cart_sync().invalidate(&customer.user_id).await;
            tracing::info!(cart_id = %cart_id, order_id = %order.id, "Cash order placed");
            CheckoutResponse {
                status: "success",
                message: t(locale, Message::OrderPlaced),
                payment_method: PaymentMethod::Cash,
                redirect: format!("/{locale}/allorders"),
                order_id: Some(order.id),
            }
        }
    };

    Ok(Json(response))
}
