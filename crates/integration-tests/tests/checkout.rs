//! Integration tests for checkout and order history.
//!
//! Run with: cargo test -p bazaar-integration-tests --test checkout

#![allow(clippy::unwrap_used)]

use bazaar_integration_tests::{SHAWL, TestContext, WATCH, shipping_address};
use reqwest::StatusCode;
use serde_json::json;

async fn signed_in_with_cart() -> TestContext {
    let ctx = TestContext::new().await;
    let (status, _) = ctx.login().await;
    assert_eq!(status, StatusCode::OK);
    ctx.api.set_cart(&ctx.user_id, &[(SHAWL, 2), (WATCH, 1)]);
    ctx
}

#[tokio::test]
async fn test_card_checkout_redirects_to_payment() {
    let ctx = signed_in_with_cart().await;

    let (status, body) = ctx
        .post_json(
            "/api/checkout",
            &json!({"shippingAddress": shipping_address(), "paymentMethod": "card"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["paymentMethod"], "card");
    assert_eq!(body["message"], "Redirecting to payment");
    assert!(
        body["redirect"]
            .as_str()
            .unwrap()
            .starts_with("https://checkout.payments.example/")
    );
    assert_eq!(ctx.api.checkout_return_urls(), vec![ctx.base_url.clone()]);

    // Card checkout leaves the cart until payment completes.
    assert_eq!(ctx.api.cart_lines(&ctx.user_id).len(), 2);
}

#[tokio::test]
async fn test_cash_checkout_places_order_and_empties_cart() {
    let ctx = signed_in_with_cart().await;
    // Warm the snapshot so a stale cart would be visible afterwards.
    ctx.get_json("/api/cart/count").await;

    let (status, body) = ctx
        .post_json(
            "/api/checkout",
            &json!({"shippingAddress": shipping_address(), "paymentMethod": "cash"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["paymentMethod"], "cash");
    assert_eq!(body["message"], "Order placed successfully");
    assert_eq!(body["redirect"], "/en/allorders");
    let order_id = body["orderId"].as_str().unwrap().to_string();

    assert!(ctx.api.cart_lines(&ctx.user_id).is_empty());
    let (_, count) = ctx.get_json("/api/cart/count").await;
    assert_eq!(count["count"], 0);

    let (status, body) = ctx.get_json(&format!("/api/orders/{order_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["id"], order_id.as_str());
    assert_eq!(body["order"]["isPaid"], false);
    assert_eq!(body["order"]["itemCount"], 2);
    assert_eq!(body["order"]["total"], "EGP 450.00");
}

#[tokio::test]
async fn test_checkout_with_empty_cart() {
    let ctx = TestContext::new().await;
    ctx.login().await;

    let (status, body) = ctx
        .post_json(
            "/api/checkout",
            &json!({"shippingAddress": shipping_address(), "paymentMethod": "cash"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Your cart is empty");
    assert_eq!(ctx.api.request_count("POST /orders"), 0);
}

#[tokio::test]
async fn test_checkout_validates_address_first() {
    let ctx = signed_in_with_cart().await;
    ctx.api.clear_requests();

    let (status, body) = ctx
        .post_json(
            "/api/checkout",
            &json!({
                "shippingAddress": {"details": "12 Nile Street", "phone": "12345", "city": ""},
                "paymentMethod": "card",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Validation failed");

    let fields: Vec<&str> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"phone"));
    assert!(fields.contains(&"city"));
    assert!(ctx.api.requests().is_empty());
}

#[tokio::test]
async fn test_checkout_requires_login() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .post_json(
            "/api/checkout",
            &json!({"shippingAddress": shipping_address(), "paymentMethod": "cash"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_order_history_page() {
    let ctx = TestContext::new().await;
    ctx.login().await;
    let old = ctx
        .api
        .seed_order(&ctx.user_id, &[(SHAWL, 1)], true, true, "2024-01-10T10:00:00Z");
    let recent = ctx
        .api
        .seed_order(&ctx.user_id, &[(WATCH, 2)], false, false, "2024-06-01T10:00:00Z");

    let (status, page) = ctx.get_json("/en/allorders").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["title"], "My Orders");
    assert_eq!(page["filter"], "all");
    assert_eq!(page["stats"]["total"], 2);
    assert_eq!(page["stats"]["paid"], 1);
    assert_eq!(page["stats"]["unpaid"], 1);
    assert_eq!(page["stats"]["totalSpent"], "EGP 100.00");

    let ids: Vec<&str> = page["orders"]
        .as_array()
        .unwrap()
        .iter()
        .map(|o| o["id"].as_str().unwrap())
        .collect();
    assert_eq!(ids, [recent.as_str(), old.as_str()]);

    let (_, page) = ctx.get_json("/en/allorders?filter=paid").await;
    assert_eq!(page["orders"].as_array().unwrap().len(), 1);
    assert_eq!(page["orders"][0]["id"], old.as_str());
    assert_eq!(page["stats"]["total"], 2);
}

#[tokio::test]
async fn test_orders_api_pagination() {
    let ctx = TestContext::new().await;
    ctx.login().await;
    for day in 1..=3 {
        ctx.api.seed_order(
            &ctx.user_id,
            &[(SHAWL, 1)],
            true,
            false,
            &format!("2024-03-0{day}T08:00:00Z"),
        );
    }

    let (status, body) = ctx.get_json("/api/orders?page=2&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["orders"].as_array().unwrap().len(), 1);
    assert_eq!(body["pagination"]["currentPage"], 2);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["pagination"]["hasPrev"], true);
    assert_eq!(body["pagination"]["hasNext"], false);
}

#[tokio::test]
async fn test_order_detail_page_and_missing_order() {
    let ctx = TestContext::new().await;
    ctx.login().await;
    let id = ctx
        .api
        .seed_order(&ctx.user_id, &[(WATCH, 1)], true, true, "2024-02-02T12:00:00Z");

    let (status, page) = ctx.get_json(&format!("/ar/orders/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["dir"], "rtl");
    assert_eq!(page["order"]["isDelivered"], true);
    assert_eq!(page["order"]["detailUrl"], format!("/ar/orders/{id}"));

    let (status, _) = ctx.get_json("/api/orders/ord-missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
