//! Integration tests for the cart API and cart page.
//!
//! Run with: cargo test -p bazaar-integration-tests --test cart

#![allow(clippy::unwrap_used)]

use std::sync::Arc;
use std::time::Duration;

use bazaar_integration_tests::{PHONE, SHAWL, TestContext, WATCH};
use reqwest::StatusCode;
use serde_json::json;

async fn signed_in() -> TestContext {
    let ctx = TestContext::new().await;
    let (status, _) = ctx.login().await;
    assert_eq!(status, StatusCode::OK);
    ctx
}

#[tokio::test]
async fn test_missing_cart_reads_as_empty() {
    let ctx = signed_in().await;

    let (status, body) = ctx.get_json("/api/cart").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"]["isEmpty"], true);
    assert_eq!(body["cart"]["itemCount"], 0);
    assert_eq!(body["cart"]["emptyMessage"], "Your cart is empty");
    assert_eq!(body["cart"]["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_add_returns_populated_cart() {
    let ctx = signed_in().await;

    let (status, body) = ctx
        .post_json("/api/cart/add", &json!({"productId": SHAWL}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product added to cart");

    let cart = &body["cart"];
    assert_eq!(cart["itemCount"], 1);
    assert_eq!(cart["items"][0]["productId"], SHAWL);
    assert_eq!(cart["items"][0]["title"], "Wool Shawl");
    assert_eq!(cart["total"], "EGP 100.00");
    assert_eq!(ctx.api.cart_lines(&ctx.user_id), vec![(SHAWL.to_string(), 1)]);
}

#[tokio::test]
async fn test_add_with_quantity_sets_count() {
    let ctx = signed_in().await;

    let (status, body) = ctx
        .post_json("/api/cart/add", &json!({"productId": WATCH, "quantity": 3}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"]["items"][0]["count"], 3);
    assert_eq!(body["cart"]["unitCount"], 3);
    assert_eq!(ctx.api.cart_lines(&ctx.user_id), vec![(WATCH.to_string(), 3)]);
}

#[tokio::test]
async fn test_update_remove_and_clear() {
    let ctx = signed_in().await;
    ctx.api.set_cart(&ctx.user_id, &[(SHAWL, 1), (WATCH, 1)]);

    let (status, body) = ctx
        .put_json(&format!("/api/cart/{WATCH}"), &json!({"count": 2}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Cart updated");
    assert_eq!(body["cart"]["total"], "EGP 600.00");

    let (status, body) = ctx.delete_json(&format!("/api/cart/{SHAWL}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Product removed from cart");
    assert_eq!(body["cart"]["itemCount"], 1);
    assert_eq!(body["cart"]["items"][0]["productId"], WATCH);

    let (status, body) = ctx.delete_json("/api/cart").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Cart cleared");
    assert_eq!(body["cart"]["isEmpty"], true);
    assert!(ctx.api.cart_lines(&ctx.user_id).is_empty());
}

#[tokio::test]
async fn test_count_served_from_snapshot() {
    let ctx = signed_in().await;
    ctx.post_json("/api/cart/add", &json!({"productId": SHAWL}))
        .await;
    ctx.post_json("/api/cart/add", &json!({"productId": PHONE}))
        .await;
    ctx.api.clear_requests();

    let (status, body) = ctx.get_json("/api/cart/count").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 2);
    assert_eq!(ctx.api.request_count("GET /cart"), 0);
}

#[tokio::test]
async fn test_fetch_after_mutation_sees_mutation() {
    let ctx = signed_in().await;
    ctx.post_json("/api/cart/add", &json!({"productId": SHAWL}))
        .await;
    ctx.put_json(&format!("/api/cart/{SHAWL}"), &json!({"count": 4}))
        .await;

    let (_, body) = ctx.get_json("/api/cart").await;
    assert_eq!(body["cart"]["items"][0]["count"], 4);
    let (_, body) = ctx.get_json("/api/cart/count").await;
    assert_eq!(body["count"], 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_adds_are_all_applied() {
    const ADDS: u32 = 8;
    let ctx = Arc::new(signed_in().await);

    // Each add is an upstream add plus a count update; interleaving two of
    // them would lose units.
    let tasks: Vec<_> = (0..ADDS)
        .map(|_| {
            let ctx = Arc::clone(&ctx);
            tokio::spawn(async move {
                ctx.post_json("/api/cart/add", &json!({"productId": SHAWL, "quantity": 2}))
                    .await
            })
        })
        .collect();
    for task in tasks {
        let (status, _) = task.await.unwrap();
        assert_eq!(status, StatusCode::OK);
    }

    assert_eq!(
        ctx.api.cart_lines(&ctx.user_id),
        vec![(SHAWL.to_string(), 2 * ADDS)]
    );
    let (_, body) = ctx.get_json("/api/cart").await;
    assert_eq!(body["cart"]["unitCount"], 2 * ADDS);
}

#[tokio::test]
async fn test_slow_fetch_does_not_undo_concurrent_add() {
    let ctx = Arc::new(signed_in().await);
    ctx.api.set_cart(&ctx.user_id, &[(SHAWL, 1)]);
    ctx.api.delay_next_cart_fetch(Duration::from_millis(400));

    // This read sees only the shawl but answers after the add below.
    let slow_read = {
        let ctx = Arc::clone(&ctx);
        tokio::spawn(async move { ctx.get_json("/api/cart").await })
    };
    tokio::time::sleep(Duration::from_millis(150)).await;

    let (status, body) = ctx
        .post_json("/api/cart/add", &json!({"productId": WATCH}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"]["itemCount"], 2);

    let (status, body) = slow_read.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cart"]["itemCount"], 2);

    ctx.api.clear_requests();
    let (_, body) = ctx.get_json("/api/cart/count").await;
    assert_eq!(body["count"], 2);
    assert_eq!(ctx.api.request_count("GET /cart"), 0);
}

#[tokio::test]
async fn test_invalid_quantities_rejected() {
    let ctx = signed_in().await;

    let (status, body) = ctx
        .post_json("/api/cart/add", &json!({"productId": SHAWL, "quantity": 0}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Quantity must be greater than zero");

    let (status, body) = ctx
        .put_json(&format!("/api/cart/{SHAWL}"), &json!({"count": -1}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Count must be greater than zero");

    let (status, body) = ctx.post_json("/api/cart/add", &json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Product ID is required");

    assert_eq!(ctx.api.request_count("POST /cart"), 0);
    assert_eq!(ctx.api.request_count("PUT /cart"), 0);
}

#[tokio::test]
async fn test_unknown_product_passes_through_404() {
    let ctx = signed_in().await;

    let (status, body) = ctx
        .post_json("/api/cart/add", &json!({"productId": "prod-missing"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_upstream_failure_is_bad_gateway() {
    let ctx = signed_in().await;
    ctx.api.fail_next_cart_fetch(500);

    let (status, body) = ctx.get_json("/api/cart").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["message"], "External service error");

    let (status, _) = ctx.get_json("/api/cart").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_cart_page_in_arabic() {
    let ctx = signed_in().await;
    ctx.api.set_cart(&ctx.user_id, &[(PHONE, 1)]);

    let (status, page) = ctx.get_json("/ar/cart").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["locale"], "ar");
    assert_eq!(page["dir"], "rtl");
    assert_eq!(page["title"], "سلة التسوق");
    assert_eq!(page["cart"]["total"], "1,500.00 ج.م");
}
