//! Integration tests for catalog pages and health checks.
//!
//! Run with: cargo test -p bazaar-integration-tests --test catalog

#![allow(clippy::unwrap_used)]

use bazaar_integration_tests::{PHONE, SHAWL, TestContext, WATCH};
use reqwest::StatusCode;
use serde_json::Value;

fn ids(list: &Value) -> Vec<&str> {
    list.as_array()
        .unwrap()
        .iter()
        .map(|item| item["id"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_home_page() {
    let ctx = TestContext::new().await;

    let (status, page) = ctx.get_json("/en").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["title"], "Home");
    assert_eq!(page["featuredProducts"].as_array().unwrap().len(), 3);
    assert_eq!(page["categories"].as_array().unwrap().len(), 3);

    let requests = ctx.api.requests();
    assert!(requests.iter().any(|r| r.starts_with("GET /products?") && r.contains("sort=-sold")));
}

#[tokio::test]
async fn test_product_listing_and_filters() {
    let ctx = TestContext::new().await;

    let (status, page) = ctx.get_json("/en/products").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ids(&page["products"]), [SHAWL, WATCH, PHONE]);
    assert_eq!(page["pagination"]["currentPage"], 1);
    assert_eq!(page["pagination"]["hasNext"], false);

    let (_, page) = ctx.get_json("/en/products?category=cat-women").await;
    assert_eq!(ids(&page["products"]), [SHAWL]);
    assert_eq!(page["filters"]["category"], "cat-women");

    let (_, page) = ctx.get_json("/en/products?keyword=watch").await;
    assert_eq!(ids(&page["products"]), [WATCH]);

    let (_, page) = ctx.get_json("/en/products?minPrice=200&maxPrice=1000").await;
    assert_eq!(ids(&page["products"]), [WATCH]);

    // Blank filters are dropped rather than sent upstream. The odd limit
    // keeps this query out of the catalog cache.
    ctx.api.clear_requests();
    ctx.get_json("/en/products?category=&brand=&keyword=&limit=7").await;
    let request = ctx.api.requests().pop().unwrap();
    assert!(!request.contains("category="));
    assert!(!request.contains("keyword="));
}

#[tokio::test]
async fn test_product_listing_pagination() {
    let ctx = TestContext::new().await;

    let (_, page) = ctx.get_json("/en/products?page=2&limit=2").await;
    assert_eq!(ids(&page["products"]), [PHONE]);
    assert_eq!(page["pagination"]["currentPage"], 2);
    assert_eq!(page["pagination"]["totalPages"], 2);
    assert_eq!(page["pagination"]["hasPrev"], true);
}

#[tokio::test]
async fn test_product_cards_show_discount_and_stock() {
    let ctx = TestContext::new().await;

    let (_, page) = ctx.get_json("/en/products").await;
    let watch = &page["products"][1];
    assert_eq!(watch["price"], "EGP 200.00");
    assert_eq!(watch["originalPrice"], "EGP 250.00");
    assert_eq!(watch["inStock"], true);

    let phone = &page["products"][2];
    assert!(phone.get("originalPrice").is_none());
    assert_eq!(phone["inStock"], false);
}

#[tokio::test]
async fn test_product_detail() {
    let ctx = TestContext::new().await;

    let (status, page) = ctx.get_json(&format!("/en/products/{SHAWL}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["product"]["id"], SHAWL);
    assert_eq!(page["product"]["title"], "Wool Shawl");
    assert_eq!(page["product"]["description"], "Hand-woven wool shawl");
    assert_eq!(page["product"]["category"]["name"], "Women's Fashion");
    // The only product in its category.
    assert_eq!(page["related"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let ctx = TestContext::new().await;

    let (status, body) = ctx.get_json("/en/products/prod-missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_categories_and_subcategories() {
    let ctx = TestContext::new().await;

    let (status, page) = ctx.get_json("/en/categories").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["title"], "Categories");
    assert_eq!(page["categories"][0]["id"], "cat-women");
    assert_eq!(
        page["categories"][0]["productsUrl"],
        "/en/products?category=cat-women"
    );

    let (status, page) = ctx.get_json("/en/categories/cat-women/subcategories").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["category"]["id"], "cat-women");
    assert_eq!(ids(&page["subcategories"]), ["sub-scarves", "sub-bags"]);
}

#[tokio::test]
async fn test_brands_page() {
    let ctx = TestContext::new().await;

    let (status, page) = ctx.get_json("/ar/brands").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["title"], "العلامات التجارية");
    assert_eq!(ids(&page["brands"]), ["brand-nile", "brand-delta"]);
    assert_eq!(page["brands"][0]["productsUrl"], "/ar/products?brand=brand-nile");
}

#[tokio::test]
async fn test_health_checks() {
    let ctx = TestContext::new().await;

    let response = ctx.get("/health").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "ok");

    let (status, body) = ctx.get_json("/health/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}
