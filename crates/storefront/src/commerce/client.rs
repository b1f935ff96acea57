//! Commerce REST API client implementation.
//!
//! Uses `reqwest` 0.13 for HTTP with JSON bodies. Caches catalog reads using
//! `moka` (5-minute TTL).

use std::sync::Arc;
use std::time::Duration;

use bazaar_core::{CartId, CategoryId, OrderId, ProductId, ShippingAddress, UserId};
use moka::future::Cache;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use super::CommerceError;
use super::cache::CacheValue;
use super::types::{
    AddToCartRequest, ApiErrorBody, AuthResponse, Brand, Cart, CartResponse, Category,
    CheckoutRequest, CheckoutSession, CheckoutSessionResponse, DataEnvelope, ListResponse, Order,
    OrderEnvelope, Product, ProductQuery, SignInRequest, SignUpRequest, Subcategory,
    UpdateCountRequest, clamp_limit,
};
use crate::config::CommerceApiConfig;

/// Header the API reads the customer token from.
const TOKEN_HEADER: &str = "token";

/// Longest response body excerpt written to logs.
const LOG_BODY_LIMIT: usize = 500;

// =============================================================================
// CommerceClient
// =============================================================================

/// Client for the commerce REST API.
///
/// Cheap to clone; all clones share one connection pool and catalog cache.
#[derive(Clone)]
pub struct CommerceClient {
    inner: Arc<CommerceClientInner>,
}

struct CommerceClientInner {
    client: reqwest::Client,
    base_url: String,
    cache: Cache<String, CacheValue>,
}

impl CommerceClient {
    /// Create a new commerce API client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: &CommerceApiConfig) -> Result<Self, CommerceError> {
        let cache = Cache::builder()
            .max_capacity(1000)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("bazaar-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            inner: Arc::new(CommerceClientInner {
                client,
                base_url: config.base_url.trim_end_matches('/').to_string(),
                cache,
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.inner.base_url)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.inner.client.get(self.url(path))
    }

    fn authed(&self, method: reqwest::Method, path: &str, token: &str) -> RequestBuilder {
        self.inner
            .client
            .request(method, self.url(path))
            .header(TOKEN_HEADER, token)
    }

    /// Send a request and return the body of a successful response.
    async fn execute(&self, request: RequestBuilder) -> Result<String, CommerceError> {
        let response = request.send().await?;
        let status = response.status();

        // Check for rate limiting
        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse::<u64>().ok())
                .unwrap_or(1);
            tracing::warn!(retry_after, "Commerce API rate limited the storefront");
            return Err(CommerceError::RateLimited(retry_after));
        }

        // Get response body as text first for better error diagnostics
        let body = response.text().await?;

        if status.is_server_error() {
            tracing::error!(
                status = %status,
                body = %excerpt(&body),
                "Commerce API returned server error"
            );
            return Err(CommerceError::Upstream { status });
        }

        if status.is_client_error() {
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .ok()
                .and_then(ApiErrorBody::best_message)
                .unwrap_or_else(|| {
                    status
                        .canonical_reason()
                        .unwrap_or("Request failed")
                        .to_string()
                });
            debug!(status = %status, message = %message, "Commerce API rejected request");
            return Err(match status {
                StatusCode::UNAUTHORIZED => CommerceError::Unauthorized(message),
                StatusCode::NOT_FOUND => CommerceError::NotFound(message),
                _ => CommerceError::Api { status, message },
            });
        }

        Ok(body)
    }

    /// Send a request and decode the JSON body.
    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, CommerceError> {
        let body = self.execute(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                body = %excerpt(&body),
                "Failed to parse commerce API response"
            );
            CommerceError::Parse(e)
        })
    }

    // =========================================================================
    // Auth Methods
    // =========================================================================

    /// Exchange credentials for a token.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` or `Api` when the credentials are rejected.
    #[instrument(skip(self, password))]
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<AuthResponse, CommerceError> {
        let request = self
            .inner
            .client
            .post(self.url("/auth/signin"))
            .json(&SignInRequest { email, password });
        self.fetch(request).await
    }

    /// Create a customer account.
    ///
    /// # Errors
    ///
    /// Returns `Api` when the API rejects the registration (e.g. existing account).
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn sign_up(&self, request: &SignUpRequest<'_>) -> Result<AuthResponse, CommerceError> {
        let request = self.inner.client.post(self.url("/auth/signup")).json(request);
        self.fetch(request).await
    }

    // =========================================================================
    // Catalog Methods
    // =========================================================================

    /// Get a page of products.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_products(
        &self,
        query: &ProductQuery,
    ) -> Result<ListResponse<Product>, CommerceError> {
        let query = query.clone().normalized();
        let cache_key = query.cache_key();

        // Check cache
        if let Some(CacheValue::Products(products)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for products");
            return Ok(products);
        }

        let products: ListResponse<Product> =
            self.fetch(self.get("/products").query(&query.to_pairs())).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;

        Ok(products)
    }

    /// Get a product by id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the product does not exist.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn get_product(&self, id: &ProductId) -> Result<Product, CommerceError> {
        let cache_key = format!("product:{id}");

        // Check cache
        if let Some(CacheValue::Product(product)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for product");
            return Ok(*product);
        }

        let envelope: DataEnvelope<Option<Product>> = self
            .fetch(self.get(&format!("/products/{}", urlencoding::encode(id.as_str()))))
            .await?;
        let product = envelope
            .data
            .ok_or_else(|| CommerceError::NotFound(format!("Product not found: {id}")))?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;

        Ok(product)
    }

    /// Get all categories.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_categories(&self) -> Result<ListResponse<Category>, CommerceError> {
        let cache_key = "categories".to_string();

        if let Some(CacheValue::Categories(categories)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for categories");
            return Ok(categories);
        }

        let categories: ListResponse<Category> = self.fetch(self.get("/categories")).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;

        Ok(categories)
    }

    /// Get the subcategories of a category.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(category_id = %category_id))]
    pub async fn get_subcategories(
        &self,
        category_id: &CategoryId,
    ) -> Result<ListResponse<Subcategory>, CommerceError> {
        let cache_key = format!("subcategories:{category_id}");

        if let Some(CacheValue::Subcategories(subcategories)) =
            self.inner.cache.get(&cache_key).await
        {
            debug!("Cache hit for subcategories");
            return Ok(subcategories);
        }

        let path = format!(
            "/categories/{}/subcategories",
            urlencoding::encode(category_id.as_str())
        );
        let subcategories: ListResponse<Subcategory> = self.fetch(self.get(&path)).await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Subcategories(subcategories.clone()))
            .await;

        Ok(subcategories)
    }

    /// Get a page of brands.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self))]
    pub async fn get_brands(
        &self,
        page: u32,
        limit: u32,
    ) -> Result<ListResponse<Brand>, CommerceError> {
        let page = page.max(1);
        let limit = clamp_limit(limit);
        let cache_key = format!("brands:{page}:{limit}");

        if let Some(CacheValue::Brands(brands)) = self.inner.cache.get(&cache_key).await {
            debug!("Cache hit for brands");
            return Ok(brands);
        }

        let brands: ListResponse<Brand> = self
            .fetch(self.get("/brands").query(&[("page", page), ("limit", limit)]))
            .await?;

        self.inner
            .cache
            .insert(cache_key, CacheValue::Brands(brands.clone()))
            .await;

        Ok(brands)
    }

    // =========================================================================
    // Cart Methods (never cached)
    // =========================================================================

    /// Get the customer's cart. A customer with no cart gets an empty one.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn get_cart(&self, token: &str) -> Result<Cart, CommerceError> {
        let request = self.authed(reqwest::Method::GET, "/cart", token);
        match self.fetch::<CartResponse>(request).await {
            Ok(response) => Ok(Cart::from(response)),
            Err(CommerceError::NotFound(_)) => {
                debug!("No cart exists yet, treating as empty");
                Ok(Cart::empty())
            }
            Err(e) => Err(e),
        }
    }

    /// Add one unit of a product to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn add_to_cart(
        &self,
        token: &str,
        product_id: &ProductId,
    ) -> Result<Cart, CommerceError> {
        let request = self
            .authed(reqwest::Method::POST, "/cart", token)
            .json(&AddToCartRequest { product_id });
        let response: CartResponse = self.fetch(request).await?;
        Ok(Cart::from(response))
    }

    /// Set the count of a product already in the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn update_cart_count(
        &self,
        token: &str,
        product_id: &ProductId,
        count: u32,
    ) -> Result<Cart, CommerceError> {
        let path = format!("/cart/{}", urlencoding::encode(product_id.as_str()));
        let request = self
            .authed(reqwest::Method::PUT, &path, token)
            .json(&UpdateCountRequest { count });
        let response: CartResponse = self.fetch(request).await?;
        Ok(Cart::from(response))
    }

    /// Remove a product from the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token), fields(product_id = %product_id))]
    pub async fn remove_from_cart(
        &self,
        token: &str,
        product_id: &ProductId,
    ) -> Result<Cart, CommerceError> {
        let path = format!("/cart/{}", urlencoding::encode(product_id.as_str()));
        let request = self.authed(reqwest::Method::DELETE, &path, token);
        let response: CartResponse = self.fetch(request).await?;
        Ok(Cart::from(response))
    }

    /// Delete the whole cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn clear_cart(&self, token: &str) -> Result<(), CommerceError> {
        let request = self.authed(reqwest::Method::DELETE, "/cart", token);
        match self.execute(request).await {
            Ok(_) | Err(CommerceError::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        }
    }

    // =========================================================================
    // Order Methods (never cached)
    // =========================================================================

    /// Get a page of the customer's orders.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token))]
    pub async fn get_orders(
        &self,
        token: &str,
        page: u32,
        limit: u32,
    ) -> Result<ListResponse<Order>, CommerceError> {
        let request = self
            .authed(reqwest::Method::GET, "/orders", token)
            .query(&[("page", page.max(1)), ("limit", clamp_limit(limit))]);
        self.fetch(request).await
    }

    /// Get one order.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the order does not exist.
    #[instrument(skip(self, token), fields(order_id = %order_id))]
    pub async fn get_order(&self, token: &str, order_id: &OrderId) -> Result<Order, CommerceError> {
        let path = format!("/orders/{}", urlencoding::encode(order_id.as_str()));
        let envelope: OrderEnvelope = self
            .fetch(self.authed(reqwest::Method::GET, &path, token))
            .await?;
        Ok(envelope.into())
    }

    /// Get every order a user has placed. No orders yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn get_user_orders(&self, user_id: &UserId) -> Result<Vec<Order>, CommerceError> {
        let path = format!("/orders/user/{}", urlencoding::encode(user_id.as_str()));
        match self.fetch::<Vec<Order>>(self.get(&path)).await {
            Err(CommerceError::NotFound(_)) => Ok(Vec::new()),
            other => other,
        }
    }

    /// Open a hosted card payment session for a cart.
    ///
    /// `return_url` is where the payment provider sends the customer back.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, address), fields(cart_id = %cart_id))]
    pub async fn create_checkout_session(
        &self,
        token: &str,
        cart_id: &CartId,
        return_url: &str,
        address: &ShippingAddress,
    ) -> Result<CheckoutSession, CommerceError> {
        let path = format!(
            "/orders/checkout-session/{}",
            urlencoding::encode(cart_id.as_str())
        );
        let request = self
            .authed(reqwest::Method::POST, &path, token)
            .query(&[("url", return_url)])
            .json(&CheckoutRequest {
                shipping_address: address,
            });
        let response: CheckoutSessionResponse = self.fetch(request).await?;
        Ok(response.session)
    }

    /// Place a cash-on-delivery order for a cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails.
    #[instrument(skip(self, token, address), fields(cart_id = %cart_id))]
    pub async fn create_cash_order(
        &self,
        token: &str,
        cart_id: &CartId,
        address: &ShippingAddress,
    ) -> Result<Order, CommerceError> {
        let path = format!("/orders/{}", urlencoding::encode(cart_id.as_str()));
        let request = self
            .authed(reqwest::Method::POST, &path, token)
            .json(&CheckoutRequest {
                shipping_address: address,
            });
        let envelope: OrderEnvelope = self.fetch(request).await?;
        Ok(envelope.into())
    }
}

/// First characters of a response body, for logs.
fn excerpt(body: &str) -> String {
    body.chars().take(LOG_BODY_LIMIT).collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_url_joins_without_double_slash() {
        let client = CommerceClient::new(&CommerceApiConfig {
            base_url: "https://api.example.test/v1/".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap();
        assert_eq!(client.url("/cart"), "https://api.example.test/v1/cart");
    }

    #[test]
    fn test_excerpt_truncates() {
        let body = "x".repeat(LOG_BODY_LIMIT + 20);
        assert_eq!(excerpt(&body).len(), LOG_BODY_LIMIT);
        assert_eq!(excerpt("short"), "short");
    }
}
