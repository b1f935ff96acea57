//! Integration tests for the Bazaar storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bazaar-integration-tests
//! ```
//!
//! Nothing external is needed: each test starts an in-process fake of the
//! commerce API ([`FakeCommerceApi`]) and a storefront wired to it
//! ([`TestContext`]), both on random local ports.
//!
//! # Test Categories
//!
//! - `auth` - Login, registration, logout, token expiry
//! - `cart` - Cart operations and snapshot consistency
//! - `checkout` - Card and cash checkout, order history
//! - `catalog` - Product, category and brand views
//! - `locale` - Locale prefix routing and negotiation

#![allow(clippy::missing_panics_doc, clippy::expect_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use bazaar_core::Locale;
use bazaar_storefront::app::{RateLimits, build_router};
use bazaar_storefront::config::{CommerceApiConfig, LogFormat, StorefrontConfig};
use bazaar_storefront::state::AppState;
use secrecy::SecretString;
use serde_json::{Value, json};

// =============================================================================
// Fixtures
// =============================================================================

/// Customer every [`TestContext`] registers with the fake API.
pub const CUSTOMER_NAME: &str = "Mona Adel";
pub const CUSTOMER_EMAIL: &str = "mona@example.com";
pub const CUSTOMER_PASSWORD: &str = "Passw0rd1";

/// Catalog product ids.
pub const SHAWL: &str = "prod-shawl";
pub const WATCH: &str = "prod-watch";
pub const PHONE: &str = "prod-phone";

/// A valid shipping address body.
#[must_use]
pub fn shipping_address() -> Value {
    json!({"details": "12 Nile Street, Apt 4", "phone": "01012345678", "city": "Cairo"})
}

const TEST_SESSION_SECRET: &str =
    "integration-session-secret-7f3a9c1e5b2d4f6a8c0e2b4d6f8a1c3e5b7d9f0a2c4e6b8d0f1e3c5a7b9";

/// Build an unsigned JWT-shaped token carrying the given claims.
#[must_use]
pub fn make_token(claims: &Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.fake-signature")
}

fn catalog() -> Vec<Value> {
    vec![
        json!({
            "_id": SHAWL,
            "title": "Wool Shawl",
            "slug": "wool-shawl",
            "description": "Hand-woven wool shawl",
            "quantity": 10,
            "price": 100,
            "imageCover": "https://cdn.example/shawl.jpeg",
            "images": ["https://cdn.example/shawl-1.jpeg"],
            "category": {"_id": "cat-women", "name": "Women's Fashion", "slug": "womens-fashion"},
            "brand": {"_id": "brand-nile", "name": "Nile", "slug": "nile"},
            "subcategory": [{"_id": "sub-scarves", "name": "Scarves", "slug": "scarves", "category": "cat-women"}],
            "ratingsAverage": 4.5,
            "ratingsQuantity": 12,
            "sold": 30
        }),
        json!({
            "_id": WATCH,
            "title": "Steel Watch",
            "slug": "steel-watch",
            "quantity": 5,
            "price": 250,
            "priceAfterDiscount": 200,
            "imageCover": "https://cdn.example/watch.jpeg",
            "category": {"_id": "cat-men", "name": "Men's Fashion", "slug": "mens-fashion"},
            "brand": {"_id": "brand-delta", "name": "Delta", "slug": "delta"},
            "ratingsAverage": 4.1,
            "ratingsQuantity": 3
        }),
        json!({
            "_id": PHONE,
            "title": "Phone X",
            "slug": "phone-x",
            "quantity": 0,
            "price": 1500,
            "imageCover": "https://cdn.example/phone.jpeg",
            "category": {"_id": "cat-electronics", "name": "Electronics", "slug": "electronics"},
            "brand": {"_id": "brand-delta", "name": "Delta", "slug": "delta"},
            "ratingsAverage": 3.9
        }),
    ]
}

fn categories() -> Vec<Value> {
    vec![
        json!({"_id": "cat-women", "name": "Women's Fashion", "slug": "womens-fashion", "image": "https://cdn.example/women.png"}),
        json!({"_id": "cat-men", "name": "Men's Fashion", "slug": "mens-fashion", "image": "https://cdn.example/men.png"}),
        json!({"_id": "cat-electronics", "name": "Electronics", "slug": "electronics"}),
    ]
}

fn subcategories() -> Vec<Value> {
    vec![
        json!({"_id": "sub-scarves", "name": "Scarves", "slug": "scarves", "category": "cat-women"}),
        json!({"_id": "sub-bags", "name": "Bags", "slug": "bags", "category": "cat-women"}),
        json!({"_id": "sub-watches", "name": "Watches", "slug": "watches", "category": "cat-men"}),
    ]
}

fn brands() -> Vec<Value> {
    vec![
        json!({"_id": "brand-nile", "name": "Nile", "slug": "nile"}),
        json!({"_id": "brand-delta", "name": "Delta", "slug": "delta"}),
    ]
}

fn find_product(id: &str) -> Option<Value> {
    catalog().into_iter().find(|p| p["_id"] == id)
}

fn unit_price(product: &Value) -> i64 {
    product["price"].as_i64().unwrap_or(0)
}

/// The product fields the API populates on cart and order lines.
fn line_summary(product: &Value) -> Value {
    json!({
        "_id": product["_id"],
        "title": product["title"],
        "imageCover": product["imageCover"],
        "quantity": product["quantity"],
        "category": product["category"],
        "brand": product["brand"],
        "ratingsAverage": product["ratingsAverage"],
    })
}

fn lines_json(lines: &[(String, u32)], hydrated: bool) -> (Vec<Value>, i64) {
    let mut total = 0;
    let products = lines
        .iter()
        .enumerate()
        .filter_map(|(i, (id, count))| {
            let product = find_product(id)?;
            let price = unit_price(&product);
            total += price * i64::from(*count);
            Some(json!({
                "_id": format!("line-{i}-{id}"),
                "count": count,
                "price": price,
                "product": if hydrated { line_summary(&product) } else { json!(id) },
            }))
        })
        .collect();
    (products, total)
}

fn cart_id_for(user_id: &str) -> String {
    format!("cart-{user_id}")
}

fn paginate(items: Vec<Value>, params: &HashMap<String, String>, default_limit: usize) -> Value {
    let limit = params
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .filter(|l| *l > 0)
        .unwrap_or(default_limit);
    let page = params
        .get("page")
        .and_then(|p| p.parse::<usize>().ok())
        .filter(|p| *p > 0)
        .unwrap_or(1);
    let total = items.len();
    let data: Vec<Value> = items.into_iter().skip((page - 1) * limit).take(limit).collect();
    json!({
        "results": data.len(),
        "metadata": {
            "currentPage": page,
            "numberOfPages": total.div_ceil(limit).max(1),
            "limit": limit,
        },
        "data": data,
    })
}

// =============================================================================
// Fake Commerce API
// =============================================================================

/// Which claim carries the user id in issued tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ClaimStyle {
    #[default]
    Id,
    UnderscoreId,
    UserId,
    Missing,
}

#[derive(Debug, Clone)]
struct FakeUser {
    id: String,
    name: String,
    email: String,
    password: String,
}

#[derive(Debug)]
struct FakeState {
    users: Vec<FakeUser>,
    tokens: HashMap<String, String>,
    carts: HashMap<String, Vec<(String, u32)>>,
    orders: HashMap<String, Vec<Value>>,
    requests: Vec<String>,
    claim_style: ClaimStyle,
    token_ttl_secs: i64,
    checkout_return_urls: Vec<String>,
    fail_next_cart_fetch: Option<StatusCode>,
    delay_next_cart_fetch: Option<Duration>,
    next_id: u64,
}

impl Default for FakeState {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            tokens: HashMap::new(),
            carts: HashMap::new(),
            orders: HashMap::new(),
            requests: Vec::new(),
            claim_style: ClaimStyle::default(),
            token_ttl_secs: 3600,
            checkout_return_urls: Vec::new(),
            fail_next_cart_fetch: None,
            delay_next_cart_fetch: None,
            next_id: 1,
        }
    }
}

impl FakeState {
    fn next_id(&mut self, prefix: &str) -> String {
        let id = format!("{prefix}{:04}", self.next_id);
        self.next_id += 1;
        id
    }

    fn issue_token(&mut self, user: &FakeUser) -> String {
        let now = chrono::Utc::now().timestamp();
        let mut claims = json!({
            "name": user.name,
            "role": "user",
            "iat": now,
            "exp": now + self.token_ttl_secs,
        });
        let id_claim = match self.claim_style {
            ClaimStyle::Id => Some("id"),
            ClaimStyle::UnderscoreId => Some("_id"),
            ClaimStyle::UserId => Some("userId"),
            ClaimStyle::Missing => None,
        };
        if let Some(claim) = id_claim {
            claims[claim] = json!(user.id);
        }
        // Distinct tokens per sign-in even within the same second.
        claims["jti"] = json!(self.next_id("t"));
        let token = make_token(&claims);
        self.tokens.insert(token.clone(), user.id.clone());
        token
    }

    fn user_for(&self, headers: &HeaderMap) -> Result<String, Response> {
        headers
            .get("token")
            .and_then(|v| v.to_str().ok())
            .and_then(|token| self.tokens.get(token))
            .cloned()
            .ok_or_else(|| {
                fail(
                    StatusCode::UNAUTHORIZED,
                    "Invalid Token. please login again",
                )
            })
    }

    fn order_json(
        &mut self,
        user_id: &str,
        lines: &[(String, u32)],
        method: &str,
        paid: bool,
        delivered: bool,
        created_at: &str,
        address: &Value,
    ) -> Value {
        let (items, total) = lines_json(lines, true);
        json!({
            "_id": self.next_id("ord"),
            "user": {"_id": user_id, "name": CUSTOMER_NAME, "email": CUSTOMER_EMAIL},
            "cartItems": items,
            "shippingAddress": address,
            "taxPrice": 0,
            "shippingPrice": 0,
            "totalOrderPrice": total,
            "paymentMethodType": method,
            "isPaid": paid,
            "isDelivered": delivered,
            "createdAt": created_at,
        })
    }
}

type Shared = Arc<Mutex<FakeState>>;

fn fail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"statusMsg": "fail", "message": message}))).into_response()
}

fn lock(state: &Shared) -> MutexGuard<'_, FakeState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// In-process stand-in for the external commerce REST API.
#[derive(Clone)]
pub struct FakeCommerceApi {
    base_url: String,
    state: Shared,
}

impl FakeCommerceApi {
    /// Start the fake on a random local port.
    pub async fn start() -> Self {
        let state: Shared = Arc::new(Mutex::new(FakeState::default()));

        let app = Router::new()
            .route("/auth/signin", post(sign_in))
            .route("/auth/signup", post(sign_up))
            .route("/products", get(list_products))
            .route("/products/{id}", get(get_product))
            .route("/categories", get(list_categories))
            .route("/categories/{id}/subcategories", get(list_subcategories))
            .route("/brands", get(list_brands))
            .route("/cart", get(get_cart).post(add_to_cart).delete(clear_cart))
            .route("/cart/{id}", put(update_count).delete(remove_line))
            .route("/orders", get(list_orders))
            .route("/orders/user/{id}", get(user_orders))
            .route("/orders/checkout-session/{id}", post(checkout_session))
            .route("/orders/{id}", get(get_order).post(cash_order))
            .layer(middleware::from_fn_with_state(state.clone(), record_request))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind fake commerce api");
        let addr = listener.local_addr().expect("fake api address");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake commerce api");
        });

        Self {
            base_url: format!("http://{addr}"),
            state,
        }
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Register a customer directly; returns their id.
    pub fn add_user(&self, name: &str, email: &str, password: &str) -> String {
        let mut state = lock(&self.state);
        let id = state.next_id("user");
        state.users.push(FakeUser {
            id: id.clone(),
            name: name.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        });
        id
    }

    pub fn set_claim_style(&self, style: ClaimStyle) {
        lock(&self.state).claim_style = style;
    }

    /// Lifetime of tokens issued from now on; negative issues expired tokens.
    pub fn set_token_ttl(&self, secs: i64) {
        lock(&self.state).token_ttl_secs = secs;
    }

    /// Replace a customer's cart.
    pub fn set_cart(&self, user_id: &str, lines: &[(&str, u32)]) {
        lock(&self.state).carts.insert(
            user_id.to_string(),
            lines.iter().map(|(id, n)| ((*id).to_string(), *n)).collect(),
        );
    }

    /// A customer's cart lines as `(product id, count)`.
    #[must_use]
    pub fn cart_lines(&self, user_id: &str) -> Vec<(String, u32)> {
        lock(&self.state)
            .carts
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Add a past order for a customer; returns its id.
    pub fn seed_order(
        &self,
        user_id: &str,
        lines: &[(&str, u32)],
        paid: bool,
        delivered: bool,
        created_at: &str,
    ) -> String {
        let lines: Vec<(String, u32)> = lines
            .iter()
            .map(|(id, n)| ((*id).to_string(), *n))
            .collect();
        let mut state = lock(&self.state);
        let method = if paid { "card" } else { "cash" };
        let order = state.order_json(
            user_id,
            &lines,
            method,
            paid,
            delivered,
            created_at,
            &shipping_address(),
        );
        let id = order["_id"].as_str().unwrap_or_default().to_string();
        state
            .orders
            .entry(user_id.to_string())
            .or_default()
            .push(order);
        id
    }

    /// Every request seen, as `"METHOD /path?query"`.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        lock(&self.state).requests.clone()
    }

    /// How many requests started with `prefix` (e.g. `"GET /cart"`).
    #[must_use]
    pub fn request_count(&self, prefix: &str) -> usize {
        lock(&self.state)
            .requests
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }

    pub fn clear_requests(&self) {
        lock(&self.state).requests.clear();
    }

    /// `url` parameters sent to the checkout-session endpoint.
    #[must_use]
    pub fn checkout_return_urls(&self) -> Vec<String> {
        lock(&self.state).checkout_return_urls.clone()
    }

    /// Make the next `GET /cart` answer with this status.
    pub fn fail_next_cart_fetch(&self, status: u16) {
        lock(&self.state).fail_next_cart_fetch = StatusCode::from_u16(status).ok();
    }

    /// Hold the next `GET /cart` response for `delay`. The cart is read
    /// before the wait, so writes during it are not reflected.
    pub fn delay_next_cart_fetch(&self, delay: Duration) {
        lock(&self.state).delay_next_cart_fetch = Some(delay);
    }
}

async fn record_request(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let line = format!("{} {}", request.method(), request.uri());
    lock(&state).requests.push(line);
    next.run(request).await
}

// -----------------------------------------------------------------------------
// Auth
// -----------------------------------------------------------------------------

async fn sign_in(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();

    let mut state = lock(&state);
    let Some(user) = state
        .users
        .iter()
        .find(|u| u.email == email && u.password == password)
        .cloned()
    else {
        return fail(StatusCode::UNAUTHORIZED, "Incorrect email or password");
    };

    let token = state.issue_token(&user);
    Json(json!({
        "message": "success",
        "user": {"name": user.name, "email": user.email, "role": "user"},
        "token": token,
    }))
    .into_response()
}

async fn sign_up(State(state): State<Shared>, Json(body): Json<Value>) -> Response {
    let email = body["email"].as_str().unwrap_or_default().to_string();
    let name = body["name"].as_str().unwrap_or_default().to_string();
    let password = body["password"].as_str().unwrap_or_default().to_string();

    if body["rePassword"] != body["password"] {
        return fail(StatusCode::BAD_REQUEST, "Password and rePassword do not match");
    }

    let mut state = lock(&state);
    if state.users.iter().any(|u| u.email == email) {
        return fail(StatusCode::CONFLICT, "Account Already Exists");
    }
    let user = FakeUser {
        id: state.next_id("user"),
        name,
        email,
        password,
    };
    state.users.push(user.clone());
    let token = state.issue_token(&user);

    (
        StatusCode::CREATED,
        Json(json!({
            "message": "success",
            "user": {"name": user.name, "email": user.email, "role": "user"},
            "token": token,
        })),
    )
        .into_response()
}

// -----------------------------------------------------------------------------
// Catalog
// -----------------------------------------------------------------------------

async fn list_products(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let keyword = params.get("keyword").map(|k| k.to_lowercase());
    let min = params.get("price[gte]").and_then(|v| v.parse::<i64>().ok());
    let max = params.get("price[lte]").and_then(|v| v.parse::<i64>().ok());

    let products: Vec<Value> = catalog()
        .into_iter()
        .filter(|p| params.get("category").is_none_or(|c| p["category"]["_id"] == c.as_str()))
        .filter(|p| params.get("brand").is_none_or(|b| p["brand"]["_id"] == b.as_str()))
        .filter(|p| {
            keyword.as_ref().is_none_or(|k| {
                p["title"]
                    .as_str()
                    .is_some_and(|t| t.to_lowercase().contains(k))
            })
        })
        .filter(|p| min.is_none_or(|m| unit_price(p) >= m))
        .filter(|p| max.is_none_or(|m| unit_price(p) <= m))
        .collect();

    Json(paginate(products, &params, 40))
}

async fn get_product(Path(id): Path<String>) -> Response {
    find_product(&id).map_or_else(
        || fail(StatusCode::NOT_FOUND, &format!("No product for this id {id}")),
        |product| Json(json!({"data": product})).into_response(),
    )
}

async fn list_categories() -> Json<Value> {
    Json(paginate(categories(), &HashMap::new(), 40))
}

async fn list_subcategories(Path(id): Path<String>) -> Json<Value> {
    let subs: Vec<Value> = subcategories()
        .into_iter()
        .filter(|s| s["category"] == id.as_str())
        .collect();
    Json(paginate(subs, &HashMap::new(), 40))
}

async fn list_brands(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    Json(paginate(brands(), &params, 40))
}

// -----------------------------------------------------------------------------
// Cart
// -----------------------------------------------------------------------------

fn cart_response(user_id: &str, lines: &[(String, u32)], hydrated: bool, message: Option<&str>) -> Value {
    let (products, total) = lines_json(lines, hydrated);
    let cart_id = cart_id_for(user_id);
    json!({
        "status": "success",
        "message": message,
        "numOfCartItems": lines.len(),
        "cartId": cart_id,
        "data": {
            "_id": cart_id,
            "cartOwner": user_id,
            "products": products,
            "totalCartPrice": total,
        },
    })
}

async fn get_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let (response, delay) = {
        let mut state = lock(&state);
        let delay = state.delay_next_cart_fetch.take();
        (read_cart(&mut state, &headers), delay)
    };
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    response
}

fn read_cart(state: &mut FakeState, headers: &HeaderMap) -> Response {
    if let Some(status) = state.fail_next_cart_fetch.take() {
        return fail(status, "Something went wrong");
    }
    let user_id = match state.user_for(headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    match state.carts.get(&user_id) {
        Some(lines) => Json(cart_response(&user_id, lines, true, None)).into_response(),
        None => fail(
            StatusCode::NOT_FOUND,
            &format!("No cart exist for this user: {user_id}"),
        ),
    }
}

async fn add_to_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    let user_id = match state.user_for(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let product_id = body["productId"].as_str().unwrap_or_default().to_string();
    if find_product(&product_id).is_none() {
        return fail(StatusCode::NOT_FOUND, "No product for this id");
    }

    let lines = state.carts.entry(user_id.clone()).or_default();
    match lines.iter_mut().find(|(id, _)| *id == product_id) {
        Some((_, count)) => *count += 1,
        None => lines.push((product_id, 1)),
    }
    let lines = lines.clone();
    Json(cart_response(
        &user_id,
        &lines,
        false,
        Some("Product added successfully to your cart"),
    ))
    .into_response()
}

async fn update_count(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    let user_id = match state.user_for(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let count = body["count"]
        .as_u64()
        .and_then(|c| u32::try_from(c).ok())
        .unwrap_or(0);

    let Some(lines) = state.carts.get_mut(&user_id) else {
        return fail(StatusCode::NOT_FOUND, "No cart exist for this user");
    };
    let Some(line) = lines.iter_mut().find(|(id, _)| *id == product_id) else {
        return fail(StatusCode::NOT_FOUND, "Product not in cart");
    };
    line.1 = count;
    let lines = lines.clone();
    Json(cart_response(&user_id, &lines, false, None)).into_response()
}

async fn remove_line(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(product_id): Path<String>,
) -> Response {
    let mut state = lock(&state);
    let user_id = match state.user_for(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let lines = state.carts.entry(user_id.clone()).or_default();
    lines.retain(|(id, _)| *id != product_id);
    let lines = lines.clone();
    Json(cart_response(&user_id, &lines, false, None)).into_response()
}

async fn clear_cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let mut state = lock(&state);
    let user_id = match state.user_for(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    if state.carts.remove(&user_id).is_none() {
        return fail(StatusCode::NOT_FOUND, "No cart exist for this user");
    }
    Json(json!({"message": "success"})).into_response()
}

// -----------------------------------------------------------------------------
// Orders
// -----------------------------------------------------------------------------

async fn list_orders(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let state = lock(&state);
    let user_id = match state.user_for(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let orders = state.orders.get(&user_id).cloned().unwrap_or_default();
    Json(paginate(orders, &params, 50)).into_response()
}

async fn user_orders(State(state): State<Shared>, Path(user_id): Path<String>) -> Json<Value> {
    let state = lock(&state);
    Json(json!(state.orders.get(&user_id).cloned().unwrap_or_default()))
}

async fn get_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(order_id): Path<String>,
) -> Response {
    let state = lock(&state);
    let user_id = match state.user_for(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    state
        .orders
        .get(&user_id)
        .and_then(|orders| orders.iter().find(|o| o["_id"] == order_id.as_str()))
        .map_or_else(
            || fail(StatusCode::NOT_FOUND, "No order for this id"),
            |order| Json(order.clone()).into_response(),
        )
}

async fn checkout_session(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(cart_id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    let mut state = lock(&state);
    let user_id = match state.user_for(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    if cart_id != cart_id_for(&user_id) || !state.carts.contains_key(&user_id) {
        return fail(StatusCode::NOT_FOUND, "There is no such cart with this id");
    }
    let url = params.get("url").cloned().unwrap_or_default();
    state.checkout_return_urls.push(url.clone());

    Json(json!({
        "status": "success",
        "session": {
            "url": format!("https://checkout.payments.example/c/pay/cs_test_{cart_id}"),
            "success_url": format!("{url}/allorders"),
            "cancel_url": format!("{url}/cart"),
        },
    }))
    .into_response()
}

async fn cash_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(cart_id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = lock(&state);
    let user_id = match state.user_for(&headers) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let lines = match state.carts.get(&user_id) {
        Some(lines) if cart_id == cart_id_for(&user_id) && !lines.is_empty() => lines.clone(),
        _ => return fail(StatusCode::NOT_FOUND, "There is no such cart with this id"),
    };

    let created_at = chrono::Utc::now().to_rfc3339();
    let order = state.order_json(
        &user_id,
        &lines,
        "cash",
        false,
        false,
        &created_at,
        &body["shippingAddress"],
    );
    state.carts.remove(&user_id);
    state
        .orders
        .entry(user_id)
        .or_default()
        .push(order.clone());

    (
        StatusCode::CREATED,
        Json(json!({"status": "success", "data": order})),
    )
        .into_response()
}

// =============================================================================
// Test Context
// =============================================================================

/// A storefront served on a random port against a fresh [`FakeCommerceApi`].
///
/// The client keeps cookies and does not follow redirects.
pub struct TestContext {
    pub api: FakeCommerceApi,
    pub client: reqwest::Client,
    pub base_url: String,
    /// Id of the pre-registered customer.
    pub user_id: String,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_default_locale(Locale::En).await
    }

    pub async fn with_default_locale(default_locale: Locale) -> Self {
        let api = FakeCommerceApi::start().await;
        let user_id = api.add_user(CUSTOMER_NAME, CUSTOMER_EMAIL, CUSTOMER_PASSWORD);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind storefront");
        let addr: SocketAddr = listener.local_addr().expect("storefront address");

        let config = StorefrontConfig {
            host: addr.ip(),
            port: addr.port(),
            base_url: format!("http://{addr}"),
            session_secret: SecretString::from(TEST_SESSION_SECRET.to_string()),
            default_locale,
            commerce: CommerceApiConfig {
                base_url: api.base_url().to_string(),
                timeout: Duration::from_secs(5),
            },
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.0,
            log_format: LogFormat::Text,
        };

        let state = AppState::new(config).expect("storefront state");
        let app = build_router(state, RateLimits::Disabled).expect("storefront router");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("storefront server");
        });

        let client = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("http client");

        Self {
            api,
            client,
            base_url: format!("http://{addr}"),
            user_id,
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Log in as the pre-registered customer.
    pub async fn login(&self) -> (StatusCode, Value) {
        self.login_with(CUSTOMER_EMAIL, CUSTOMER_PASSWORD).await
    }

    pub async fn login_with(&self, email: &str, password: &str) -> (StatusCode, Value) {
        self.post_json(
            "/api/auth/login",
            &json!({"email": email, "password": password}),
        )
        .await
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .send()
            .await
            .expect("request storefront")
    }

    pub async fn get_json(&self, path: &str) -> (StatusCode, Value) {
        read_json(self.get(path).await).await
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let response = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("request storefront");
        read_json(response).await
    }

    pub async fn put_json(&self, path: &str, body: &Value) -> (StatusCode, Value) {
        let response = self
            .client
            .put(self.url(path))
            .json(body)
            .send()
            .await
            .expect("request storefront");
        read_json(response).await
    }

    pub async fn delete_json(&self, path: &str) -> (StatusCode, Value) {
        let response = self
            .client
            .delete(self.url(path))
            .send()
            .await
            .expect("request storefront");
        read_json(response).await
    }
}

/// Status and JSON body; non-JSON bodies read as `null`.
pub async fn read_json(response: reqwest::Response) -> (StatusCode, Value) {
    let status = StatusCode::from_u16(response.status().as_u16()).expect("status code");
    let body = response.json::<Value>().await.unwrap_or(Value::Null);
    (status, body)
}
