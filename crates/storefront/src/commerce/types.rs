//! Wire types for the commerce REST API.
//!
//! Field names follow the API's camelCase JSON. Entities carry a Mongo-style
//! `_id`; the duplicate `id` some endpoints also send is ignored.

use bazaar_core::{
    BrandId, CartId, CartLineId, CategoryId, OrderId, OrderStatus, PaymentMethod, Price,
    ProductId, ShippingAddress, SubcategoryId, UserId,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Page size used when a listing request does not name one.
pub const DEFAULT_PAGE_SIZE: u32 = 15;

/// Largest page size a listing request may ask for.
pub const MAX_PAGE_SIZE: u32 = 50;

// =============================================================================
// Catalog
// =============================================================================

/// A product as returned by `/products`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub quantity: u32,
    pub price: Price,
    #[serde(default)]
    pub price_after_discount: Option<Price>,
    #[serde(default)]
    pub image_cover: String,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub brand: Option<Brand>,
    #[serde(default)]
    pub subcategory: Vec<Subcategory>,
    #[serde(default)]
    pub ratings_average: f64,
    #[serde(default)]
    pub ratings_quantity: u32,
    #[serde(default)]
    pub sold: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// The price the customer pays: the discounted price when one is set.
    #[must_use]
    pub fn effective_price(&self) -> Price {
        self.price_after_discount
            .filter(|discounted| *discounted < self.price)
            .unwrap_or(self.price)
    }

    /// Whether the product can currently be added to a cart.
    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.quantity > 0
    }
}

/// A top-level product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    #[serde(rename = "_id")]
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// A subcategory; `category` names its parent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subcategory {
    #[serde(rename = "_id")]
    pub id: SubcategoryId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub category: Option<CategoryId>,
}

/// A product brand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Brand {
    #[serde(rename = "_id")]
    pub id: BrandId,
    pub name: String,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Paging metadata attached to list responses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    #[serde(default = "first_page")]
    pub current_page: u32,
    #[serde(default)]
    pub number_of_pages: Option<u32>,
    #[serde(default)]
    pub limit: Option<u32>,
    #[serde(default)]
    pub next_page: Option<u32>,
    #[serde(default)]
    pub prev_page: Option<u32>,
}

const fn first_page() -> u32 {
    1
}

/// A paginated list envelope: `{ results, metadata, data }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse<T> {
    #[serde(default)]
    pub results: u32,
    #[serde(default)]
    pub metadata: Option<PageMetadata>,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    /// Number of pages in the listing.
    ///
    /// Uses the API's `numberOfPages` when present, otherwise derives it
    /// from the result count and the requested page size.
    #[must_use]
    pub fn total_pages(&self, limit: u32) -> u32 {
        if let Some(pages) = self.metadata.as_ref().and_then(|m| m.number_of_pages) {
            return pages;
        }
        self.results.div_ceil(limit.max(1))
    }

    /// Current page, defaulting to the first.
    #[must_use]
    pub fn current_page(&self) -> u32 {
        self.metadata.as_ref().map_or(1, |m| m.current_page)
    }
}

/// A single-resource envelope: `{ data }`.
#[derive(Debug, Clone, Deserialize)]
pub struct DataEnvelope<T> {
    pub data: T,
}

/// Filters for `/products`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductQuery {
    pub page: u32,
    pub limit: u32,
    pub category: Option<CategoryId>,
    pub brand: Option<BrandId>,
    /// API sort expression such as `-price` or `title`.
    pub sort: Option<String>,
    pub keyword: Option<String>,
    pub price_min: Option<Decimal>,
    pub price_max: Option<Decimal>,
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_PAGE_SIZE,
            category: None,
            brand: None,
            sort: None,
            keyword: None,
            price_min: None,
            price_max: None,
        }
    }
}

impl ProductQuery {
    /// Clamp paging into range and drop blank text filters.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.page = self.page.max(1);
        self.limit = clamp_limit(self.limit);
        self.sort = self.sort.filter(|s| !s.trim().is_empty());
        self.keyword = self
            .keyword
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        self
    }

    /// Query string pairs for the API.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![
            ("page", self.page.to_string()),
            ("limit", self.limit.to_string()),
        ];
        if let Some(category) = &self.category {
            pairs.push(("category", category.to_string()));
        }
        if let Some(brand) = &self.brand {
            pairs.push(("brand", brand.to_string()));
        }
        if let Some(sort) = &self.sort {
            pairs.push(("sort", sort.clone()));
        }
        if let Some(keyword) = &self.keyword {
            pairs.push(("keyword", keyword.clone()));
        }
        if let Some(min) = self.price_min {
            pairs.push(("price[gte]", min.to_string()));
        }
        if let Some(max) = self.price_max {
            pairs.push(("price[lte]", max.to_string()));
        }
        pairs
    }

    /// Stable cache key for this query.
    #[must_use]
    pub fn cache_key(&self) -> String {
        let parts: Vec<String> = self
            .to_pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect();
        format!("products:{}", parts.join("&"))
    }
}

/// Clamp a requested page size to `1..=MAX_PAGE_SIZE`.
#[must_use]
pub fn clamp_limit(limit: u32) -> u32 {
    limit.clamp(1, MAX_PAGE_SIZE)
}

// =============================================================================
// Cart
// =============================================================================

/// Product reference on a cart or order line.
///
/// Reads return the product populated; mutation responses return the bare id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LineProduct {
    Full(Box<LineProductSummary>),
    Id(ProductId),
}

impl LineProduct {
    /// Product id regardless of shape.
    #[must_use]
    pub fn id(&self) -> &ProductId {
        match self {
            Self::Full(summary) => &summary.id,
            Self::Id(id) => id,
        }
    }

    /// Populated product fields, when present.
    #[must_use]
    pub fn summary(&self) -> Option<&LineProductSummary> {
        match self {
            Self::Full(summary) => Some(summary),
            Self::Id(_) => None,
        }
    }
}

/// The product fields the API populates on cart and order lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineProductSummary {
    #[serde(rename = "_id")]
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub image_cover: String,
    #[serde(default)]
    pub quantity: Option<u32>,
    #[serde(default)]
    pub category: Option<Category>,
    #[serde(default)]
    pub brand: Option<Brand>,
    #[serde(default)]
    pub ratings_average: Option<f64>,
}

/// A cart line as the API sends it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    #[serde(rename = "_id")]
    pub id: CartLineId,
    pub count: u32,
    pub price: Price,
    pub product: LineProduct,
}

impl CartLine {
    /// Unit price times count.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.count)
    }
}

/// The `data` object of a cart response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartData {
    #[serde(rename = "_id")]
    pub id: CartId,
    #[serde(default)]
    pub cart_owner: Option<UserId>,
    #[serde(default)]
    pub products: Vec<CartLine>,
    #[serde(default)]
    pub total_cart_price: Price,
}

/// Cart envelope returned by every `/cart` endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub num_of_cart_items: u32,
    #[serde(default)]
    pub cart_id: Option<CartId>,
    #[serde(default)]
    pub data: Option<CartData>,
}

/// A customer's cart, flattened from [`CartResponse`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cart {
    pub id: Option<CartId>,
    pub owner: Option<UserId>,
    pub lines: Vec<CartLine>,
    pub total: Price,
    /// Distinct products in the cart, as counted by the API.
    pub item_count: u32,
}

impl Cart {
    /// The cart of a customer who has none yet.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Whether every line carries populated product fields.
    #[must_use]
    pub fn is_hydrated(&self) -> bool {
        self.lines.iter().all(|line| line.product.summary().is_some())
    }

    /// Total units across all lines.
    #[must_use]
    pub fn unit_count(&self) -> u32 {
        self.lines.iter().map(|line| line.count).sum()
    }

    /// Find the line for a product.
    #[must_use]
    pub fn line_for(&self, product_id: &ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product.id() == product_id)
    }
}

impl From<CartResponse> for Cart {
    fn from(response: CartResponse) -> Self {
        let Some(data) = response.data else {
            return Self {
                id: response.cart_id,
                ..Self::default()
            };
        };
        let item_count = if response.num_of_cart_items == 0 {
            u32::try_from(data.products.len()).unwrap_or(u32::MAX)
        } else {
            response.num_of_cart_items
        };
        Self {
            id: response.cart_id.or(Some(data.id)),
            owner: data.cart_owner,
            lines: data.products,
            total: data.total_cart_price,
            item_count,
        }
    }
}

/// Body of `POST /cart`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddToCartRequest<'a> {
    pub product_id: &'a ProductId,
}

/// Body of `PUT /cart/{productId}`.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateCountRequest {
    pub count: u32,
}

// =============================================================================
// Orders & checkout
// =============================================================================

/// Shipping address as stored on an order. Older orders may lack fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderAddress {
    #[serde(default)]
    pub details: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

/// Customer reference on an order: populated object or bare id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OrderCustomer {
    Full(OrderCustomerSummary),
    Id(UserId),
}

/// Populated customer fields on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCustomerSummary {
    #[serde(rename = "_id")]
    pub id: UserId,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A line on a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    #[serde(default)]
    pub count: u32,
    pub price: Price,
    pub product: LineProduct,
}

/// A placed order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "_id")]
    pub id: OrderId,
    #[serde(default)]
    pub cart_items: Vec<OrderItem>,
    #[serde(default)]
    pub shipping_address: Option<OrderAddress>,
    #[serde(default)]
    pub total_order_price: Price,
    #[serde(default)]
    pub tax_price: Price,
    #[serde(default)]
    pub shipping_price: Price,
    #[serde(default)]
    pub payment_method_type: String,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub is_delivered: bool,
    #[serde(default)]
    pub paid_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub user: Option<OrderCustomer>,
}

impl Order {
    /// Progress derived from the paid / delivered flags.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        OrderStatus::from_flags(self.is_paid, self.is_delivered)
    }

    /// Payment method, when the API value is recognized.
    #[must_use]
    pub fn payment_method(&self) -> Option<PaymentMethod> {
        PaymentMethod::from_api(&self.payment_method_type)
    }
}

/// `GET /orders/{id}` answers either wrapped in `{ data }` or bare.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OrderEnvelope {
    Wrapped { data: Box<Order> },
    Bare(Box<Order>),
}

impl From<OrderEnvelope> for Order {
    fn from(envelope: OrderEnvelope) -> Self {
        match envelope {
            OrderEnvelope::Wrapped { data } | OrderEnvelope::Bare(data) => *data,
        }
    }
}

/// Body of both checkout endpoints.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest<'a> {
    pub shipping_address: &'a ShippingAddress,
}

/// Hosted payment session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutSession {
    pub url: String,
    #[serde(default)]
    pub success_url: Option<String>,
    #[serde(default)]
    pub cancel_url: Option<String>,
}

/// Response of `POST /orders/checkout-session/{cartId}`.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutSessionResponse {
    #[serde(default)]
    pub status: String,
    pub session: CheckoutSession,
}

// =============================================================================
// Auth
// =============================================================================

/// Body of `POST /auth/signin`.
#[derive(Debug, Clone, Serialize)]
pub struct SignInRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Body of `POST /auth/signup`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub re_password: &'a str,
    pub phone: &'a str,
}

/// The profile returned alongside a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub name: String,
    pub email: String,
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "user".to_string()
}

/// Response of the sign-in and sign-up endpoints.
///
/// Success: `{ message: "success", user, token }`.
/// Failure: `{ message, statusMsg }`.
#[derive(Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub status_msg: Option<String>,
    #[serde(default)]
    pub user: Option<AuthUser>,
    #[serde(default)]
    pub token: Option<String>,
}

impl AuthResponse {
    /// Whether the API accepted the credentials.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.message == "success"
    }
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("message", &self.message)
            .field("status_msg", &self.status_msg)
            .field("user", &self.user)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Error body shapes the API uses on 4xx responses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub status_msg: Option<String>,
    #[serde(default)]
    pub errors: Option<ApiFieldError>,
}

/// Field validation error reported by the API.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiFieldError {
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub param: Option<String>,
}

impl ApiErrorBody {
    /// The most specific message available.
    #[must_use]
    pub fn best_message(self) -> Option<String> {
        self.errors
            .and_then(|e| e.msg)
            .or(self.message)
            .or(self.status_msg)
            .filter(|m| !m.trim().is_empty())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn product_json() -> serde_json::Value {
        json!({
            "sold": 2.5e3,
            "images": ["a.jpeg"],
            "subcategory": [{"_id": "sub1", "name": "Women's Clothing", "slug": "women's-clothing", "category": "cat1"}],
            "ratingsQuantity": 18,
            "_id": "6428ebc6dc1175abc65ca0b9",
            "title": "Woman Shawl",
            "slug": "woman-shawl",
            "description": "Material Polyester",
            "quantity": 225,
            "price": 191,
            "imageCover": "cover.jpeg",
            "category": {"_id": "cat1", "name": "Women's Fashion", "slug": "women's-fashion", "image": "c.png"},
            "brand": {"_id": "brand1", "name": "DeFacto", "slug": "defacto", "image": "b.png"},
            "ratingsAverage": 4.8,
            "createdAt": "2023-04-02T02:39:34.365Z",
            "updatedAt": "2023-06-11T15:04:52.123Z",
            "id": "6428ebc6dc1175abc65ca0b9"
        })
    }

    #[test]
    fn test_product_decodes_with_duplicate_id() {
        let product: Product = serde_json::from_value(product_json()).unwrap();
        assert_eq!(product.id.as_str(), "6428ebc6dc1175abc65ca0b9");
        assert_eq!(product.price, Price::from_pounds(191));
        assert_eq!(product.subcategory[0].category.as_ref().unwrap().as_str(), "cat1");
        assert!(product.in_stock());
    }

    #[test]
    fn test_effective_price_prefers_discount() {
        let mut product: Product = serde_json::from_value(product_json()).unwrap();
        assert_eq!(product.effective_price(), Price::from_pounds(191));
        product.price_after_discount = Some(Price::from_pounds(150));
        assert_eq!(product.effective_price(), Price::from_pounds(150));
    }

    #[test]
    fn test_total_pages() {
        let list: ListResponse<Category> = serde_json::from_value(json!({
            "results": 31,
            "data": []
        }))
        .unwrap();
        assert_eq!(list.total_pages(15), 3);
        assert_eq!(list.current_page(), 1);

        let list: ListResponse<Category> = serde_json::from_value(json!({
            "results": 31,
            "metadata": {"currentPage": 2, "numberOfPages": 4, "limit": 10},
            "data": []
        }))
        .unwrap();
        assert_eq!(list.total_pages(15), 4);
        assert_eq!(list.current_page(), 2);
    }

    #[test]
    fn test_product_query_normalized() {
        let query = ProductQuery {
            page: 0,
            limit: 500,
            keyword: Some("  ".to_string()),
            sort: Some("-price".to_string()),
            ..ProductQuery::default()
        }
        .normalized();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, MAX_PAGE_SIZE);
        assert_eq!(query.keyword, None);
        assert_eq!(query.cache_key(), "products:page=1&limit=50&sort=-price");
    }

    #[test]
    fn test_cart_line_product_both_shapes() {
        let populated: CartResponse = serde_json::from_value(json!({
            "status": "success",
            "numOfCartItems": 1,
            "cartId": "cart1",
            "data": {
                "_id": "cart1",
                "cartOwner": "user1",
                "products": [{
                    "count": 2,
                    "_id": "line1",
                    "product": {"_id": "p1", "title": "Shawl", "imageCover": "x.jpeg", "quantity": 5, "id": "p1"},
                    "price": 191
                }],
                "totalCartPrice": 382
            }
        }))
        .unwrap();
        let cart = Cart::from(populated);
        assert!(cart.is_hydrated());
        assert_eq!(cart.unit_count(), 2);
        assert_eq!(cart.lines[0].line_total(), Price::from_pounds(382));

        let mutated: CartResponse = serde_json::from_value(json!({
            "status": "success",
            "message": "Product added successfully to your cart",
            "numOfCartItems": 1,
            "cartId": "cart1",
            "data": {
                "_id": "cart1",
                "cartOwner": "user1",
                "products": [{"count": 1, "_id": "line1", "product": "p1", "price": 191}],
                "totalCartPrice": 191
            }
        }))
        .unwrap();
        let cart = Cart::from(mutated);
        assert!(!cart.is_hydrated());
        assert!(cart.line_for(&ProductId::parse("p1").unwrap()).is_some());
        assert_eq!(cart.owner.unwrap().as_str(), "user1");
    }

    #[test]
    fn test_order_envelope_shapes() {
        let order = json!({
            "_id": "o1",
            "cartItems": [{"count": 1, "price": 100, "product": "p1"}],
            "totalOrderPrice": 100,
            "paymentMethodType": "cash",
            "isPaid": false,
            "isDelivered": false,
            "user": {"_id": "u1", "name": "Ahmed", "email": "a@b.co", "phone": "01012345678"}
        });
        let wrapped: OrderEnvelope = serde_json::from_value(json!({ "data": order.clone() })).unwrap();
        let bare: OrderEnvelope = serde_json::from_value(order).unwrap();
        let wrapped = Order::from(wrapped);
        let bare = Order::from(bare);
        assert_eq!(wrapped.id, bare.id);
        assert_eq!(bare.payment_method(), Some(PaymentMethod::Cash));
        assert_eq!(bare.status(), OrderStatus::Pending);
    }

    #[test]
    fn test_auth_response_debug_redacts_token() {
        let response: AuthResponse = serde_json::from_value(json!({
            "message": "success",
            "user": {"name": "Ahmed", "email": "a@b.co", "role": "user"},
            "token": "eyJhbGciOiJIUzI1NiJ9.e30.sig"
        }))
        .unwrap();
        assert!(response.is_success());
        assert!(!format!("{response:?}").contains("eyJ"));
    }

    #[test]
    fn test_api_error_best_message() {
        let body: ApiErrorBody = serde_json::from_value(json!({
            "statusMsg": "fail",
            "message": "Incorrect email or password"
        }))
        .unwrap();
        assert_eq!(body.best_message().unwrap(), "Incorrect email or password");

        let body: ApiErrorBody = serde_json::from_value(json!({
            "message": "fail",
            "errors": {"value": "x", "msg": "Account Already Exists", "param": "email"}
        }))
        .unwrap();
        assert_eq!(body.best_message().unwrap(), "Account Already Exists");
    }
}
