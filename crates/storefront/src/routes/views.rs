//! JSON view models shared by page and API routes.
//!
//! Every page response is a [`Page`] envelope carrying the locale, text
//! direction and localized title; prices are pre-formatted for the locale.

use axum::{
    Json,
    response::{IntoResponse, Response},
};
use bazaar_core::{
    CartId, Direction, Locale, OrderId, OrderStatus, PaymentMethod, Price, ProductId,
};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::commerce::{
    Brand, Cart, CartLine, Category, ListResponse, Order, OrderItem, Product, Subcategory,
};
use crate::i18n::{Message, t};

/// Path parameters for `/{locale}/.../{id}` and `/api/.../{id}` routes.
///
/// The locale capture, when present, is ignored.
#[derive(Debug, Deserialize)]
pub struct IdPath {
    pub id: String,
}

/// Page envelope for localized views.
#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub locale: Locale,
    pub dir: Direction,
    pub title: &'static str,
    #[serde(flatten)]
    pub body: T,
}

impl<T: Serialize> Page<T> {
    pub fn new(locale: Locale, title: Message, body: T) -> Self {
        Self {
            locale,
            dir: locale.direction(),
            title: t(locale, title),
            body,
        }
    }
}

impl<T: Serialize> IntoResponse for Page<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

/// Pagination block for listings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub limit: u32,
    pub results: u32,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn from_list<T>(list: &ListResponse<T>, limit: u32) -> Self {
        let current_page = list.current_page();
        let total_pages = list.total_pages(limit);
        Self {
            current_page,
            total_pages,
            limit,
            results: list.results,
            has_next: current_page < total_pages,
            has_prev: current_page > 1,
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// Reference to a category or brand in a product view.
#[derive(Debug, Clone, Serialize)]
pub struct NamedRef {
    pub id: String,
    pub name: String,
}

/// Product tile in listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductCard {
    pub id: ProductId,
    pub title: String,
    pub image: String,
    pub price: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_price: Option<String>,
    pub amount: Decimal,
    pub rating: f64,
    pub category: Option<NamedRef>,
    pub brand: Option<NamedRef>,
    pub in_stock: bool,
}

impl ProductCard {
    pub fn new(product: &Product, locale: Locale) -> Self {
        let effective = product.effective_price();
        Self {
            id: product.id.clone(),
            title: product.title.clone(),
            image: product.image_cover.clone(),
            price: effective.display(locale),
            original_price: (effective != product.price).then(|| product.price.display(locale)),
            amount: effective.amount(),
            rating: product.ratings_average,
            category: product.category.as_ref().map(|c| NamedRef {
                id: c.id.to_string(),
                name: c.name.clone(),
            }),
            brand: product.brand.as_ref().map(|b| NamedRef {
                id: b.id.to_string(),
                name: b.name.clone(),
            }),
            in_stock: product.in_stock(),
        }
    }
}

/// Full product page.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductDetail {
    #[serde(flatten)]
    pub card: ProductCard,
    pub slug: String,
    pub description: String,
    pub images: Vec<String>,
    pub quantity: u32,
    pub ratings_quantity: u32,
    pub sold: Option<f64>,
    pub subcategories: Vec<NamedRef>,
}

impl ProductDetail {
    pub fn new(product: &Product, locale: Locale) -> Self {
        Self {
            card: ProductCard::new(product, locale),
            slug: product.slug.clone(),
            description: product.description.clone(),
            images: product.images.clone(),
            quantity: product.quantity,
            ratings_quantity: product.ratings_quantity,
            sold: product.sold,
            subcategories: product
                .subcategory
                .iter()
                .map(|s| NamedRef {
                    id: s.id.to_string(),
                    name: s.name.clone(),
                })
                .collect(),
        }
    }
}

/// Category, subcategory or brand tile.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonView {
    pub id: String,
    pub name: String,
    pub slug: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Localized listing filtered to this entry.
    pub products_url: String,
}

impl TaxonView {
    pub fn category(category: &Category, locale: Locale) -> Self {
        Self {
            id: category.id.to_string(),
            name: category.name.clone(),
            slug: category.slug.clone(),
            image: category.image.clone(),
            products_url: format!("/{locale}/products?category={}", category.id),
        }
    }

    pub fn subcategory(subcategory: &Subcategory, locale: Locale) -> Self {
        Self {
            id: subcategory.id.to_string(),
            name: subcategory.name.clone(),
            slug: subcategory.slug.clone(),
            image: None,
            products_url: subcategory.category.as_ref().map_or_else(
                || format!("/{locale}/products"),
                |parent| format!("/{locale}/products?category={parent}"),
            ),
        }
    }

    pub fn brand(brand: &Brand, locale: Locale) -> Self {
        Self {
            id: brand.id.to_string(),
            name: brand.name.clone(),
            slug: brand.slug.clone(),
            image: brand.image.clone(),
            products_url: format!("/{locale}/products?brand={}", brand.id),
        }
    }
}

// =============================================================================
// Cart
// =============================================================================

/// One cart line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub product_id: ProductId,
    pub title: Option<String>,
    pub image: Option<String>,
    pub count: u32,
    pub price: String,
    pub line_total: String,
}

impl CartLineView {
    fn new(line: &CartLine, locale: Locale) -> Self {
        let summary = line.product.summary();
        Self {
            product_id: line.product.id().clone(),
            title: summary.map(|s| s.title.clone()),
            image: summary.map(|s| s.image_cover.clone()),
            count: line.count,
            price: line.price.display(locale),
            line_total: line.line_total().display(locale),
        }
    }
}

/// The cart as shown to the customer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub cart_id: Option<CartId>,
    pub items: Vec<CartLineView>,
    pub item_count: u32,
    pub unit_count: u32,
    pub total: String,
    pub total_amount: Decimal,
    pub is_empty: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<&'static str>,
}

impl CartView {
    pub fn new(cart: &Cart, locale: Locale) -> Self {
        Self {
            cart_id: cart.id.clone(),
            items: cart
                .lines
                .iter()
                .map(|line| CartLineView::new(line, locale))
                .collect(),
            item_count: cart.item_count,
            unit_count: cart.unit_count(),
            total: cart.total.display(locale),
            total_amount: cart.total.amount(),
            is_empty: cart.is_empty(),
            empty_message: cart
                .is_empty()
                .then(|| t(locale, Message::CartEmpty)),
        }
    }
}

// =============================================================================
// Orders
// =============================================================================

/// One line on an order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemView {
    pub product_id: ProductId,
    pub title: Option<String>,
    pub image: Option<String>,
    pub count: u32,
    pub price: String,
    pub line_total: String,
}

impl OrderItemView {
    fn new(item: &OrderItem, locale: Locale) -> Self {
        let summary = item.product.summary();
        Self {
            product_id: item.product.id().clone(),
            title: summary.map(|s| s.title.clone()),
            image: summary.map(|s| s.image_cover.clone()),
            count: item.count,
            price: item.price.display(locale),
            line_total: item.price.times(item.count).display(locale),
        }
    }
}

/// Shipping address on an order view; missing fields stay `null`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AddressView {
    pub details: Option<String>,
    pub city: Option<String>,
    pub phone: Option<String>,
}

/// An order as shown in history and detail pages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub id: OrderId,
    pub status: OrderStatus,
    pub status_label: &'static str,
    pub payment_method: Option<PaymentMethod>,
    pub payment_method_label: Option<&'static str>,
    pub is_paid: bool,
    pub is_delivered: bool,
    pub total: String,
    pub tax: String,
    pub shipping: String,
    pub item_count: usize,
    pub items: Vec<OrderItemView>,
    pub shipping_address: AddressView,
    pub created_at: Option<DateTime<Utc>>,
    pub paid_at: Option<DateTime<Utc>>,
    pub delivered_at: Option<DateTime<Utc>>,
    pub detail_url: String,
}

impl OrderView {
    pub fn new(order: &Order, locale: Locale) -> Self {
        let status = order.status();
        let payment_method = order.payment_method();
        let address = order.shipping_address.clone().unwrap_or_default();
        Self {
            id: order.id.clone(),
            status,
            status_label: status.label(locale),
            payment_method,
            payment_method_label: payment_method.map(|m| m.label(locale)),
            is_paid: order.is_paid,
            is_delivered: order.is_delivered,
            total: order.total_order_price.display(locale),
            tax: order.tax_price.display(locale),
            shipping: order.shipping_price.display(locale),
            item_count: order.cart_items.len(),
            items: order
                .cart_items
                .iter()
                .map(|item| OrderItemView::new(item, locale))
                .collect(),
            shipping_address: AddressView {
                details: address.details,
                city: address.city,
                phone: address.phone,
            },
            created_at: order.created_at,
            paid_at: order.paid_at,
            delivered_at: order.delivered_at,
            detail_url: format!("/{locale}/orders/{}", order.id),
        }
    }
}

/// Order filter on the history page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderFilter {
    #[default]
    All,
    Paid,
    Unpaid,
    Delivered,
    Pending,
}

impl OrderFilter {
    #[must_use]
    pub const fn matches(self, order: &Order) -> bool {
        match self {
            Self::All => true,
            Self::Paid => order.is_paid,
            Self::Unpaid => !order.is_paid,
            Self::Delivered => order.is_delivered,
            Self::Pending => !order.is_delivered,
        }
    }
}

/// Counts shown above the order history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStats {
    pub total: usize,
    pub paid: usize,
    pub unpaid: usize,
    pub delivered: usize,
    pub pending: usize,
    pub total_spent: String,
}

impl OrderStats {
    pub fn new(orders: &[Order], locale: Locale) -> Self {
        let paid = orders.iter().filter(|o| o.is_paid).count();
        let delivered = orders.iter().filter(|o| o.is_delivered).count();
        let spent: Price = orders
            .iter()
            .filter(|o| o.is_paid)
            .map(|o| o.total_order_price)
            .sum();
        Self {
            total: orders.len(),
            paid,
            unpaid: orders.len() - paid,
            delivered,
            pending: orders.len() - delivered,
            total_spent: spent.display(locale),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    fn order(paid: bool, delivered: bool, total: i64) -> Order {
        serde_json::from_value(json!({
            "_id": format!("o-{paid}-{delivered}-{total}"),
            "cartItems": [{"count": 2, "price": total / 2, "product": {"_id": "p1", "title": "Shawl", "imageCover": "s.jpeg"}}],
            "totalOrderPrice": total,
            "paymentMethodType": "card",
            "isPaid": paid,
            "isDelivered": delivered
        }))
        .unwrap()
    }

    #[test]
    fn test_order_stats() {
        let orders = vec![
            order(true, true, 100),
            order(true, false, 50),
            order(false, false, 20),
        ];
        let stats = OrderStats::new(&orders, Locale::En);
        assert_eq!(stats.total, 3);
        assert_eq!(stats.paid, 2);
        assert_eq!(stats.unpaid, 1);
        assert_eq!(stats.pending, 2);
        assert_eq!(stats.total_spent, "EGP 150.00");
    }

    #[test]
    fn test_order_filter() {
        let paid_pending = order(true, false, 10);
        assert!(OrderFilter::Paid.matches(&paid_pending));
        assert!(OrderFilter::Pending.matches(&paid_pending));
        assert!(!OrderFilter::Delivered.matches(&paid_pending));
        assert!(OrderFilter::All.matches(&paid_pending));
    }

    #[test]
    fn test_order_view_localized() {
        let view = OrderView::new(&order(false, false, 300), Locale::Ar);
        assert_eq!(view.total, "300.00 ج.م");
        assert_eq!(view.status_label, "قيد الانتظار");
        assert_eq!(view.items[0].line_total, "300.00 ج.م");
        assert!(view.detail_url.starts_with("/ar/orders/"));
    }

    #[test]
    fn test_page_envelope() {
        let page = Page::new(Locale::Ar, Message::CartTitle, json!({"x": 1}));
        let value = serde_json::to_value(&page).unwrap();
        assert_eq!(value["locale"], "ar");
        assert_eq!(value["dir"], "rtl");
        assert_eq!(value["title"], "سلة التسوق");
        assert_eq!(value["x"], 1);
    }

    #[test]
    fn test_cart_view_empty_message() {
        let view = CartView::new(&Cart::empty(), Locale::En);
        assert!(view.is_empty);
        assert_eq!(view.empty_message, Some("Your cart is empty"));
        assert_eq!(view.total, "EGP 0.00");
    }
}
