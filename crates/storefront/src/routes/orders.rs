//! Order history route handlers.

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use bazaar_core::{Locale, OrderId};
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::commerce::Order;
use crate::error::AppError;
use crate::i18n::{Message, t};
use crate::middleware::{RequestLocale, RequireAuth, order_owner};
use crate::routes::views::{IdPath, OrderFilter, OrderStats, OrderView, Page, Pagination};
use crate::state::AppState;

/// Orders per page on the API listing.
const DEFAULT_ORDER_LIMIT: u32 = 10;

/// Paging for `GET /api/orders`.
#[derive(Debug, Deserialize)]
pub struct OrderListParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Filter for the order history page.
#[derive(Debug, Default, Deserialize)]
pub struct HistoryParams {
    #[serde(default)]
    pub filter: OrderFilter,
}

#[derive(Debug, Serialize)]
struct OrderListBody {
    status: &'static str,
    orders: Vec<OrderView>,
    pagination: Pagination,
}

#[derive(Debug, Serialize)]
struct OrderBody {
    status: &'static str,
    order: OrderView,
}

#[derive(Debug, Serialize)]
struct HistoryView {
    filter: OrderFilter,
    stats: OrderStats,
    orders: Vec<OrderView>,
}

#[derive(Debug, Serialize)]
struct OrderDetailView {
    order: OrderView,
}

fn parse_order_id(raw: &str, locale: Locale) -> Result<OrderId, AppError> {
    OrderId::parse(raw.trim())
        .map_err(|_| AppError::BadRequest(t(locale, Message::OrderIdRequired).to_string()))
}

/// Newest first; orders without a date sink to the bottom.
pub(crate) fn sort_newest_first(orders: &mut [Order]) {
    orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

/// List a page of the customer's orders.
#[instrument(skip(state, customer), fields(user_id = %customer.user_id))]
pub async fn list(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    RequireAuth(customer): RequireAuth,
    Query(params): Query<OrderListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(DEFAULT_ORDER_LIMIT);
    let list = state
        .commerce()
        .get_orders(&customer.token, page, limit)
        .await?;

    Ok(Json(OrderListBody {
        status: "success",
        orders: list.data.iter().map(|o| OrderView::new(o, locale)).collect(),
        pagination: Pagination::from_list(&list, crate::commerce::clamp_limit(limit)),
    }))
}

/// Show one order.
#[instrument(skip(state, customer), fields(user_id = %customer.user_id, order_id = %path.id))]
pub async fn show(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    RequireAuth(customer): RequireAuth,
    Path(path): Path<IdPath>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_order_id(&path.id, locale)?;
    let order = state.commerce().get_order(&customer.token, &id).await?;

    Ok(Json(OrderBody {
        status: "success",
        order: OrderView::new(&order, locale),
    }))
}

/// Display the order history page.
#[instrument(skip(state, session, customer), fields(user_id = %customer.user_id))]
pub async fn history(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    RequireAuth(customer): RequireAuth,
    session: Session,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse, AppError> {
    let owner = order_owner(&session, &customer).await;
    let mut orders = state.commerce().get_user_orders(&owner).await?;
    sort_newest_first(&mut orders);

    let stats = OrderStats::new(&orders, locale);
    let filter = params.filter;

    Ok(Page::new(
        locale,
        Message::OrdersTitle,
        HistoryView {
            filter,
            stats,
            orders: orders
                .iter()
                .filter(|o| filter.matches(o))
                .map(|o| OrderView::new(o, locale))
                .collect(),
        },
    ))
}

/// Display one order.
#[instrument(skip(state, customer), fields(user_id = %customer.user_id, order_id = %path.id))]
pub async fn detail(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    RequireAuth(customer): RequireAuth,
    Path(path): Path<IdPath>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_order_id(&path.id, locale)?;
    let order = state.commerce().get_order(&customer.token, &id).await?;

    Ok(Page::new(
        locale,
        Message::OrdersTitle,
        OrderDetailView {
            order: OrderView::new(&order, locale),
        },
    ))
}
