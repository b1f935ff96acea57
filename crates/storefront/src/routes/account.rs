//! Profile page route handler.

use axum::{extract::State, response::IntoResponse};
use serde::Serialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::i18n::Message;
use crate::middleware::{RequestLocale, RequireAuth, order_owner};
use crate::models::SessionView;
use crate::routes::orders::sort_newest_first;
use crate::routes::views::{OrderStats, OrderView, Page};
use crate::state::AppState;

/// Orders previewed on the profile page.
const RECENT_ORDERS: usize = 5;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProfileView {
    user: SessionView,
    stats: OrderStats,
    recent_orders: Vec<OrderView>,
    orders_url: String,
}

/// Display the customer's profile with recent orders.
#[instrument(skip(state, session, customer), fields(user_id = %customer.user_id))]
pub async fn profile(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    RequireAuth(customer): RequireAuth,
    session: Session,
) -> Result<impl IntoResponse, AppError> {
    let owner = order_owner(&session, &customer).await;
    let mut orders = state.commerce().get_user_orders(&owner).await?;
    sort_newest_first(&mut orders);

    Ok(Page::new(
        locale,
        Message::ProfileTitle,
        ProfileView {
            user: customer.view(),
            stats: OrderStats::new(&orders, locale),
            recent_orders: orders
                .iter()
                .take(RECENT_ORDERS)
                .map(|o| OrderView::new(o, locale))
                .collect(),
            orders_url: format!("/{locale}/allorders"),
        },
    ))
}
