//! Home page route handler.

use axum::{extract::State, response::IntoResponse};
use serde::Serialize;
use tracing::instrument;

use crate::commerce::ProductQuery;
use crate::error::AppError;
use crate::i18n::Message;
use crate::middleware::RequestLocale;
use crate::routes::views::{Page, ProductCard, TaxonView};
use crate::state::AppState;

/// Products shown on the home page.
const FEATURED_LIMIT: u32 = 8;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct HomeView {
    featured_products: Vec<ProductCard>,
    categories: Vec<TaxonView>,
}

/// Display the home page.
#[instrument(skip(state))]
pub async fn home(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
) -> Result<impl IntoResponse, AppError> {
    let query = ProductQuery {
        limit: FEATURED_LIMIT,
        sort: Some("-sold".to_string()),
        ..ProductQuery::default()
    };

    let (products, categories) = tokio::try_join!(
        state.commerce().get_products(&query),
        state.commerce().get_categories(),
    )?;

    Ok(Page::new(
        locale,
        Message::HomeTitle,
        HomeView {
            featured_products: products
                .data
                .iter()
                .map(|p| ProductCard::new(p, locale))
                .collect(),
            categories: categories
                .data
                .iter()
                .map(|c| TaxonView::category(c, locale))
                .collect(),
        },
    ))
}
