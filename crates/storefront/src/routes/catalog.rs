//! Category, subcategory and brand route handlers.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use bazaar_core::CategoryId;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::commerce::MAX_PAGE_SIZE;
use crate::error::AppError;
use crate::i18n::{Message, t};
use crate::middleware::RequestLocale;
use crate::routes::views::{IdPath, Page, Pagination, TaxonView};
use crate::state::AppState;

/// Brands per page when the client does not ask.
const DEFAULT_BRAND_LIMIT: u32 = 40;

#[derive(Debug, Serialize)]
struct CategoriesView {
    categories: Vec<TaxonView>,
}

#[derive(Debug, Serialize)]
struct SubcategoriesView {
    category: TaxonRef,
    subcategories: Vec<TaxonView>,
}

#[derive(Debug, Serialize)]
struct TaxonRef {
    id: CategoryId,
}

#[derive(Debug, Serialize)]
struct BrandsView {
    brands: Vec<TaxonView>,
    pagination: Pagination,
}

/// Brand paging.
#[derive(Debug, Deserialize)]
pub struct BrandParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// Display all categories.
#[instrument(skip(state))]
pub async fn categories(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
) -> Result<impl IntoResponse, AppError> {
    let list = state.commerce().get_categories().await?;

    Ok(Page::new(
        locale,
        Message::CategoriesTitle,
        CategoriesView {
            categories: list
                .data
                .iter()
                .map(|c| TaxonView::category(c, locale))
                .collect(),
        },
    ))
}

/// Display the subcategories of one category.
#[instrument(skip(state), fields(category_id = %path.id))]
pub async fn subcategories(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Path(path): Path<IdPath>,
) -> Result<impl IntoResponse, AppError> {
    let id = CategoryId::parse(path.id.trim())
        .map_err(|_| AppError::BadRequest(t(locale, Message::CategoryIdRequired).to_string()))?;
    let list = state.commerce().get_subcategories(&id).await?;

    Ok(Page::new(
        locale,
        Message::CategoriesTitle,
        SubcategoriesView {
            category: TaxonRef { id },
            subcategories: list
                .data
                .iter()
                .map(|s| TaxonView::subcategory(s, locale))
                .collect(),
        },
    ))
}

/// Display a page of brands.
#[instrument(skip(state))]
pub async fn brands(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Query(params): Query<BrandParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = params.page.unwrap_or(1).max(1);
    let limit = params
        .limit
        .unwrap_or(DEFAULT_BRAND_LIMIT)
        .clamp(1, MAX_PAGE_SIZE);
    let list = state.commerce().get_brands(page, limit).await?;

    Ok(Page::new(
        locale,
        Message::BrandsTitle,
        BrandsView {
            brands: list.data.iter().map(|b| TaxonView::brand(b, locale)).collect(),
            pagination: Pagination::from_list(&list, limit),
        },
    ))
}
