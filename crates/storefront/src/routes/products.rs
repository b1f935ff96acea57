//! Product route handlers.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use bazaar_core::{BrandId, CategoryId, Locale, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::commerce::{DEFAULT_PAGE_SIZE, ProductQuery};
use crate::error::AppError;
use crate::i18n::{Message, t};
use crate::middleware::RequestLocale;
use crate::routes::views::{IdPath, Page, Pagination, ProductCard, ProductDetail};
use crate::state::AppState;

/// Related products shown under a product.
const RELATED_LIMIT: u32 = 4;

/// Listing query parameters.
///
/// Kept as strings so a malformed filter is ignored rather than failing the
/// whole page.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub sort: Option<String>,
    pub keyword: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

impl ListingParams {
    /// Build the upstream query, dropping unusable values.
    #[must_use]
    pub fn to_query(&self) -> ProductQuery {
        ProductQuery {
            page: self.page.unwrap_or(1),
            limit: self.limit.unwrap_or(DEFAULT_PAGE_SIZE),
            category: non_empty(self.category.as_deref()).and_then(|s| CategoryId::parse(s).ok()),
            brand: non_empty(self.brand.as_deref()).and_then(|s| BrandId::parse(s).ok()),
            sort: non_empty(self.sort.as_deref()).map(String::from),
            keyword: non_empty(self.keyword.as_deref()).map(String::from),
            price_min: parse_price(self.min_price.as_deref()),
            price_max: parse_price(self.max_price.as_deref()),
        }
        .normalized()
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

fn parse_price(value: Option<&str>) -> Option<Decimal> {
    non_empty(value)
        .and_then(|s| s.parse::<Decimal>().ok())
        .filter(|d| !d.is_sign_negative())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListingView {
    products: Vec<ProductCard>,
    pagination: Pagination,
    filters: AppliedFilters,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AppliedFilters {
    category: Option<CategoryId>,
    brand: Option<BrandId>,
    sort: Option<String>,
    keyword: Option<String>,
    min_price: Option<Decimal>,
    max_price: Option<Decimal>,
}

#[derive(Debug, Serialize)]
struct DetailView {
    product: ProductDetail,
    related: Vec<ProductCard>,
}

/// Display the product listing.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Query(params): Query<ListingParams>,
) -> Result<impl IntoResponse, AppError> {
    let query = params.to_query();
    let list = state.commerce().get_products(&query).await?;

    Ok(Page::new(
        locale,
        Message::ProductsTitle,
        ListingView {
            products: list.data.iter().map(|p| ProductCard::new(p, locale)).collect(),
            pagination: Pagination::from_list(&list, query.limit),
            filters: AppliedFilters {
                category: query.category,
                brand: query.brand,
                sort: query.sort,
                keyword: query.keyword,
                min_price: query.price_min,
                max_price: query.price_max,
            },
        },
    ))
}

/// Display one product with a few from the same category.
#[instrument(skip(state), fields(product_id = %path.id))]
pub async fn show(
    State(state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Path(path): Path<IdPath>,
) -> Result<impl IntoResponse, AppError> {
    let id = parse_product_id(&path.id, locale)?;
    let product = state.commerce().get_product(&id).await?;

    let related = match &product.category {
        Some(category) => {
            let query = ProductQuery {
                limit: RELATED_LIMIT + 1,
                category: Some(category.id.clone()),
                ..ProductQuery::default()
            };
            match state.commerce().get_products(&query).await {
                Ok(list) => list
                    .data
                    .iter()
                    .filter(|p| p.id != product.id)
                    .take(RELATED_LIMIT as usize)
                    .map(|p| ProductCard::new(p, locale))
                    .collect(),
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to load related products");
                    Vec::new()
                }
            }
        }
        None => Vec::new(),
    };

    Ok(Page::new(
        locale,
        Message::ProductsTitle,
        DetailView {
            product: ProductDetail::new(&product, locale),
            related,
        },
    ))
}

/// Parse a product id from a path or body, with a localized error.
pub(crate) fn parse_product_id(raw: &str, locale: Locale) -> Result<ProductId, AppError> {
    ProductId::parse(raw.trim())
        .map_err(|_| AppError::BadRequest(t(locale, Message::ProductIdRequired).to_string()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_params_to_query() {
        let params = ListingParams {
            page: Some(0),
            limit: Some(500),
            category: Some("6439d5b90049ad0b52b90048".to_string()),
            brand: Some("  ".to_string()),
            keyword: Some(" scarf ".to_string()),
            min_price: Some("100".to_string()),
            max_price: Some("-5".to_string()),
            ..ListingParams::default()
        };
        let query = params.to_query();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, 50);
        assert_eq!(query.category.unwrap().as_str(), "6439d5b90049ad0b52b90048");
        assert!(query.brand.is_none());
        assert_eq!(query.keyword.as_deref(), Some("scarf"));
        assert_eq!(query.price_min, Some(Decimal::from(100)));
        assert!(query.price_max.is_none());
    }

    #[test]
    fn test_listing_defaults() {
        let query = ListingParams::default().to_query();
        assert_eq!(query.page, 1);
        assert_eq!(query.limit, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_parse_product_id_localized_error() {
        let err = parse_product_id("  ", Locale::Ar).unwrap_err();
        assert!(matches!(err, AppError::BadRequest(m) if m == "معرف المنتج مطلوب"));
    }
}
