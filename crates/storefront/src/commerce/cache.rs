//! Cache types for catalog responses.

use super::types::{Brand, Category, ListResponse, Product, Subcategory};

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Product(Box<Product>),
    Products(ListResponse<Product>),
    Categories(ListResponse<Category>),
    Subcategories(ListResponse<Subcategory>),
    Brands(ListResponse<Brand>),
}
