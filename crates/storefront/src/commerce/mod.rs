//! Client for the external commerce REST API.
//!
//! # Architecture
//!
//! - Plain JSON over HTTPS via `reqwest`; the API is the source of truth
//! - Authenticated calls carry the customer's token in the `token` header
//! - Catalog responses are cached in-memory via `moka` (5 minute TTL);
//!   cart, order and auth calls are never cached
//!
//! # Example
//!
//! ```rust,ignore
//! use bazaar_storefront::commerce::{CommerceClient, ProductQuery};
//!
//! let client = CommerceClient::new(&config.commerce)?;
//! let page = client.get_products(&ProductQuery::default()).await?;
//! let cart = client.add_to_cart(&token, &page.data[0].id).await?;
//! ```

mod cache;
mod client;
pub mod types;

pub use client::CommerceClient;
pub use types::*;

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when calling the commerce API.
#[derive(Debug, Error)]
pub enum CommerceError {
    /// HTTP transport failed (connect, timeout, body read).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a client error and a message.
    #[error("API error ({status}): {message}")]
    Api { status: StatusCode, message: String },

    /// The API answered with a server error.
    #[error("Upstream error ({status})")]
    Upstream { status: StatusCode },

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limited by the API.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The API rejected the customer token.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

impl CommerceError {
    /// Message safe to show to the customer, if the API produced one.
    #[must_use]
    pub fn user_message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } | Self::Unauthorized(message) => Some(message),
            Self::NotFound(what) => Some(what),
            _ => None,
        }
    }

    /// Whether this is a fault on the API side rather than a bad request.
    #[must_use]
    pub const fn is_upstream_failure(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Upstream { .. } | Self::Parse(_))
    }
}
