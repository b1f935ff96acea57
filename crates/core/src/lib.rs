//! Bazaar Core - Shared domain types.
//!
//! This crate provides the types shared by the storefront binary and its
//! integration tests:
//! - Type-safe string IDs for entities owned by the commerce API
//! - Validated value types (`Email`, `Phone`, `Password`)
//! - `Price` with locale-aware formatting
//! - `Locale` negotiation
//!
//! # Architecture
//!
//! The core crate contains only types and validation - no I/O and no HTTP
//! clients. Every entity referenced here is owned by the external commerce
//! API; the storefront only mirrors identifiers and display values.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, locales and statuses

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
