//! Business logic services for storefront.
//!
//! # Services
//!
//! - `auth` - Customer sign-in / sign-up against the commerce API, token decoding
//! - `cart_sync` - Per-customer cart snapshots consistent with concurrent mutations

pub mod auth;
pub mod cart_sync;

pub use auth::{AuthError, AuthService, SignUpForm};
pub use cart_sync::{CartSnapshot, CartSync};
