//! Domain models for storefront.

pub mod session;

pub use session::{SessionCredentials, SessionUser, SessionView, keys as session_keys};
