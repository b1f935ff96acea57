//! Core types for Bazaar.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod email;
pub mod id;
pub mod locale;
pub mod price;
pub mod status;
pub mod validation;

pub use email::{Email, EmailError};
pub use id::*;
pub use locale::{Direction, Locale, LocaleError};
pub use price::Price;
pub use status::*;
pub use validation::{
    Password, PersonName, Phone, Registration, ShippingAddress, ValidationError, email_error,
    validate_registration,
};
