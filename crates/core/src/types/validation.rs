//! Validated form inputs: names, phones, passwords, shipping addresses.
//!
//! These mirror the rules the commerce API enforces, so bad input is rejected
//! locally with a field-level error instead of a round trip.

use core::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{Email, EmailError};

/// Egyptian mobile numbers: `01` + operator digit (0, 1, 2 or 5) + 8 digits.
static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^01[0125][0-9]{8}$").unwrap_or_else(|e| unreachable!("static regex: {e}"))
});

/// A validation failure tied to a form field.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Form field name as submitted by the client.
    pub field: &'static str,
    /// Human-readable reason (English; clients localize by field).
    pub reason: String,
}

impl ValidationError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }

    fn required(field: &'static str) -> Self {
        Self::new(field, "this field is required")
    }
}

/// An Egyptian mobile phone number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Phone(String);

impl Phone {
    /// Parse a phone number.
    ///
    /// # Errors
    ///
    /// Returns an error if the input is empty or not an Egyptian mobile number.
    pub fn parse(field: &'static str, s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ValidationError::required(field));
        }
        if !PHONE_RE.is_match(s) {
            return Err(ValidationError::new(
                field,
                "enter a valid Egyptian mobile number (01XXXXXXXXX)",
            ));
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the number as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A password meeting the commerce API's policy.
///
/// At least 8 characters, ASCII letters and digits only, with at least one
/// letter and one digit. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    /// Minimum accepted length.
    pub const MIN_LENGTH: usize = 8;

    /// Parse and validate a password.
    ///
    /// # Errors
    ///
    /// Returns an error describing the violated rule.
    pub fn parse(field: &'static str, s: &str) -> Result<Self, ValidationError> {
        if s.is_empty() {
            return Err(ValidationError::required(field));
        }
        if s.len() < Self::MIN_LENGTH {
            return Err(ValidationError::new(
                field,
                format!("must be at least {} characters", Self::MIN_LENGTH),
            ));
        }
        if !s.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ValidationError::new(field, "only letters and digits are allowed"));
        }
        if !s.chars().any(|c| c.is_ascii_alphabetic()) || !s.chars().any(|c| c.is_ascii_digit()) {
            return Err(ValidationError::new(
                field,
                "must contain at least one letter and one digit",
            ));
        }
        Ok(Self(s.to_owned()))
    }

    /// Expose the password for forwarding to the commerce API.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password([REDACTED])")
    }
}

/// A display name (3 to 20 characters).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersonName(String);

impl PersonName {
    /// Minimum length in characters.
    pub const MIN_LENGTH: usize = 3;
    /// Maximum length in characters.
    pub const MAX_LENGTH: usize = 20;

    /// Parse and validate a name.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed name is empty or out of range.
    pub fn parse(field: &'static str, s: &str) -> Result<Self, ValidationError> {
        let s = s.trim();
        let len = s.chars().count();
        if len == 0 {
            return Err(ValidationError::required(field));
        }
        if len < Self::MIN_LENGTH {
            return Err(ValidationError::new(
                field,
                format!("must be at least {} characters", Self::MIN_LENGTH),
            ));
        }
        if len > Self::MAX_LENGTH {
            return Err(ValidationError::new(
                field,
                format!("must be at most {} characters", Self::MAX_LENGTH),
            ));
        }
        Ok(Self(s.to_owned()))
    }

    /// Returns the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A validated shipping address, serialized in the commerce API's shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub details: String,
    pub phone: Phone,
    pub city: String,
}

impl ShippingAddress {
    /// Validate raw address fields. All errors are collected.
    ///
    /// # Errors
    ///
    /// Returns every field error found.
    pub fn parse(details: &str, phone: &str, city: &str) -> Result<Self, Vec<ValidationError>> {
        let mut errors = Vec::new();

        let details = details.trim();
        if details.is_empty() {
            errors.push(ValidationError::required("details"));
        }
        let city = city.trim();
        if city.is_empty() {
            errors.push(ValidationError::required("city"));
        }
        let phone = Phone::parse("phone", phone).map_err(|e| errors.push(e)).ok();

        match phone {
            Some(phone) if errors.is_empty() => Ok(Self {
                details: details.to_owned(),
                phone,
                city: city.to_owned(),
            }),
            _ => Err(errors),
        }
    }
}

/// A registration request that passed local validation.
#[derive(Debug, Clone)]
pub struct Registration {
    pub name: PersonName,
    pub email: Email,
    pub password: Password,
    pub phone: Phone,
}

/// Validate a sign-up form. All field errors are collected.
///
/// # Errors
///
/// Returns every field error found.
pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
    re_password: &str,
    phone: &str,
) -> Result<Registration, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let name = PersonName::parse("name", name).map_err(|e| errors.push(e)).ok();
    let email = Email::parse(email)
        .map_err(|e| errors.push(email_error("email", &e)))
        .ok();
    let password = Password::parse("password", password)
        .map_err(|e| errors.push(e))
        .ok();
    if re_password.is_empty() {
        errors.push(ValidationError::required("rePassword"));
    } else if let Some(password) = &password
        && re_password != password.expose()
    {
        errors.push(ValidationError::new("rePassword", "passwords do not match"));
    }
    let phone = Phone::parse("phone", phone).map_err(|e| errors.push(e)).ok();

    match (name, email, password, phone) {
        (Some(name), Some(email), Some(password), Some(phone)) if errors.is_empty() => {
            Ok(Registration {
                name,
                email,
                password,
                phone,
            })
        }
        _ => Err(errors),
    }
}

/// Convert an [`EmailError`] into a field error.
#[must_use]
pub fn email_error(field: &'static str, err: &EmailError) -> ValidationError {
    match err {
        EmailError::Empty => ValidationError::required(field),
        other => ValidationError::new(field, other.to_string()),
    }
}
