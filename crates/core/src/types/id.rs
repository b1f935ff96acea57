//! Newtype IDs for type-safe entity references.
//!
//! Every entity is owned by the commerce API, which identifies records with
//! opaque string IDs (24-character hex object IDs in practice). Use the
//! `define_id!` macro to create wrappers that prevent accidentally mixing IDs
//! from different entity types, and that reject values which would be unsafe
//! to splice into an upstream URL path.

use thiserror::Error;

/// Maximum accepted length of an entity ID.
pub const MAX_ID_LENGTH: usize = 64;

/// Errors that can occur when parsing an entity ID.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The input string is empty.
    #[error("id cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("id must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input contains a character outside `[A-Za-z0-9_-]`.
    #[error("id contains invalid character {0:?}")]
    InvalidCharacter(char),
}

/// Validate the raw text of an entity ID.
///
/// # Errors
///
/// Returns an error if the ID is empty, too long, or contains characters
/// other than ASCII alphanumerics, `_` and `-`.
pub fn validate_id(s: &str) -> Result<(), IdError> {
    if s.is_empty() {
        return Err(IdError::Empty);
    }
    if s.len() > MAX_ID_LENGTH {
        return Err(IdError::TooLong { max: MAX_ID_LENGTH });
    }
    if let Some(c) = s
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
    {
        return Err(IdError::InvalidCharacter(c));
    }
    Ok(())
}

/// Macro to define a type-safe string ID wrapper.
///
/// Creates a newtype wrapper around `String` with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`
/// - `parse()` (validated), `as_str()`, `Display`, `FromStr`
///
/// Deserialization does not validate: values coming back from the commerce
/// API are trusted. Values coming from clients go through `parse()`.
///
/// # Example
///
/// ```rust
/// # use bazaar_core::define_id;
/// define_id!(WidgetId);
/// define_id!(GadgetId);
///
/// let widget = WidgetId::parse("6428ebc6dc1175abc65ca0b9").unwrap();
/// assert_eq!(widget.as_str(), "6428ebc6dc1175abc65ca0b9");
///
/// // These are different types, so this won't compile:
/// // let _: GadgetId = widget;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Parse an ID supplied by a client.
            ///
            /// # Errors
            ///
            /// Returns an error if the value is not a safe entity ID.
            pub fn parse(s: &str) -> ::core::result::Result<Self, $crate::IdError> {
                let trimmed = s.trim();
                $crate::validate_id(trimmed)?;
                Ok(Self(trimmed.to_owned()))
            }

            /// Get the ID as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume the ID and return the inner string.
            #[must_use]
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::IdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

// Entities owned by the commerce API
define_id!(UserId);
define_id!(ProductId);
define_id!(CategoryId);
define_id!(SubcategoryId);
define_id!(BrandId);
define_id!(CartId);
define_id!(CartLineId);
define_id!(OrderId);
