//! Storefront locales.
//!
//! Every page URL carries a locale prefix (`/en/...`, `/ar/...`). When a
//! request arrives without one, the locale is negotiated from a cookie and the
//! `Accept-Language` header.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned for an unsupported locale tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported locale: {0}")]
pub struct LocaleError(pub String);

/// Text direction for a locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Ltr,
    Rtl,
}

/// A supported storefront locale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ar,
}

impl Locale {
    /// All supported locales, default first.
    pub const ALL: [Self; 2] = [Self::En, Self::Ar];

    /// The URL prefix / language tag.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Ar => "ar",
        }
    }

    /// Text direction used when rendering this locale.
    #[must_use]
    pub const fn direction(self) -> Direction {
        match self {
            Self::En => Direction::Ltr,
            Self::Ar => Direction::Rtl,
        }
    }

    /// Match a language tag such as `ar-EG` or `en` against supported locales.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let primary = tag.trim().split(['-', '_']).next()?.to_ascii_lowercase();
        Self::ALL.into_iter().find(|l| l.as_str() == primary)
    }

    /// Pick the best supported locale from an `Accept-Language` header value.
    ///
    /// Entries are ranked by their `q` weight (default 1.0); ties keep header
    /// order. Entries with `q=0` are ignored.
    #[must_use]
    pub fn negotiate(accept_language: &str) -> Option<Self> {
        let mut ranked: Vec<(f32, usize, Self)> = accept_language
            .split(',')
            .enumerate()
            .filter_map(|(position, entry)| {
                let mut parts = entry.split(';');
                let locale = Self::from_tag(parts.next()?)?;
                let weight = parts
                    .find_map(|p| p.trim().strip_prefix("q="))
                    .map_or(Some(1.0), |q| q.trim().parse::<f32>().ok())?;
                (weight > 0.0).then_some((weight, position, locale))
            })
            .collect();

        ranked.sort_by(|a, b| b.0.total_cmp(&a.0).then(a.1.cmp(&b.1)));
        ranked.first().map(|(_, _, locale)| *locale)
    }

    /// Split a request path into its locale prefix and the remainder.
    ///
    /// `"/ar/products"` yields `Some((Ar, "/products"))`; `"/en"` yields
    /// `Some((En, "/"))`.
    #[must_use]
    pub fn strip_prefix(path: &str) -> Option<(Self, &str)> {
        let trimmed = path.strip_prefix('/')?;
        let (head, rest) = trimmed
            .find('/')
            .map_or((trimmed, "/"), |i| (&trimmed[..i], &trimmed[i..]));
        let locale = head.parse::<Self>().ok()?;
        Some((locale, rest))
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = LocaleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Self::En),
            "ar" => Ok(Self::Ar),
            other => Err(LocaleError(other.to_string())),
        }
    }
}
