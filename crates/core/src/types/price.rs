//! Type-safe price representation using decimal arithmetic.
//!
//! The commerce API quotes every amount in Egyptian pounds as a bare JSON
//! number, so `Price` carries no currency field. Formatting follows the
//! storefront locale.

use core::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::Locale;

/// An amount in Egyptian pounds (EGP).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(Decimal);

impl Price {
    /// ISO 4217 code of the store currency.
    pub const CURRENCY_CODE: &'static str = "EGP";

    /// Arabic currency abbreviation used in `ar` displays.
    const ARABIC_SYMBOL: &'static str = "ج.م";

    /// Create a price from a decimal amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Create a price from whole pounds.
    #[must_use]
    pub fn from_pounds(pounds: i64) -> Self {
        Self(Decimal::from(pounds))
    }

    /// The underlying amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Multiply by a line quantity.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }

    /// Format for display in the given locale.
    ///
    /// `en`: `EGP 1,234.50`; `ar`: `1,234.50 ج.م`.
    #[must_use]
    pub fn display(&self, locale: Locale) -> String {
        let number = group_thousands(self.0);
        match locale {
            Locale::En => format!("{} {number}", Self::CURRENCY_CODE),
            Locale::Ar => format!("{number} {}", Self::ARABIC_SYMBOL),
        }
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display(Locale::En))
    }
}

impl core::iter::Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        Self(iter.map(|p| p.0).sum())
    }
}

/// Round to two places and insert thousands separators.
fn group_thousands(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{fraction}")
}
