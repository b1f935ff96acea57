//! Status enums for orders and checkout.

use serde::{Deserialize, Serialize};

use crate::Locale;

/// How the customer pays at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    /// Hosted card payment session; the customer is redirected to pay.
    #[default]
    Card,
    /// Cash on delivery; the order is placed immediately.
    Cash,
}

impl PaymentMethod {
    /// Parse the API's `paymentMethodType` field.
    #[must_use]
    pub fn from_api(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "card" => Some(Self::Card),
            "cash" => Some(Self::Cash),
            _ => None,
        }
    }

    /// Localized label.
    #[must_use]
    pub const fn label(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::Card, Locale::En) => "Card",
            (Self::Cash, Locale::En) => "Cash on delivery",
            (Self::Card, Locale::Ar) => "بطاقة",
            (Self::Cash, Locale::Ar) => "الدفع عند الاستلام",
        }
    }
}

/// Overall order progress derived from the API's `isPaid` / `isDelivered` flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Placed but neither paid nor delivered.
    Pending,
    /// Paid, awaiting delivery.
    Paid,
    /// Delivered but not yet paid (cash on delivery in progress).
    DeliveredUnpaid,
    /// Paid and delivered.
    Completed,
}

impl OrderStatus {
    /// Derive the status from the API flags.
    #[must_use]
    pub const fn from_flags(is_paid: bool, is_delivered: bool) -> Self {
        match (is_paid, is_delivered) {
            (false, false) => Self::Pending,
            (true, false) => Self::Paid,
            (false, true) => Self::DeliveredUnpaid,
            (true, true) => Self::Completed,
        }
    }

    /// Localized label.
    #[must_use]
    pub const fn label(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::Pending, Locale::En) => "Pending",
            (Self::Paid, Locale::En) => "Paid",
            (Self::DeliveredUnpaid, Locale::En) => "Delivered, awaiting payment",
            (Self::Completed, Locale::En) => "Completed",
            (Self::Pending, Locale::Ar) => "قيد الانتظار",
            (Self::Paid, Locale::Ar) => "مدفوع",
            (Self::DeliveredUnpaid, Locale::Ar) => "تم التوصيل، في انتظار الدفع",
            (Self::Completed, Locale::Ar) => "مكتمل",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_from_flags() {
        assert_eq!(OrderStatus::from_flags(false, false), OrderStatus::Pending);
        assert_eq!(OrderStatus::from_flags(true, true), OrderStatus::Completed);
        assert_eq!(
            OrderStatus::from_flags(false, true),
            OrderStatus::DeliveredUnpaid
        );
    }

    #[test]
    fn test_payment_method_from_api() {
        assert_eq!(PaymentMethod::from_api("card"), Some(PaymentMethod::Card));
        assert_eq!(PaymentMethod::from_api("Cash"), Some(PaymentMethod::Cash));
        assert_eq!(PaymentMethod::from_api("wallet"), None);
    }

    #[test]
    fn test_payment_method_serde() {
        let method: PaymentMethod = serde_json::from_str("\"cash\"").unwrap_or_default();
        assert_eq!(method, PaymentMethod::Cash);
    }
}
