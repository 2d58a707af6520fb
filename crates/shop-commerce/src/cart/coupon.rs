//! Coupon codes.
//!
//! Coupons are a fixed table of codes mapped to a percentage off the
//! subtotal. They are checked locally only: no expiry, no usage limits, and
//! the server is never asked whether a code is valid.

use std::collections::BTreeMap;

use crate::error::CommerceError;
use serde::{Deserialize, Serialize};

/// A recognised coupon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coupon {
    /// Normalised code (trimmed, upper case).
    pub code: String,
    /// Percentage off the subtotal.
    pub percent: u32,
}

impl Coupon {
    /// Discount as a fraction of the subtotal (0.10 for 10%).
    pub fn fraction(&self) -> f64 {
        f64::from(self.percent) / 100.0
    }
}

/// The table of accepted coupon codes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CouponBook {
    codes: BTreeMap<String, u32>,
}

impl Default for CouponBook {
    fn default() -> Self {
        Self::from_codes([("SAVE10", 10), ("SAVE15", 15), ("SAVE20", 20), ("SAVE25", 25)])
    }
}

impl CouponBook {
    /// Build a book from `(code, percent)` pairs.
    pub fn from_codes<'a>(codes: impl IntoIterator<Item = (&'a str, u32)>) -> Self {
        Self {
            codes: codes
                .into_iter()
                .map(|(code, percent)| (normalize(code), percent.min(100)))
                .collect(),
        }
    }

    /// Look up `code`. Unknown codes yield `InvalidDiscountCode`, whose
    /// message is what the customer sees.
    pub fn redeem(&self, code: &str) -> Result<Coupon, CommerceError> {
        let code = normalize(code);
        match self.codes.get(&code) {
            Some(&percent) => {
                tracing::debug!(code = %code, percent, "coupon accepted");
                Ok(Coupon { code, percent })
            }
            None => {
                tracing::warn!(code = %code, "coupon rejected");
                Err(CommerceError::InvalidDiscountCode(code))
            }
        }
    }

    /// Percentage off for `code`, 0 when the code is unknown.
    pub fn discount_percent(&self, code: &str) -> u32 {
        self.codes.get(&normalize(code)).copied().unwrap_or(0)
    }

    /// Every code in the book.
    pub fn codes(&self) -> impl Iterator<Item = (&str, u32)> {
        self.codes.iter().map(|(code, percent)| (code.as_str(), *percent))
    }
}

fn normalize(code: &str) -> String {
    code.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_codes() {
        let book = CouponBook::default();
        assert_eq!(book.discount_percent("SAVE10"), 10);
        assert_eq!(book.discount_percent("SAVE15"), 15);
        assert_eq!(book.discount_percent("SAVE20"), 20);
        assert_eq!(book.discount_percent("SAVE25"), 25);
    }

    #[test]
    fn test_code_is_normalized() {
        let coupon = CouponBook::default().redeem("  save10 ").unwrap();
        assert_eq!(coupon.code, "SAVE10");
        assert!((coupon.fraction() - 0.10).abs() < f64::EPSILON);
    }

    #[test]
    fn test_unknown_code_rejected() {
        let book = CouponBook::default();
        assert_eq!(book.discount_percent("FREESTUFF"), 0);

        let err = book.redeem("freestuff").unwrap_err();
        assert!(matches!(err, CommerceError::InvalidDiscountCode(ref c) if c == "FREESTUFF"));
        assert_eq!(err.to_string(), "Invalid coupon code: FREESTUFF");
    }

    #[test]
    fn test_custom_book_clamps_percent() {
        let book = CouponBook::from_codes([("ALL", 150)]);
        assert_eq!(book.discount_percent("all"), 100);
        assert_eq!(book.codes().count(), 1);
    }
}
