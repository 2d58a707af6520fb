//! Cart pricing calculations.
//!
//! Pure functions: the same lines and discount always produce the same
//! summary, and nothing here fails. Amounts saturate instead of overflowing.

use crate::cart::CartLine;
use crate::money::{Currency, Money};
use serde::{Deserialize, Serialize};

/// Shipping and tax rules applied to a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingPolicy {
    /// Shipping is free when the subtotal is strictly above this amount.
    pub free_shipping_threshold: Money,
    /// Shipping charged at or below the threshold.
    pub flat_shipping_fee: Money,
    /// Flat tax rate in basis points (800 = 8%).
    pub tax_rate_bps: u32,
}

impl PricingPolicy {
    /// The standard policy (free shipping above 500.00, otherwise 50.00;
    /// 8% tax) in the given currency.
    pub fn standard(currency: Currency) -> Self {
        Self {
            free_shipping_threshold: Money::new(50_000, currency),
            flat_shipping_fee: Money::new(5_000, currency),
            tax_rate_bps: 800,
        }
    }

    /// Currency the policy charges in.
    pub fn currency(&self) -> Currency {
        self.flat_shipping_fee.currency
    }
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self::standard(Currency::default())
    }
}

/// Complete pricing breakdown for a cart or order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct OrderSummary {
    /// Sum of unit price * quantity.
    pub subtotal: Money,
    /// Shipping cost.
    pub shipping: Money,
    /// Tax amount.
    pub tax: Money,
    /// Coupon discount.
    pub discount: Money,
    /// subtotal + shipping - discount + tax.
    pub total: Money,
}

impl OrderSummary {
    /// A summary with every component zero.
    pub fn zero(currency: Currency) -> Self {
        let zero = Money::zero(currency);
        Self {
            subtotal: zero,
            shipping: zero,
            tax: zero,
            discount: zero,
            total: zero,
        }
    }

    /// Check if a discount is applied.
    pub fn has_discount(&self) -> bool {
        self.discount.is_positive()
    }

    /// Check if shipping is free.
    pub fn has_free_shipping(&self) -> bool {
        self.shipping.is_zero()
    }
}

/// Compute the summary under the standard policy in the lines' currency.
pub fn compute_summary(lines: &[CartLine], discount_percent: u32) -> OrderSummary {
    let currency = lines
        .first()
        .map(|l| l.unit_price.currency)
        .unwrap_or_default();
    compute_summary_with(&PricingPolicy::standard(currency), lines, discount_percent)
}

/// Compute the summary under an explicit policy.
///
/// `discount_percent` is clamped to 100. Each component is rounded to whole
/// cents on its own before the total is formed.
pub fn compute_summary_with(
    policy: &PricingPolicy,
    lines: &[CartLine],
    discount_percent: u32,
) -> OrderSummary {
    let currency = policy.currency();

    let subtotal_cents = lines.iter().fold(0_i64, |acc, line| {
        acc.saturating_add(line.unit_price.amount_cents.saturating_mul(line.quantity))
    });
    let subtotal = Money::new(subtotal_cents, currency);

    let shipping = if subtotal_cents > policy.free_shipping_threshold.amount_cents {
        Money::zero(currency)
    } else {
        policy.flat_shipping_fee
    };

    let tax = subtotal
        .apply_bps(policy.tax_rate_bps)
        .unwrap_or(Money::new(i64::MAX, currency));

    let discount_bps = discount_percent.min(100) * 100;
    let discount = subtotal
        .apply_bps(discount_bps)
        .unwrap_or(subtotal);

    let total_cents = subtotal
        .amount_cents
        .saturating_add(shipping.amount_cents)
        .saturating_sub(discount.amount_cents)
        .saturating_add(tax.amount_cents);

    OrderSummary {
        subtotal,
        shipping,
        tax,
        discount,
        total: Money::new(total_cents, currency),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(id: &str, cents: i64, quantity: i64) -> CartLine {
        CartLine::new(id, id, Money::new(cents, Currency::USD), quantity)
    }

    #[test]
    fn test_subtotal_is_sum_of_line_products() {
        let lines = [line("a", 1999, 3), line("b", 4550, 2)];
        let summary = compute_summary(&lines, 0);
        assert_eq!(summary.subtotal.amount_cents, 1999 * 3 + 4550 * 2);
    }

    #[test]
    fn test_total_formula() {
        let lines = [line("a", 12_345, 1)];
        let summary = compute_summary(&lines, 10);

        // 123.45 + 50.00 - 12.35 + 9.88
        assert_eq!(summary.shipping.amount_cents, 5_000);
        assert_eq!(summary.discount.amount_cents, 1_235);
        assert_eq!(summary.tax.amount_cents, 988);
        assert_eq!(summary.total.amount_cents, 12_345 + 5_000 - 1_235 + 988);
    }

    #[test]
    fn test_shipping_boundary_at_exactly_threshold() {
        let at = compute_summary(&[line("a", 50_000, 1)], 0);
        assert_eq!(at.shipping.amount_cents, 5_000);

        let above = compute_summary(&[line("a", 50_001, 1)], 0);
        assert!(above.has_free_shipping());

        let below = compute_summary(&[line("a", 49_999, 1)], 0);
        assert_eq!(below.shipping.amount_cents, 5_000);
    }

    #[test]
    fn test_ten_percent_of_thousand() {
        let summary = compute_summary(&[line("a", 50_000, 2)], 10);
        assert_eq!(summary.subtotal.amount_cents, 100_000);
        assert_eq!(summary.discount.amount_cents, 10_000);
        assert_eq!(summary.shipping.amount_cents, 0);
        assert_eq!(summary.tax.amount_cents, 8_000);
        assert_eq!(summary.total.amount_cents, 98_000);
    }

    #[test]
    fn test_empty_cart() {
        let summary = compute_summary(&[], 25);
        assert_eq!(summary.subtotal.amount_cents, 0);
        assert_eq!(summary.discount.amount_cents, 0);
        assert_eq!(summary.tax.amount_cents, 0);
        assert_eq!(summary.shipping.amount_cents, 5_000);
    }

    #[test]
    fn test_discount_clamped() {
        let summary = compute_summary(&[line("a", 1_000, 1)], 250);
        assert_eq!(summary.discount, summary.subtotal);
    }

    #[test]
    fn test_custom_policy() {
        let policy = PricingPolicy {
            free_shipping_threshold: Money::new(10_000, Currency::INR),
            flat_shipping_fee: Money::new(9_900, Currency::INR),
            tax_rate_bps: 300,
        };
        let lines = [CartLine::new("a", "a", Money::new(10_000, Currency::INR), 1)];
        let summary = compute_summary_with(&policy, &lines, 0);

        assert_eq!(summary.shipping.amount_cents, 9_900);
        assert_eq!(summary.tax.amount_cents, 300);
        assert_eq!(summary.total.currency, Currency::INR);
    }

    #[test]
    fn test_huge_values_saturate() {
        let summary = compute_summary(&[line("a", i64::MAX, 2)], 0);
        assert_eq!(summary.subtotal.amount_cents, i64::MAX);
    }
}
