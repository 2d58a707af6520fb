//! Order types.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::{OrderSummary, Variant};
use crate::ids::{OrderId, ProductId};
use crate::money::Money;

/// Days after delivery during which a return can be requested.
pub const RETURN_WINDOW_DAYS: i64 = 30;

/// Placeholder shown for address fields that could not be recovered.
pub const NOT_AVAILABLE: &str = "N/A";

/// Order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Order placed, awaiting processing.
    #[default]
    Pending,
    /// Order confirmed.
    Confirmed,
    /// Order being prepared.
    Processing,
    /// Order shipped.
    Shipped,
    /// Order delivered.
    Delivered,
    /// Order cancelled.
    Cancelled,
    /// Order refunded.
    Refunded,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Processing => "Processing",
            OrderStatus::Shipped => "Shipped",
            OrderStatus::Delivered => "Delivered",
            OrderStatus::Cancelled => "Cancelled",
            OrderStatus::Refunded => "Refunded",
        }
    }

    /// Parse a status string, ignoring case. "canceled" is accepted.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "pending" => Some(OrderStatus::Pending),
            "confirmed" => Some(OrderStatus::Confirmed),
            "processing" => Some(OrderStatus::Processing),
            "shipped" => Some(OrderStatus::Shipped),
            "delivered" => Some(OrderStatus::Delivered),
            "cancelled" | "canceled" => Some(OrderStatus::Cancelled),
            "refunded" => Some(OrderStatus::Refunded),
            _ => None,
        }
    }

    /// Check if order is in a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Delivered | OrderStatus::Cancelled | OrderStatus::Refunded
        )
    }

    /// Check if the customer can still cancel.
    pub fn can_cancel(&self) -> bool {
        matches!(
            self,
            OrderStatus::Pending | OrderStatus::Confirmed | OrderStatus::Processing
        )
    }
}

/// How the customer pays.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum PaymentMethod {
    /// Cash on delivery.
    #[default]
    CashOnDelivery,
    Card,
    Upi,
    /// Anything else the server reports, kept verbatim.
    Other(String),
}

impl PaymentMethod {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentMethod::CashOnDelivery => "cod",
            PaymentMethod::Card => "card",
            PaymentMethod::Upi => "upi",
            PaymentMethod::Other(other) => other,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            PaymentMethod::CashOnDelivery => "Cash on Delivery",
            PaymentMethod::Card => "Card",
            PaymentMethod::Upi => "UPI",
            PaymentMethod::Other(other) => other,
        }
    }
}

impl From<String> for PaymentMethod {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "cod" | "cash" | "cash_on_delivery" => PaymentMethod::CashOnDelivery,
            "card" => PaymentMethod::Card,
            "upi" => PaymentMethod::Upi,
            _ => PaymentMethod::Other(value),
        }
    }
}

impl From<PaymentMethod> for String {
    fn from(value: PaymentMethod) -> Self {
        value.as_str().to_string()
    }
}

/// Shipping address as recorded on an order.
///
/// Fields that could not be recovered hold [`NOT_AVAILABLE`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingAddress {
    pub name: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub country: String,
    pub phone: String,
}

impl ShippingAddress {
    /// Every field set to [`NOT_AVAILABLE`].
    pub fn unavailable() -> Self {
        let na = || NOT_AVAILABLE.to_string();
        Self {
            name: na(),
            street: na(),
            city: na(),
            state: na(),
            zip: na(),
            country: na(),
            phone: na(),
        }
    }

    /// Whether nothing could be recovered.
    pub fn is_unavailable(&self) -> bool {
        *self == Self::unavailable()
    }

    /// Lines for display.
    pub fn lines(&self) -> Vec<String> {
        vec![
            self.name.clone(),
            self.street.clone(),
            format!("{}, {} {}", self.city, self.state, self.zip),
            self.country.clone(),
            format!("Phone: {}", self.phone),
        ]
    }
}

impl Default for ShippingAddress {
    fn default() -> Self {
        Self::unavailable()
    }
}

/// A line in a placed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: Option<ProductId>,
    pub name: String,
    pub quantity: i64,
    pub unit_price: Money,
    pub variant: Variant,
}

impl OrderLine {
    /// unit_price * quantity, saturating.
    pub fn line_total(&self) -> Money {
        Money::new(
            self.unit_price.amount_cents.saturating_mul(self.quantity),
            self.unit_price.currency,
        )
    }
}

/// A placed order, as returned by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    /// Human-readable order number.
    pub order_number: String,
    pub lines: Vec<OrderLine>,
    /// Amounts as computed by the server.
    pub summary: OrderSummary,
    pub shipping_address: ShippingAddress,
    pub status: OrderStatus,
    pub payment_method: PaymentMethod,
    pub tracking_number: Option<String>,
    pub delivery_date: Option<DateTime<Utc>>,
    pub created_at: Option<DateTime<Utc>>,
    pub coupon_code: Option<String>,
    pub special_instructions: Option<String>,
}

impl Order {
    /// Get total item count.
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Whether the customer can still cancel.
    pub fn can_cancel(&self) -> bool {
        self.status.can_cancel()
    }

    /// Whether a return can be requested at `now`: the order is delivered
    /// and the delivery date is no more than 30 days before `now`. Orders
    /// without a delivery date are not returnable.
    pub fn can_request_return(&self, now: DateTime<Utc>) -> bool {
        if self.status != OrderStatus::Delivered {
            return false;
        }
        match self.delivery_date {
            Some(delivered) => {
                let age = now.signed_duration_since(delivered);
                age >= Duration::zero() && age <= Duration::days(RETURN_WINDOW_DAYS)
            }
            None => false,
        }
    }
}

/// Aggregate order counts for the signed-in user.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrderStats {
    pub total_orders: u64,
    pub pending_orders: u64,
    pub processing_orders: u64,
    pub shipped_orders: u64,
    pub delivered_orders: u64,
    pub cancelled_orders: u64,
    /// Lifetime spend in major units, as reported by the server.
    #[serde(deserialize_with = "crate::checkout::decode::lenient_amount")]
    pub total_spent: f64,
}
