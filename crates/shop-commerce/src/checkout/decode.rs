//! Lenient decoding of order payloads.
//!
//! Older orders store the shipping address and line variants as JSON text,
//! and some were encoded twice. Everything is normalised here, once, into
//! [`Order`]. Nothing in this module fails: fields that cannot be recovered
//! become "N/A" (addresses) or `None` (variants, dates), and the fallback is
//! logged.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use crate::cart::{OrderSummary, Variant};
use crate::checkout::order::{
    Order, OrderLine, OrderStatus, PaymentMethod, ShippingAddress, NOT_AVAILABLE,
};
use crate::ids::{OrderId, ProductId};
use crate::money::{Currency, Money};

/// Encodings seen for object-valued order fields.
#[derive(Debug, Clone, PartialEq)]
pub enum LenientField {
    /// A JSON object, used as is.
    Object(Map<String, Value>),
    /// JSON text, possibly encoding another JSON string.
    Encoded(String),
    /// Null, missing, or a value of the wrong type.
    Absent,
}

impl LenientField {
    pub fn from_value(value: &Value) -> Self {
        match value {
            Value::Object(map) => LenientField::Object(map.clone()),
            Value::String(text) => LenientField::Encoded(text.clone()),
            _ => LenientField::Absent,
        }
    }

    /// Unwrap to an object, parsing at most twice.
    ///
    /// `Err` carries a reason when the text could not be parsed into an
    /// object; `Ok(None)` means there was nothing to decode.
    pub fn into_object(self) -> Result<Option<Map<String, Value>>, String> {
        match self {
            LenientField::Object(map) => Ok(Some(map)),
            LenientField::Absent => Ok(None),
            LenientField::Encoded(text) => {
                if text.trim().is_empty() {
                    return Ok(None);
                }
                let first: Value =
                    serde_json::from_str(&text).map_err(|e| format!("first parse: {}", e))?;
                match first {
                    Value::Object(map) => Ok(Some(map)),
                    Value::String(inner) => {
                        match serde_json::from_str(&inner)
                            .map_err(|e| format!("second parse: {}", e))?
                        {
                            Value::Object(map) => Ok(Some(map)),
                            other => Err(format!("decoded to {}", kind(&other))),
                        }
                    }
                    other => Err(format!("decoded to {}", kind(&other))),
                }
            }
        }
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn decode_object(field: &'static str, value: &Value) -> Option<Map<String, Value>> {
    match LenientField::from_value(value).into_object() {
        Ok(map) => map,
        Err(reason) => {
            tracing::warn!(field, reason = %reason, "unreadable order field, using placeholder");
            None
        }
    }
}

/// First of `keys` holding a non-empty string or a number, as text.
fn text_field(map: &Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match map.get(*key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn text_or_placeholder(map: &Map<String, Value>, keys: &[&str]) -> String {
    text_field(map, keys).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Decode a shipping address in any of its stored encodings.
///
/// Missing fields are "N/A"; an unreadable value gives
/// [`ShippingAddress::unavailable`].
pub fn decode_shipping_address(value: &Value) -> ShippingAddress {
    let Some(map) = decode_object("shippingAddress", value) else {
        return ShippingAddress::unavailable();
    };

    ShippingAddress {
        name: text_or_placeholder(&map, &["name", "fullName"]),
        street: text_or_placeholder(&map, &["street", "address"]),
        city: text_or_placeholder(&map, &["city"]),
        state: text_or_placeholder(&map, &["state"]),
        zip: text_or_placeholder(&map, &["zip", "zipCode", "postalCode"]),
        country: text_or_placeholder(&map, &["country"]),
        phone: text_or_placeholder(&map, &["phone"]),
    }
}

/// Decode a line variant in any of its stored encodings. Missing attributes
/// are `None`.
pub fn decode_variant(value: &Value) -> Variant {
    match decode_object("variant", value) {
        Some(map) => Variant {
            color: text_field(&map, &["color"]),
            size: text_field(&map, &["size"]),
            carat: text_field(&map, &["carat"]),
        },
        None => Variant::default(),
    }
}

/// Deserialize an amount sent as a number or a numeric string. Anything else
/// is 0.
pub fn lenient_amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().map(amount_from_value).unwrap_or(0.0))
}

fn amount_from_value(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Deserialize a quantity sent as a number or a numeric string. Anything
/// else is 1.
fn lenient_quantity<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    let quantity = match value {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    };
    Ok(quantity.unwrap_or(1))
}

/// Parse an RFC 3339 timestamp, or a bare `YYYY-MM-DD HH:MM:SS` taken as UTC.
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(text) {
        return Some(parsed.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}

fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(text)) => parse_timestamp(&text),
        _ => None,
    })
}

/// Deserialize text sent as a string or a number. Null and anything else
/// become an empty string.
pub fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// Deserialize a `T`, reading null as `T::default()`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// An order line as the server sends it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineRecord {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    #[serde(default = "one", deserialize_with = "lenient_quantity")]
    pub quantity: i64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub price: f64,
    #[serde(default)]
    pub variant: Value,
    /// Flat attributes, used when `variant` is absent.
    #[serde(default)]
    pub color: Value,
    #[serde(default)]
    pub size: Value,
    #[serde(default)]
    pub carat: Value,
}

fn one() -> i64 {
    1
}

impl OrderLineRecord {
    pub fn into_line(self, currency: Currency) -> OrderLine {
        let mut variant = decode_variant(&self.variant);
        if variant.is_empty() {
            let flat: Map<String, Value> = [
                ("color".to_string(), self.color),
                ("size".to_string(), self.size),
                ("carat".to_string(), self.carat),
            ]
            .into_iter()
            .collect();
            variant = decode_variant(&Value::Object(flat));
        }

        OrderLine {
            product_id: self.product_id,
            name: if self.name.trim().is_empty() {
                NOT_AVAILABLE.to_string()
            } else {
                self.name
            },
            quantity: self.quantity,
            unit_price: Money::from_decimal(self.price, currency),
            variant,
        }
    }
}

/// An order as the server sends it.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    pub id: OrderId,
    #[serde(default, deserialize_with = "lenient_text")]
    pub order_number: Option<String>,
    #[serde(default, alias = "orderItems")]
    pub items: Vec<OrderLineRecord>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub subtotal: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub shipping: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub tax: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub discount: f64,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total: f64,
    #[serde(default)]
    pub shipping_address: Value,
    #[serde(default, deserialize_with = "lenient_text")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub payment_method: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub tracking_number: Option<String>,
    #[serde(default, alias = "deliveredAt", deserialize_with = "lenient_timestamp")]
    pub delivery_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub coupon_code: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub special_instructions: Option<String>,
}

impl OrderRecord {
    /// Normalise into an [`Order`], amounts in `currency`.
    pub fn into_order(self, currency: Currency) -> Order {
        let status = match self.status.as_deref() {
            Some(raw) => OrderStatus::parse(raw).unwrap_or_else(|| {
                tracing::warn!(order_id = %self.id, status = raw, "unknown order status, treating as pending");
                OrderStatus::Pending
            }),
            None => OrderStatus::Pending,
        };

        let money = |amount: f64| Money::from_decimal(amount, currency);
        let summary = OrderSummary {
            subtotal: money(self.subtotal),
            shipping: money(self.shipping),
            tax: money(self.tax),
            discount: money(self.discount),
            total: money(self.total),
        };

        Order {
            order_number: self
                .order_number
                .unwrap_or_else(|| self.id.as_str().to_string()),
            id: self.id,
            lines: self
                .items
                .into_iter()
                .map(|item| item.into_line(currency))
                .collect(),
            summary,
            shipping_address: decode_shipping_address(&self.shipping_address),
            status,
            payment_method: self
                .payment_method
                .map(PaymentMethod::from)
                .unwrap_or_default(),
            tracking_number: self.tracking_number,
            delivery_date: self.delivery_date,
            created_at: self.created_at,
            coupon_code: self.coupon_code,
            special_instructions: self.special_instructions,
        }
    }
}
