//! Commerce error types.

use std::collections::BTreeMap;
use std::fmt;

use thiserror::Error;

use crate::money::Money;

/// Message shown when the server gives no usable reason for a failure.
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Errors that can occur in e-commerce operations.
#[derive(Error, Debug)]
pub enum CommerceError {
    /// Product not in cart.
    #[error("Item not in cart: {0}")]
    ItemNotInCart(String),

    /// Order not found.
    #[error("Order not found: {0}")]
    OrderNotFound(String),

    /// Invalid quantity.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Unit price below zero.
    #[error("Invalid price: {0}")]
    InvalidPrice(Money),

    /// Quantity exceeds maximum allowed.
    #[error("Quantity {0} exceeds maximum allowed ({1})")]
    QuantityExceedsLimit(i64, i64),

    /// Invalid discount code.
    #[error("Invalid coupon code: {0}")]
    InvalidDiscountCode(String),

    /// Order status change not allowed from the current status.
    #[error("Cannot {action} an order that is {status}")]
    InvalidStatusTransition {
        action: &'static str,
        status: String,
    },

    /// A checkout precondition failed before any request was sent.
    #[error("{0}")]
    Precondition(#[from] CheckoutBlocker),

    /// An order submission is already in flight.
    #[error("An order is already being placed")]
    SubmissionInProgress,

    /// Field-level validation failure.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// Arithmetic overflow.
    #[error("Arithmetic overflow in money calculation")]
    Overflow,

    /// The server rejected or failed the request.
    #[error("{message}")]
    Api { status: Option<u16>, message: String },

    /// Local storage error.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl CommerceError {
    /// Message suitable for a transient notification.
    ///
    /// Server failures show the server's message; transport failures and
    /// blank messages show [`GENERIC_FAILURE_MESSAGE`].
    pub fn user_message(&self) -> String {
        match self {
            CommerceError::Api {
                status: Some(_),
                message,
            } if !message.trim().is_empty() => message.clone(),
            CommerceError::Api { .. } => GENERIC_FAILURE_MESSAGE.to_string(),
            other => other.to_string(),
        }
    }

    /// Whether the failure means the user has to sign in again.
    pub fn is_unauthorized(&self) -> bool {
        matches!(
            self,
            CommerceError::Api {
                status: Some(401) | Some(403),
                ..
            } | CommerceError::Precondition(CheckoutBlocker::NotAuthenticated)
        )
    }
}

/// Why an order cannot be placed yet.
///
/// Checked in declaration order; the first failing check wins.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutBlocker {
    /// No signed-in user.
    #[error("Please sign in to place an order")]
    NotAuthenticated,

    /// The cart has no lines.
    #[error("Your cart is empty")]
    EmptyCart,

    /// No shipping address is selected, or the selection no longer exists.
    #[error("Please select a shipping address")]
    NoAddressSelected,
}

/// Per-field validation messages, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationErrors {
    fields: BTreeMap<&'static str, String>,
}

impl ValidationErrors {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message for `field`. The first message per field is kept.
    pub fn add(&mut self, field: &'static str, message: impl Into<String>) {
        self.fields.entry(field).or_insert_with(|| message.into());
    }

    /// Message for `field`, if it failed.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.fields.get(field).map(String::as_str)
    }

    /// Whether no field failed.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Number of failing fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterate over `(field, message)` pairs in field-name order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    /// `Ok(())` when empty, otherwise `CommerceError::Validation`.
    pub fn into_result(self) -> Result<(), CommerceError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CommerceError::Validation(self))
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .fields
            .iter()
            .map(|(field, message)| format!("{}: {}", field, message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl From<shop_data::FetchError> for CommerceError {
    fn from(e: shop_data::FetchError) -> Self {
        match e {
            shop_data::FetchError::HttpError { status, message } => CommerceError::Api {
                status: Some(status),
                message: if message == shop_data::UNKNOWN_ERROR_MESSAGE {
                    String::new()
                } else {
                    message
                },
            },
            other => CommerceError::Api {
                status: None,
                message: other.to_string(),
            },
        }
    }
}

impl From<shop_cache::CacheError> for CommerceError {
    fn from(e: shop_cache::CacheError) -> Self {
        CommerceError::Storage(e.to_string())
    }
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}
