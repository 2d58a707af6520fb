//! Order submission state machine.
//!
//! `Idle -> Submitting -> Succeeded | Failed`. Preconditions are checked
//! before leaving `Idle`, so a blocked checkout never reaches the network.
//! A failure leaves the cart and the address selection as they were.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use shop_cache::KvStore;

use crate::api::StorefrontApi;
use crate::cart::{CartLine, CartStore, Coupon, OrderSummary, Variant};
use crate::checkout::address::Address;
use crate::checkout::address_book::AddressBook;
use crate::checkout::decode::decode_shipping_address;
use crate::checkout::order::{Order, OrderLine, OrderStatus, PaymentMethod, NOT_AVAILABLE};
use crate::error::{CheckoutBlocker, CommerceError};
use crate::ids::{OrderId, ProductId};
use crate::money::{Currency, Money};

/// Where a submission stands.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmissionState {
    #[default]
    Idle,
    /// A create-order request is in flight.
    Submitting,
    /// The order was created and the cart cleared.
    Succeeded,
    /// The request failed; holds the message shown to the customer.
    Failed(String),
}

impl SubmissionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionState::Idle => "idle",
            SubmissionState::Submitting => "submitting",
            SubmissionState::Succeeded => "succeeded",
            SubmissionState::Failed(_) => "failed",
        }
    }

    /// Whether the place-order control should be enabled.
    pub fn can_submit(&self) -> bool {
        !matches!(self, SubmissionState::Submitting)
    }
}

/// One cart line as sent with a new order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: i64,
    /// Unit price in major units.
    pub price: f64,
    #[serde(default)]
    pub variant: Variant,
}

impl From<&CartLine> for NewOrderLine {
    fn from(line: &CartLine) -> Self {
        Self {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            quantity: line.quantity,
            price: line.unit_price.to_decimal(),
            variant: line.variant.clone(),
        }
    }
}

/// Body of `POST /api/orders`.
///
/// The shipping address is sent as a JSON object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrderRequest {
    pub items: Vec<NewOrderLine>,
    pub subtotal: f64,
    pub shipping: f64,
    pub tax: f64,
    pub discount: f64,
    pub total: f64,
    pub shipping_address: Address,
    #[serde(default)]
    pub special_instructions: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coupon_code: Option<String>,
    pub payment_method: PaymentMethod,
}

impl NewOrderRequest {
    /// Bundle the cart, its summary and the chosen address.
    pub fn new(
        lines: &[CartLine],
        summary: &OrderSummary,
        address: &Address,
        details: &CheckoutDetails,
    ) -> Self {
        Self {
            items: lines.iter().map(NewOrderLine::from).collect(),
            subtotal: summary.subtotal.to_decimal(),
            shipping: summary.shipping.to_decimal(),
            tax: summary.tax.to_decimal(),
            discount: summary.discount.to_decimal(),
            total: summary.total.to_decimal(),
            shipping_address: address.clone(),
            special_instructions: details.special_instructions.trim().to_string(),
            coupon_code: details.coupon.as_ref().map(|c| c.code.clone()),
            payment_method: details.payment_method.clone(),
        }
    }

    /// The order this request placed, for when the server's reply cannot be
    /// read. `response` is searched for an `id` and `orderNumber`; without
    /// them the order is labelled "N/A".
    pub fn placed_order(&self, response: &Value, currency: Currency) -> Order {
        let text = |key: &str| match response.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        };
        let id = text("id").or_else(|| text("_id"));
        let order_number = text("orderNumber")
            .or_else(|| id.clone())
            .unwrap_or_else(|| NOT_AVAILABLE.to_string());
        let money = |amount: f64| Money::from_decimal(amount, currency);

        Order {
            id: OrderId::new(id.unwrap_or_else(|| order_number.clone())),
            order_number,
            lines: self
                .items
                .iter()
                .map(|item| OrderLine {
                    product_id: Some(item.product_id.clone()),
                    name: item.name.clone(),
                    quantity: item.quantity,
                    unit_price: money(item.price),
                    variant: item.variant.clone(),
                })
                .collect(),
            summary: OrderSummary {
                subtotal: money(self.subtotal),
                shipping: money(self.shipping),
                tax: money(self.tax),
                discount: money(self.discount),
                total: money(self.total),
            },
            shipping_address: decode_shipping_address(
                &serde_json::to_value(&self.shipping_address).unwrap_or_default(),
            ),
            status: OrderStatus::Pending,
            payment_method: self.payment_method.clone(),
            tracking_number: None,
            delivery_date: None,
            created_at: None,
            coupon_code: self.coupon_code.clone(),
            special_instructions: Some(self.special_instructions.clone())
                .filter(|text| !text.is_empty()),
        }
    }
}

/// Customer choices made on the checkout screen.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CheckoutDetails {
    pub special_instructions: String,
    /// A coupon already accepted by [`CouponBook::redeem`](crate::cart::CouponBook::redeem).
    pub coupon: Option<Coupon>,
    pub payment_method: PaymentMethod,
}

impl CheckoutDetails {
    pub fn discount_percent(&self) -> u32 {
        self.coupon.as_ref().map(|c| c.percent).unwrap_or(0)
    }
}

/// Check the checkout preconditions in order and return the shipping
/// address to use.
pub fn check_preconditions<'a, S: KvStore>(
    authenticated: bool,
    cart: &CartStore<S>,
    addresses: &'a AddressBook,
) -> Result<&'a Address, CheckoutBlocker> {
    if !authenticated {
        return Err(CheckoutBlocker::NotAuthenticated);
    }
    if cart.is_empty() {
        return Err(CheckoutBlocker::EmptyCart);
    }
    addresses
        .selected_address()
        .ok_or(CheckoutBlocker::NoAddressSelected)
}

/// Order submission workflow.
#[derive(Debug, Clone, Default)]
pub struct CheckoutFlow {
    state: SubmissionState,
    details: CheckoutDetails,
    current_order: Option<Order>,
}

impl CheckoutFlow {
    pub fn new(details: CheckoutDetails) -> Self {
        Self {
            details,
            ..Self::default()
        }
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    pub fn details(&self) -> &CheckoutDetails {
        &self.details
    }

    /// Change the checkout choices. Ignored while a request is in flight.
    pub fn set_details(&mut self, details: CheckoutDetails) {
        if self.state.can_submit() {
            self.details = details;
        }
    }

    /// The order shown on the confirmation view.
    pub fn current_order(&self) -> Option<&Order> {
        self.current_order.as_ref()
    }

    /// Message for the customer after a failed submission.
    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SubmissionState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Dismiss a failure message.
    pub fn clear_error(&mut self) {
        if matches!(self.state, SubmissionState::Failed(_)) {
            self.state = SubmissionState::Idle;
        }
    }

    /// Summary for the cart under the current details.
    pub fn summary<S: KvStore>(&self, cart: &CartStore<S>) -> OrderSummary {
        cart.summary(self.details.discount_percent())
    }

    /// Check preconditions and enter `Submitting`.
    ///
    /// Returns the request to send. Nothing changes when this fails.
    pub fn begin<S: KvStore>(
        &mut self,
        authenticated: bool,
        cart: &CartStore<S>,
        addresses: &AddressBook,
    ) -> Result<NewOrderRequest, CommerceError> {
        if !self.state.can_submit() {
            return Err(CommerceError::SubmissionInProgress);
        }
        let address = check_preconditions(authenticated, cart, addresses)?;

        let summary = self.summary(cart);
        let request = NewOrderRequest::new(cart.lines(), &summary, address, &self.details);

        self.state = SubmissionState::Submitting;
        Ok(request)
    }

    /// Record the server's answer to the request returned by [`begin`].
    ///
    /// On success the cart is cleared and the order becomes the current
    /// order. On failure only the state changes.
    ///
    /// [`begin`]: CheckoutFlow::begin
    pub fn finish<S: KvStore>(
        &mut self,
        outcome: Result<Order, CommerceError>,
        cart: &mut CartStore<S>,
    ) -> Result<&Order, CommerceError> {
        if self.state != SubmissionState::Submitting {
            return Err(CommerceError::InvalidStatusTransition {
                action: "complete",
                status: self.state.as_str().to_string(),
            });
        }

        match outcome {
            Ok(order) => {
                tracing::info!(
                    order_id = %order.id,
                    order_number = %order.order_number,
                    total = %order.summary.total.display(),
                    "order placed"
                );
                if let Err(e) = cart.clear() {
                    tracing::warn!(error = %e, "order placed but cart could not be cleared");
                }
                self.state = SubmissionState::Succeeded;
                Ok(self.current_order.insert(order))
            }
            Err(e) => {
                let message = e.user_message();
                tracing::warn!(error = %e, "order submission failed");
                self.state = SubmissionState::Failed(message);
                Err(e)
            }
        }
    }

    /// Run the whole submission: preconditions, request, outcome.
    ///
    /// If the returned future is dropped before the server answers, the flow
    /// goes back to `Idle` and the cart is left alone.
    pub async fn submit<S: KvStore>(
        &mut self,
        api: &StorefrontApi,
        authenticated: bool,
        cart: &mut CartStore<S>,
        addresses: &AddressBook,
    ) -> Result<&Order, CommerceError> {
        let request = self.begin(authenticated, cart, addresses)?;
        let outcome = {
            let mut in_flight = InFlight {
                state: &mut self.state,
                armed: true,
            };
            let outcome = api.create_order(&request).await;
            in_flight.armed = false;
            outcome
        };
        self.finish(outcome, cart)
    }
}

/// Resets `Submitting` to `Idle` when a submission is abandoned mid-request.
struct InFlight<'a> {
    state: &'a mut SubmissionState,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.armed && *self.state == SubmissionState::Submitting {
            tracing::warn!("order submission abandoned before the server answered");
            *self.state = SubmissionState::Idle;
        }
    }
}
