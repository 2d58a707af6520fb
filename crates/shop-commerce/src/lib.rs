//! Storefront domain logic.
//!
//! - **Cart**: lines, the persistent cart store, pricing and coupons
//! - **Checkout**: addresses, the order submission workflow, order history
//! - **Session**: auth state and the session event bus
//! - **Api**: typed client for the storefront REST endpoints
//!
//! # Example
//!
//! ```rust,ignore
//! use shop_commerce::prelude::*;
//! use shop_cache::MemoryStore;
//!
//! let mut cart = CartStore::open(MemoryStore::new(), "shop")?;
//! cart.add(CartLine::new("42", "Solitaire Ring", Money::new(50_000, Currency::USD), 2))?;
//!
//! let coupon = CouponBook::default().redeem("SAVE10")?;
//! let summary = cart.summary(coupon.percent);
//! println!("Total: {}", summary.total.display()); // $980.00
//! ```

pub mod api;
pub mod cart;
pub mod checkout;
pub mod error;
pub mod ids;
pub mod money;
pub mod session;

pub use error::{CheckoutBlocker, CommerceError, ValidationErrors};
pub use ids::*;
pub use money::{Currency, Money};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::error::{CheckoutBlocker, CommerceError, ValidationErrors};
    pub use crate::ids::*;
    pub use crate::money::{Currency, Money};

    // Cart
    pub use crate::cart::{
        compute_summary, Cart, CartLine, CartState, CartStore, Coupon, CouponBook, OrderSummary,
        PricingPolicy, RemovalDecision, RemovalPrompt, Variant,
    };

    // Checkout
    pub use crate::checkout::{
        Address, AddressBook, AddressForm, AddressType, CheckoutDetails, CheckoutFlow, Order,
        OrderDetailView, OrderHistory, OrderStatus, PaymentMethod, ShippingAddress,
        SubmissionState,
    };

    // Session and API
    pub use crate::api::StorefrontApi;
    pub use crate::session::{AuthSession, SessionEvent, SessionEvents, UserProfile};
}
