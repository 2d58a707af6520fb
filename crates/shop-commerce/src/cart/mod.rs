//! Shopping cart module.
//!
//! Contains the cart, its persistent store, pricing, and coupons.

mod cart;
mod coupon;
mod pricing;
mod store;

pub use cart::{Cart, CartLine, CartState, Variant, MAX_QUANTITY_PER_ITEM};
pub use coupon::{Coupon, CouponBook};
pub use pricing::{compute_summary, compute_summary_with, OrderSummary, PricingPolicy};
pub use store::{CartStore, RemovalDecision, RemovalPrompt, CART_KEY};
