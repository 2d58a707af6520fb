//! Persistent cart store.

use shop_cache::{cache_key, Cache, KvStore};

use crate::cart::{compute_summary_with, Cart, CartLine, CartState, OrderSummary, PricingPolicy};
use crate::error::CommerceError;
use crate::ids::ProductId;

/// Storage key suffix holding the serialized line list.
pub const CART_KEY: &str = "cart";

/// Answer to a removal prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalDecision {
    Confirm,
    Cancel,
}

/// A pending removal awaiting the customer's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovalPrompt {
    product_id: ProductId,
    name: String,
    quantity: i64,
}

impl RemovalPrompt {
    /// Product the prompt is about.
    pub fn product_id(&self) -> &ProductId {
        &self.product_id
    }

    /// Question to show the customer.
    pub fn message(&self) -> String {
        format!(
            "Remove {} (x{}) from your cart?",
            self.name, self.quantity
        )
    }
}

/// Cart held in memory and mirrored to a [`KvStore`].
///
/// The persisted entry is loaded once, on [`CartStore::open`]. Every
/// transition rewrites the whole line list; a transition that leaves the
/// cart empty deletes the entry instead. A failed write leaves the in-memory
/// cart untouched.
#[derive(Debug)]
pub struct CartStore<S> {
    cache: Cache<S>,
    key: String,
    cart: Cart,
    item_count: i64,
    policy: PricingPolicy,
}

impl<S: KvStore> CartStore<S> {
    /// Load the cart persisted under `<namespace>:cart`.
    ///
    /// A missing entry opens an empty cart. An entry that cannot be decoded
    /// is logged and treated as empty.
    pub fn open(store: S, namespace: &str) -> Result<Self, CommerceError> {
        let cache = Cache::new(store);
        let key = cache_key!(namespace, CART_KEY);

        let cart = match cache.get::<Vec<CartLine>>(&key) {
            Ok(Some(lines)) => Cart::from_lines(lines),
            Ok(None) => Cart::new(),
            Err(shop_cache::CacheError::SerializeError(e)) => {
                tracing::warn!(key = %key, error = %e, "discarding unreadable cart");
                Cart::new()
            }
            Err(e) => return Err(e.into()),
        };

        let item_count = cart.item_count();
        tracing::debug!(key = %key, lines = cart.lines().len(), item_count, "cart loaded");

        Ok(Self {
            cache,
            key,
            cart,
            item_count,
            policy: PricingPolicy::default(),
        })
    }

    /// Price summaries with `policy` instead of the standard one.
    pub fn with_policy(mut self, policy: PricingPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Pricing rules in use.
    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    /// Add a line, merging with an existing line for the same product.
    pub fn add(&mut self, line: CartLine) -> Result<(), CommerceError> {
        self.transition(|cart| cart.add(line))
    }

    /// Set a line's quantity, raising values below 1 to 1.
    pub fn update_quantity(
        &mut self,
        product_id: &ProductId,
        quantity: i64,
    ) -> Result<i64, CommerceError> {
        self.transition(|cart| cart.update_quantity(product_id, quantity))
    }

    /// Ask before removing a line. `None` when the product is not in the cart.
    pub fn prompt_removal(&self, product_id: &ProductId) -> Option<RemovalPrompt> {
        self.cart.get(product_id).map(|line| RemovalPrompt {
            product_id: line.product_id.clone(),
            name: line.name.clone(),
            quantity: line.quantity,
        })
    }

    /// Apply the customer's answer to a removal prompt. Returns whether a
    /// line was removed.
    pub fn resolve_removal(
        &mut self,
        prompt: RemovalPrompt,
        decision: RemovalDecision,
    ) -> Result<bool, CommerceError> {
        match decision {
            RemovalDecision::Cancel => Ok(false),
            RemovalDecision::Confirm => {
                self.transition(|cart| Ok(cart.remove(&prompt.product_id)))
            }
        }
    }

    /// Remove every line and the persisted entry.
    pub fn clear(&mut self) -> Result<(), CommerceError> {
        self.transition(|cart| {
            cart.clear();
            Ok(())
        })
    }

    /// Current lines.
    pub fn lines(&self) -> &[CartLine] {
        self.cart.lines()
    }

    /// The in-memory cart.
    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    /// Sum of quantities, updated after every transition.
    pub fn item_count(&self) -> i64 {
        self.item_count
    }

    /// Empty or non-empty.
    pub fn state(&self) -> CartState {
        self.cart.state()
    }

    /// Check if cart is empty.
    pub fn is_empty(&self) -> bool {
        self.cart.is_empty()
    }

    /// Price the cart with the given discount percentage.
    pub fn summary(&self, discount_percent: u32) -> OrderSummary {
        compute_summary_with(&self.policy, self.cart.lines(), discount_percent)
    }

    fn transition<T>(
        &mut self,
        apply: impl FnOnce(&mut Cart) -> Result<T, CommerceError>,
    ) -> Result<T, CommerceError> {
        let mut next = self.cart.clone();
        let outcome = apply(&mut next)?;
        self.write(&next)?;

        self.item_count = next.item_count();
        self.cart = next;
        Ok(outcome)
    }

    fn write(&self, cart: &Cart) -> Result<(), CommerceError> {
        if cart.is_empty() {
            self.cache.delete(&self.key)?;
        } else {
            self.cache.set(&self.key, &cart.lines())?;
        }
        Ok(())
    }
}
