//! Place an order from the cart.

use anyhow::{anyhow, bail, Result};
use dialoguer::Confirm;
use shop_commerce::cart::CouponBook;
use shop_commerce::checkout::{
    AddressBook, CheckoutDetails, CheckoutFlow, OrderDetailView, PaymentMethod,
};
use shop_commerce::error::{CheckoutBlocker, CommerceError};
use shop_commerce::ids::AddressId;

use super::cart::print_summary;
use super::CheckoutArgs;
use crate::context::Context;

/// Run the checkout command.
pub async fn run(args: CheckoutArgs, ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let session = ctx.session(&store);
    let mut cart = ctx.cart(&store)?;

    let authenticated = session.is_authenticated()?;
    let api = ctx.authed_api(&session)?;

    let coupon = match args.coupon.as_deref() {
        Some(code) => Some(CouponBook::default().redeem(code)?),
        None => None,
    };
    let details = CheckoutDetails {
        special_instructions: args.note.unwrap_or_default(),
        coupon,
        payment_method: PaymentMethod::from(args.payment),
    };
    let mut flow = CheckoutFlow::new(details);

    let mut book = AddressBook::new();
    if authenticated {
        if !session.is_profile_complete() {
            ctx.output
                .warn("Your profile is missing a name or email. Update it with `shop profile`.");
        }

        let spinner = ctx.output.spinner("Loading addresses...");
        let loaded = book.refresh(&api).await.map(|_| ());
        spinner.finish_and_clear();
        loaded?;

        if let Some(id) = args.address.as_deref() {
            if !book.select(&AddressId::new(id)) {
                bail!("Address {} not found. List addresses with `shop address list`.", id);
            }
        }
    }

    if !ctx.output.is_json() && authenticated && !cart.is_empty() {
        ctx.output.header("Checkout");
        if let Some(address) = book.selected_address() {
            ctx.output.kv("Ship to", &address.one_line());
        }
        ctx.output
            .kv("Payment", flow.details().payment_method.display_name());
        if let Some(coupon) = &flow.details().coupon {
            ctx.output
                .kv("Coupon", &format!("{} ({}% off)", coupon.code, coupon.percent));
        }
        print_summary(ctx, &flow.summary(&cart));

        if !args.yes
            && book.selected_address().is_some()
            && !Confirm::new()
                .with_prompt("Place this order?")
                .default(true)
                .interact()?
        {
            ctx.output.info("Order not placed");
            return Ok(());
        }
    }

    let spinner = ctx.output.spinner("Placing order...");
    let placed = flow
        .submit(&api, authenticated, &mut cart, &book)
        .await
        .cloned();
    spinner.finish_and_clear();

    let order = match placed {
        Ok(order) => order,
        Err(CommerceError::Precondition(blocker)) => return Err(blocked(blocker)),
        Err(e) => {
            let message = flow.error().map(str::to_string).unwrap_or_else(|| e.to_string());
            return Err(anyhow!(message));
        }
    };

    if ctx.output.is_json() {
        ctx.output.json(&order);
        return Ok(());
    }

    ctx.output
        .success(&format!("Order placed! Order number: {}", order.order_number));
    ctx.output.text(&OrderDetailView::new(&order).to_string());
    Ok(())
}

/// Error for a failed precondition, with what to do about it.
fn blocked(blocker: CheckoutBlocker) -> anyhow::Error {
    let hint = match blocker {
        CheckoutBlocker::NotAuthenticated => "Run `shop login` first.",
        CheckoutBlocker::EmptyCart => "Add products with `shop cart add`.",
        CheckoutBlocker::NoAddressSelected => "Add an address with `shop address add`.",
    };
    anyhow!("{}. {}", blocker, hint)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blocked_messages_carry_hints() {
        assert_eq!(
            blocked(CheckoutBlocker::NotAuthenticated).to_string(),
            "Please sign in to place an order. Run `shop login` first."
        );
        assert!(blocked(CheckoutBlocker::EmptyCart)
            .to_string()
            .starts_with("Your cart is empty."));
    }
}
