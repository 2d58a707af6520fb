//! Cart and price summary commands.

use anyhow::{bail, Result};
use dialoguer::Confirm;
use serde_json::json;
use shop_commerce::cart::{CartLine, CouponBook, OrderSummary, RemovalDecision, Variant};
use shop_commerce::ids::ProductId;
use shop_commerce::money::Money;

use super::{CartArgs, CartCommand, SummaryArgs};
use crate::context::Context;

/// Run the cart command.
pub async fn run(args: CartArgs, ctx: &Context) -> Result<()> {
    match args.command.unwrap_or(CartCommand::List) {
        CartCommand::List => list(ctx),
        CartCommand::Add {
            product_id,
            name,
            price,
            quantity,
            color,
            size,
            carat,
        } => {
            let variant = Variant { color, size, carat };
            add(ctx, product_id, name, price, quantity, variant)
        }
        CartCommand::Update {
            product_id,
            quantity,
        } => update(ctx, &product_id, quantity),
        CartCommand::Remove { product_id, yes } => remove(ctx, &product_id, yes),
        CartCommand::Clear { yes } => clear(ctx, yes),
    }
}

/// Run the summary command.
pub async fn summary(args: SummaryArgs, ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let cart = ctx.cart(&store)?;

    let percent = match args.coupon.as_deref() {
        Some(code) => CouponBook::default().redeem(code)?.percent,
        None => 0,
    };
    let summary = cart.summary(percent);

    if ctx.output.is_json() {
        ctx.output.json(&json!({
            "itemCount": cart.item_count(),
            "discountPercent": percent,
            "summary": summary,
        }));
        return Ok(());
    }

    ctx.output.header("Order Summary");
    if cart.is_empty() {
        ctx.output.info("Your cart is empty");
    }
    print_summary(ctx, &summary);
    Ok(())
}

fn list(ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let cart = ctx.cart(&store)?;

    if ctx.output.is_json() {
        ctx.output.json(&cart.lines());
        return Ok(());
    }

    ctx.output.header(&format!("Cart ({} items)", cart.item_count()));
    if cart.is_empty() {
        ctx.output.info("Your cart is empty");
        return Ok(());
    }

    let widths = [12, 32, 5, 10];
    ctx.output.table_row(&["PRODUCT", "NAME", "QTY", "PRICE"], &widths);
    for line in cart.lines() {
        let name = match line.variant.label() {
            Some(label) => format!("{} ({})", line.name, label),
            None => line.name.clone(),
        };
        let price = line.unit_price.display();
        let quantity = line.quantity.to_string();
        ctx.output.table_row(
            &[line.product_id.as_str(), name.as_str(), quantity.as_str(), price.as_str()],
            &widths,
        );
    }
    Ok(())
}

fn add(
    ctx: &Context,
    product_id: String,
    name: String,
    price: f64,
    quantity: i64,
    variant: Variant,
) -> Result<()> {
    if !price.is_finite() || price < 0.0 {
        bail!("Price must be zero or more, got {}", price);
    }

    let store = ctx.store()?;
    let mut cart = ctx.cart(&store)?;
    let currency = cart.policy().currency();

    let line = CartLine::new(product_id, name, Money::from_decimal(price, currency), quantity)
        .with_variant(variant);
    let label = line.name.clone();
    cart.add(line)?;

    ctx.output
        .success(&format!("Added {} ({} items in cart)", label, cart.item_count()));
    Ok(())
}

fn update(ctx: &Context, product_id: &str, quantity: i64) -> Result<()> {
    let store = ctx.store()?;
    let mut cart = ctx.cart(&store)?;

    let applied = cart.update_quantity(&ProductId::new(product_id), quantity)?;
    if applied != quantity {
        ctx.output
            .warn(&format!("Quantity must be at least 1; set to {}", applied));
    }
    ctx.output
        .success(&format!("Updated {} to quantity {}", product_id, applied));
    Ok(())
}

fn remove(ctx: &Context, product_id: &str, yes: bool) -> Result<()> {
    let store = ctx.store()?;
    let mut cart = ctx.cart(&store)?;

    let Some(prompt) = cart.prompt_removal(&ProductId::new(product_id)) else {
        ctx.output.warn(&format!("{} is not in your cart", product_id));
        return Ok(());
    };

    let decision = if yes
        || Confirm::new()
            .with_prompt(prompt.message())
            .default(false)
            .interact()?
    {
        RemovalDecision::Confirm
    } else {
        RemovalDecision::Cancel
    };

    if cart.resolve_removal(prompt, decision)? {
        ctx.output.success(&format!("Removed {}", product_id));
    } else {
        ctx.output.info("Kept in cart");
    }
    Ok(())
}

fn clear(ctx: &Context, yes: bool) -> Result<()> {
    let store = ctx.store()?;
    let mut cart = ctx.cart(&store)?;

    if cart.is_empty() {
        ctx.output.info("Your cart is already empty");
        return Ok(());
    }

    if !yes
        && !Confirm::new()
            .with_prompt(format!("Remove all {} items from your cart?", cart.item_count()))
            .default(false)
            .interact()?
    {
        ctx.output.info("Cancelled");
        return Ok(());
    }

    cart.clear()?;
    ctx.output.success("Cart cleared");
    Ok(())
}

/// `(label, amount)` rows for a price summary.
pub fn summary_rows(summary: &OrderSummary) -> Vec<(&'static str, String)> {
    let mut rows = vec![
        ("Subtotal", summary.subtotal.display()),
        (
            "Shipping",
            if summary.has_free_shipping() {
                "Free".to_string()
            } else {
                summary.shipping.display()
            },
        ),
        ("Tax", summary.tax.display()),
    ];
    if summary.has_discount() {
        rows.push(("Discount", format!("-{}", summary.discount.display())));
    }
    rows.push(("Total", summary.total.display()));
    rows
}

pub fn print_summary(ctx: &Context, summary: &OrderSummary) {
    for (label, amount) in summary_rows(summary) {
        ctx.output.kv(label, &amount);
    }
}
