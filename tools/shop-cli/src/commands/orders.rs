//! Order history commands.

use anyhow::Result;
use chrono::Utc;
use dialoguer::Confirm;
use shop_commerce::checkout::{Order, OrderDetailView, OrderHistory};
use shop_commerce::ids::OrderId;

use super::{OrdersArgs, OrdersCommand};
use crate::context::Context;
use crate::output::status_badge;

/// Run the orders command.
pub async fn run(args: OrdersArgs, ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let api = ctx.authed_api(&ctx.session(&store))?;
    let mut history = OrderHistory::new();

    match args.command.unwrap_or(OrdersCommand::List) {
        OrdersCommand::List => {
            let spinner = ctx.output.spinner("Loading orders...");
            let orders = history.list(&api).await.map(<[Order]>::to_vec);
            spinner.finish_and_clear();
            list(ctx, &orders?);
        }
        OrdersCommand::Show { id } => {
            let order = history.get(&api, &OrderId::new(id)).await?.clone();
            show(ctx, &order);
        }
        OrdersCommand::Cancel { id, yes } => {
            if !yes && !confirm(&format!("Cancel order {}?", id))? {
                ctx.output.info("Order not cancelled");
                return Ok(());
            }
            let order = history.cancel(&api, &OrderId::new(id)).await?.clone();
            ctx.output
                .success(&format!("Order #{} cancelled", order.order_number));
            show(ctx, &order);
        }
        OrdersCommand::Return { id, yes } => {
            if !yes && !confirm(&format!("Request a return for order {}?", id))? {
                ctx.output.info("No return requested");
                return Ok(());
            }
            let order = history
                .request_return(&api, &OrderId::new(id), Utc::now())
                .await?
                .clone();
            ctx.output
                .success(&format!("Return requested for order #{}", order.order_number));
            show(ctx, &order);
        }
        OrdersCommand::Stats => {
            let stats = history.stats(&api).await?;
            if ctx.output.is_json() {
                ctx.output.json(&stats);
                return Ok(());
            }

            ctx.output.header("Order Statistics");
            ctx.output.kv("Total orders", &stats.total_orders.to_string());
            ctx.output.kv("Pending", &stats.pending_orders.to_string());
            ctx.output.kv("Processing", &stats.processing_orders.to_string());
            ctx.output.kv("Shipped", &stats.shipped_orders.to_string());
            ctx.output.kv("Delivered", &stats.delivered_orders.to_string());
            ctx.output.kv("Cancelled", &stats.cancelled_orders.to_string());
            ctx.output
                .kv("Total spent", &format!("{}{:.2}", api.currency().symbol(), stats.total_spent));
        }
    }

    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}

fn list(ctx: &Context, orders: &[Order]) {
    if ctx.output.is_json() {
        ctx.output.json(&orders);
        return;
    }

    ctx.output.header(&format!("Orders ({})", orders.len()));
    if orders.is_empty() {
        ctx.output.info("No orders yet");
        return;
    }

    let widths = [8, 14, 12, 6, 12];
    ctx.output
        .table_row(&["ID", "NUMBER", "DATE", "ITEMS", "TOTAL"], &widths);
    for order in orders {
        let date = order
            .created_at
            .map(|at| at.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        let items = order.item_count().to_string();
        let total = order.summary.total.display();
        ctx.output.table_row(
            &[
                order.id.as_str(),
                order.order_number.as_str(),
                date.as_str(),
                items.as_str(),
                total.as_str(),
            ],
            &widths,
        );
        ctx.output.kv("status", &status_badge(order.status));
    }
}

fn show(ctx: &Context, order: &Order) {
    if ctx.output.is_json() {
        ctx.output.json(order);
        return;
    }
    ctx.output.text(&OrderDetailView::new(order).to_string());
}
