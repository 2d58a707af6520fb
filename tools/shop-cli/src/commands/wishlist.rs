//! Wishlist commands.

use anyhow::Result;
use shop_commerce::ids::ProductId;

use super::{WishlistArgs, WishlistCommand};
use crate::context::Context;

/// Run the wishlist command.
pub async fn run(args: WishlistArgs, ctx: &Context) -> Result<()> {
    let store = ctx.store()?;
    let api = ctx.authed_api(&ctx.session(&store))?;

    match args.command.unwrap_or(WishlistCommand::List) {
        WishlistCommand::List => {
            let items = api.wishlist().await?;
            if ctx.output.is_json() {
                ctx.output.json(&items);
                return Ok(());
            }

            ctx.output.header(&format!("Wishlist ({})", items.len()));
            for item in &items {
                let name = item.name.as_deref().unwrap_or("(unnamed)");
                match item.price {
                    Some(price) => ctx
                        .output
                        .list_item(&format!("[{}] {} - {:.2}", item.product_id, name, price)),
                    None => ctx
                        .output
                        .list_item(&format!("[{}] {}", item.product_id, name)),
                }
            }
        }
        WishlistCommand::Add { product_id } => {
            api.add_to_wishlist(&ProductId::new(product_id.as_str())).await?;
            ctx.output.success(&format!("Saved {} to your wishlist", product_id));
        }
        WishlistCommand::Remove { product_id } => {
            api.remove_from_wishlist(&ProductId::new(product_id.as_str()))
                .await?;
            ctx.output
                .success(&format!("Removed {} from your wishlist", product_id));
        }
    }

    Ok(())
}
