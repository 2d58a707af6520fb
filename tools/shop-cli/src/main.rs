//! Shop CLI - Command line storefront client.
//!
//! Commands:
//! - `shop cart` - List, add, update and remove cart lines
//! - `shop summary` - Price the cart, optionally with a coupon
//! - `shop address` - List and add shipping addresses
//! - `shop checkout` - Place an order from the cart
//! - `shop orders` - Order history, cancellation and returns
//! - `shop login` / `shop logout` / `shop profile` - Account
//! - `shop wishlist` - Saved products
//! - `shop config` - Manage configuration

mod commands;
mod config;
mod context;
mod logging;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    AddressArgs, CartArgs, CheckoutArgs, ConfigArgs, LoginArgs, OrdersArgs, ProfileArgs,
    SummaryArgs, WishlistArgs,
};

/// Shop CLI - Browse your cart, check out and track orders
#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use JSON output format
    #[arg(long, global = true)]
    json: bool,

    /// Config file path
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the shopping cart
    Cart(CartArgs),

    /// Show the cart's price summary
    Summary(SummaryArgs),

    /// Manage shipping addresses
    Address(AddressArgs),

    /// Place an order from the cart
    Checkout(CheckoutArgs),

    /// View and manage orders
    Orders(OrdersArgs),

    /// Sign in
    Login(LoginArgs),

    /// Sign out (the cart is kept)
    Logout,

    /// Show or update your profile
    Profile(ProfileArgs),

    /// Manage your wishlist
    Wishlist(WishlistArgs),

    /// Manage configuration
    Config(ConfigArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup output formatting
    let output = output::Output::new(cli.verbose, cli.json);

    // Load config
    let config_path = cli.config.as_deref();
    let ctx = match context::Context::load(config_path, output.clone()) {
        Ok(ctx) => ctx,
        Err(e) => {
            output.error(&format!("{:#}", e));
            std::process::exit(1);
        }
    };

    if let Err(e) = logging::init(&ctx.config.logging, cli.verbose) {
        ctx.output.warn(&format!("{:#}", e));
    }
    if let Some(path) = &ctx.config_path {
        ctx.output.debug(&format!("config: {}", path.display()));
    }

    // Execute command
    let result = match cli.command {
        Commands::Cart(args) => commands::cart::run(args, &ctx).await,
        Commands::Summary(args) => commands::cart::summary(args, &ctx).await,
        Commands::Address(args) => commands::address::run(args, &ctx).await,
        Commands::Checkout(args) => commands::checkout::run(args, &ctx).await,
        Commands::Orders(args) => commands::orders::run(args, &ctx).await,
        Commands::Login(args) => commands::auth::login(args, &ctx).await,
        Commands::Logout => commands::auth::logout(&ctx).await,
        Commands::Profile(args) => commands::auth::profile(args, &ctx).await,
        Commands::Wishlist(args) => commands::wishlist::run(args, &ctx).await,
        Commands::Config(args) => commands::config::run(args, &ctx).await,
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        ctx.output.error(&format!("{:#}", e));
        std::process::exit(1);
    }

    Ok(())
}
