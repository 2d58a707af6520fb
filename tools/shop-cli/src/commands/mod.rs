//! CLI command implementations.

pub mod address;
pub mod auth;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod orders;
pub mod wishlist;

use clap::{Args, Subcommand};

/// Arguments for the cart command.
#[derive(Args)]
pub struct CartArgs {
    #[command(subcommand)]
    pub command: Option<CartCommand>,
}

#[derive(Subcommand)]
pub enum CartCommand {
    /// List cart lines.
    List,
    /// Add a product, merging with an existing line for the same product.
    Add {
        /// Product ID.
        product_id: String,

        /// Product name.
        #[arg(short, long)]
        name: String,

        /// Unit price in major units (e.g. 19.99).
        #[arg(short, long)]
        price: f64,

        /// Quantity to add.
        #[arg(short, long, default_value = "1")]
        quantity: i64,

        /// Color variant.
        #[arg(long)]
        color: Option<String>,

        /// Size variant.
        #[arg(long)]
        size: Option<String>,

        /// Carat variant.
        #[arg(long)]
        carat: Option<String>,
    },
    /// Set a line's quantity.
    Update {
        /// Product ID.
        product_id: String,
        /// New quantity; values below 1 become 1.
        quantity: i64,
    },
    /// Remove a line.
    Remove {
        /// Product ID.
        product_id: String,
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Empty the cart.
    Clear {
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
}

/// Arguments for the summary command.
#[derive(Args)]
pub struct SummaryArgs {
    /// Coupon code to apply.
    #[arg(long)]
    pub coupon: Option<String>,
}

/// Arguments for the address command.
#[derive(Args)]
pub struct AddressArgs {
    #[command(subcommand)]
    pub command: Option<AddressCommand>,
}

#[derive(Subcommand)]
pub enum AddressCommand {
    /// List saved addresses.
    List,
    /// Save a new address.
    Add(AddressFields),
}

/// Fields for a new address. Missing fields are prompted for.
#[derive(Args)]
pub struct AddressFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub street: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub zip: Option<String>,
    #[arg(long)]
    pub country: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,

    /// home, work or other.
    #[arg(long, default_value = "home")]
    pub kind: String,

    /// Make this the default address.
    #[arg(long)]
    pub default: bool,
}

/// Arguments for the checkout command.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Coupon code to apply.
    #[arg(long)]
    pub coupon: Option<String>,

    /// Address ID to ship to (default: the default address).
    #[arg(short, long)]
    pub address: Option<String>,

    /// Special instructions for the order.
    #[arg(short, long)]
    pub note: Option<String>,

    /// Payment method (cod, card, upi).
    #[arg(short, long, default_value = "cod")]
    pub payment: String,

    /// Skip confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the orders command.
#[derive(Args)]
pub struct OrdersArgs {
    #[command(subcommand)]
    pub command: Option<OrdersCommand>,
}

#[derive(Subcommand)]
pub enum OrdersCommand {
    /// List orders.
    List,
    /// Show one order.
    Show {
        /// Order ID.
        id: String,
    },
    /// Cancel an order that has not shipped.
    Cancel {
        /// Order ID.
        id: String,
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Request a return for a recently delivered order.
    Return {
        /// Order ID.
        id: String,
        /// Skip confirmation.
        #[arg(short, long)]
        yes: bool,
    },
    /// Show order counts and total spent.
    Stats,
}

/// Arguments for the login command.
#[derive(Args)]
pub struct LoginArgs {
    /// Sign in with a one-time code sent to this phone number.
    #[arg(long, conflicts_with_all = ["google", "token"])]
    pub phone: Option<String>,

    /// Sign in with a Google ID token.
    #[arg(long, conflicts_with = "token")]
    pub google: Option<String>,

    /// Store an existing bearer token.
    #[arg(long, requires = "user_id")]
    pub token: Option<String>,

    /// User ID for --token.
    #[arg(long)]
    pub user_id: Option<String>,
}

/// Arguments for the profile command.
#[derive(Args)]
pub struct ProfileArgs {
    /// New display name.
    #[arg(long)]
    pub name: Option<String>,
    /// New email address.
    #[arg(long)]
    pub email: Option<String>,
    /// New phone number.
    #[arg(long)]
    pub phone: Option<String>,
}

/// Arguments for the wishlist command.
#[derive(Args)]
pub struct WishlistArgs {
    #[command(subcommand)]
    pub command: Option<WishlistCommand>,
}

#[derive(Subcommand)]
pub enum WishlistCommand {
    /// List saved products.
    List,
    /// Save a product.
    Add {
        /// Product ID.
        product_id: String,
    },
    /// Remove a saved product.
    Remove {
        /// Product ID.
        product_id: String,
    },
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration.
    Show,
    /// Initialize a new config file.
    Init {
        /// Force overwrite existing config.
        #[arg(short, long)]
        force: bool,
    },
    /// Validate the configuration.
    Validate,
}
