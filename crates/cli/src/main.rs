//! Verdant CLI - storefront from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! verdant products list --category home-textiles
//! verdant products show block-print-kurta
//! verdant categories
//!
//! # Cart operations (guest or signed in; the synchronizer decides)
//! verdant cart show
//! verdant cart add 42 --quantity 2
//! verdant cart update 5 3
//! verdant cart remove 5
//! verdant cart coupon WELCOME10
//!
//! # Account
//! verdant account login -e shopper@example.com -p <password>
//! verdant account whoami
//! verdant account logout
//!
//! # Checkout review
//! verdant checkout
//! ```
//!
//! # Environment Variables
//!
//! - `VERDANT_API_BASE_URL` - Base URL of the storefront REST API (required)
//! - `VERDANT_DATA_DIR` - Override for the durable client state directory

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use verdant_client::Storefront;
use verdant_client::config::ClientConfig;

mod commands;

#[derive(Parser)]
#[command(name = "verdant")]
#[command(author, version, about = "Verdant storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse products
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// List categories
    Categories,
    /// Inspect and mutate the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the account session
    Account {
        #[command(subcommand)]
        action: AccountAction,
    },
    /// Show the checkout order summary
    Checkout,
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products, optionally filtered
    List {
        /// Category slug to filter by
        #[arg(long)]
        category: Option<String>,

        /// Free-text search term
        #[arg(long)]
        search: Option<String>,

        /// Page number (1-based)
        #[arg(long)]
        page: Option<u32>,
    },
    /// Show one product by slug
    Show {
        /// Product slug
        slug: String,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the current cart
    Show,
    /// Add a variant to the cart
    Add {
        /// Variant id
        variant_id: i64,

        /// Units to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change a line's quantity (0 removes it)
    Update {
        /// Cart line id
        item_id: i64,

        /// New quantity
        quantity: i64,
    },
    /// Remove a line
    Remove {
        /// Cart line id
        item_id: i64,
    },
    /// Apply a coupon code
    Coupon {
        /// Coupon code
        code: String,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum AccountAction {
    /// Sign in
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Create an account
    Register {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,

        /// Given name
        #[arg(long, default_value = "")]
        first_name: String,

        /// Family name
        #[arg(long, default_value = "")]
        last_name: String,
    },
    /// Sign out
    Logout,
    /// Show the signed-in profile
    Whoami,
    /// List saved addresses
    Addresses,
}

#[tokio::main]
async fn main() {
    // Initialize tracing with EnvFilter; default to warnings only so command
    // output stays readable
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "verdant_client=warn,verdant_cli=warn".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    let store = Storefront::new(config)?;

    // Resume a previous session when a stored token is still good
    store.restore_session().await;

    match cli.command {
        Commands::Products { action } => match action {
            ProductsAction::List {
                category,
                search,
                page,
            } => commands::catalog::list_products(&store, category, search, page).await?,
            ProductsAction::Show { slug } => commands::catalog::show_product(&store, &slug).await?,
        },
        Commands::Categories => commands::catalog::list_categories(&store).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&store).await,
            CartAction::Add {
                variant_id,
                quantity,
            } => commands::cart::add(&store, variant_id, quantity).await?,
            CartAction::Update { item_id, quantity } => {
                commands::cart::update(&store, item_id, quantity).await?;
            }
            CartAction::Remove { item_id } => commands::cart::remove(&store, item_id).await?,
            CartAction::Coupon { code } => commands::cart::coupon(&store, &code).await?,
            CartAction::Clear => commands::cart::clear(&store),
        },
        Commands::Account { action } => match action {
            AccountAction::Login { email, password } => {
                commands::account::login(&store, &email, &password).await?;
            }
            AccountAction::Register {
                email,
                password,
                first_name,
                last_name,
            } => {
                commands::account::register(&store, &email, &password, first_name, last_name)
                    .await?;
            }
            AccountAction::Logout => commands::account::logout(&store),
            AccountAction::Whoami => commands::account::whoami(&store),
            AccountAction::Addresses => commands::account::addresses(&store).await?,
        },
        Commands::Checkout => commands::checkout::review(&store).await?,
    }
    Ok(())
}
