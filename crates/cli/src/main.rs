//! Duka CLI - shop a Duka store from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! duka products --featured
//! duka categories
//!
//! # Manage the cart (persisted in DUKA_DATA_DIR)
//! duka cart add prod_123
//! duka cart inc prod_123
//! duka cart show
//!
//! # Start payment, then confirm once the payment provider reports success
//! duka checkout start --name "Achieng Otieno" --phone 0712345678 \
//!     --county Nairobi --address Westlands --id-number 12345678 \
//!     --email achieng@example.com
//! duka checkout confirm ref_abc123
//!
//! # Order history
//! duka orders list --email achieng@example.com
//! duka orders show ord_123
//! ```
//!
//! # Commands
//!
//! - `cart` - Show and edit the local cart
//! - `products`, `categories` - Browse the catalog
//! - `checkout` - Start and confirm payment
//! - `orders` - Customer order history

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use duka_storefront::config::StorefrontConfig;
use duka_storefront::error::{AppError, Result};
use duka_storefront::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "duka")]
#[command(author, version, about = "Duka storefront client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show and edit the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// List products
    Products {
        /// Only products in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Only featured products
        #[arg(short, long)]
        featured: bool,
    },
    /// List categories
    Categories,
    /// Pay for the cart
    Checkout {
        #[command(subcommand)]
        action: CheckoutAction,
    },
    /// Look up orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart contents and totals
    Show,
    /// Add one unit of a product
    Add {
        /// Product id
        product_id: String,
    },
    /// Remove a product line entirely
    Remove {
        /// Product id
        product_id: String,
    },
    /// Increase a line's quantity by one
    Inc {
        /// Product id
        product_id: String,
    },
    /// Decrease a line's quantity by one (removes it at one)
    Dec {
        /// Product id
        product_id: String,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum CheckoutAction {
    /// Submit the cart and get a payment reference
    Start {
        /// Full name
        #[arg(short, long)]
        name: String,

        /// Phone number
        #[arg(short, long)]
        phone: String,

        /// County
        #[arg(long)]
        county: String,

        /// Delivery address
        #[arg(short, long)]
        address: String,

        /// National ID number
        #[arg(long)]
        id_number: String,

        /// Email for the receipt
        #[arg(short, long, env = "DUKA_EMAIL")]
        email: String,
    },
    /// Record a successful payment and empty the cart
    Confirm {
        /// Payment reference returned by `checkout start`
        reference: String,
    },
}

#[derive(Subcommand)]
enum OrdersAction {
    /// List orders placed with an email address
    List {
        /// Customer email
        #[arg(short, long, env = "DUKA_EMAIL")]
        email: String,
    },
    /// Show one order with its tracking history
    Show {
        /// Order id
        order_id: String,
    },
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[allow(clippy::print_stderr)]
#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Logs go to stderr so command output stays pipeable.
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "duka_storefront=info,duka_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match AppState::new(config) {
        Ok(state) => run(cli, &state).await,
        Err(e) => Err(AppError::from(e)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            eprintln!("{}", e.user_message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, state: &AppState) -> Result<()> {
    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(state),
            CartAction::Add { product_id } => commands::cart::add(state, &product_id).await?,
            CartAction::Remove { product_id } => commands::cart::remove(state, &product_id),
            CartAction::Inc { product_id } => commands::cart::increase(state, &product_id),
            CartAction::Dec { product_id } => commands::cart::decrease(state, &product_id),
            CartAction::Clear => commands::cart::clear(state),
        },
        Commands::Products { category, featured } => {
            commands::catalog::products(state, category, featured).await?;
        }
        Commands::Categories => commands::catalog::categories(state).await?,
        Commands::Checkout { action } => match action {
            CheckoutAction::Start {
                name,
                phone,
                county,
                address,
                id_number,
                email,
            } => {
                let form = duka_storefront::api::CheckoutForm {
                    customer_name: name,
                    phone,
                    county,
                    address,
                    id_number,
                    email,
                };
                commands::checkout::start(state, &form).await?;
            }
            CheckoutAction::Confirm { reference } => commands::checkout::confirm(state, &reference),
        },
        Commands::Orders { action } => match action {
            OrdersAction::List { email } => commands::orders::list(state, &email).await?,
            OrdersAction::Show { order_id } => commands::orders::show(state, &order_id).await?,
        },
    }
    Ok(())
}
