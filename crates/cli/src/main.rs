//! Yotech Quote CLI - Browse the catalog, build a quote, export it.
//!
//! # Usage
//!
//! ```bash
//! # List categories and their slugs
//! quote-cli catalog categories
//!
//! # Show every variant of a category
//! quote-cli catalog rows Tu-bep
//!
//! # Put 2 units of a variant in the cart (replaces any existing quantity)
//! quote-cli cart add Tu-bep TB01 "MDF chống ẩm" Melamine 2
//!
//! # Add 1 more unit on top of what is already there
//! quote-cli cart increment Tu-bep TB01 "MDF chống ẩm" Melamine 1
//!
//! # Set category page quantities in one go
//! quote-cli category apply Tu-bep "TB01-MDF chống ẩm-Melamine=3"
//!
//! # Export the (optionally filtered) quote
//! quote-cli export csv --category "Tủ bếp"
//! ```
//!
//! # Commands
//!
//! - `catalog` - Inspect the catalog
//! - `cart` - Show and edit the quote cart
//! - `category` - Category page quantities
//! - `export` - Write the quote to a file
//!
//! Configuration comes from the `QUOTE_*` environment variables (see
//! `yotech_quote::config`). Set `QUOTE_LOG_JSON` for JSON logs.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use yotech_quote::QuoteContext;
use yotech_quote::config::get_optional_env;
use yotech_quote::view::{QuoteFilter, QuoteSort, SortColumn, SortDirection};

mod commands;

#[derive(Parser)]
#[command(name = "quote-cli")]
#[command(author, version, about = "Yotech Quote CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Show and edit the quote cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Category page quantities
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Export the quote
    Export {
        #[command(subcommand)]
        format: ExportFormat,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List categories with their slugs
    Categories,
    /// List every product / core / finish row of a category
    Rows {
        /// Category slug
        slug: String,

        /// Only rows matching this text (tones optional)
        #[arg(short, long)]
        search: Option<String>,
    },
}

/// A catalog variant on the command line.
#[derive(Args)]
struct VariantArgs {
    /// Category slug
    slug: String,
    /// Product id
    product: String,
    /// Core material name
    core: String,
    /// Finish name
    finish: String,
    /// Quantity
    quantity: u32,
}

#[derive(Subcommand)]
enum CartAction {
    /// Print the cart
    Show {
        #[command(flatten)]
        view: ViewArgs,
    },
    /// Put a variant in the cart with exactly this quantity
    Add {
        #[command(flatten)]
        variant: VariantArgs,
    },
    /// Add this quantity on top of what the cart already holds
    Increment {
        #[command(flatten)]
        variant: VariantArgs,
    },
    /// Set the quantity of a cart line (0 or less removes it)
    Set {
        /// Line item id
        id: String,
        /// New quantity
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Remove a cart line
    Remove {
        /// Line item id
        id: String,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum CategoryAction {
    /// Print the cached quantities of a category
    Show {
        /// Category slug
        slug: String,
    },
    /// Set quantities for variants of a category (`<id>=<quantity>`)
    Apply {
        /// Category slug
        slug: String,
        /// Quantities, e.g. `TB01-MDF-Melamine=2`; 0 removes
        #[arg(required = true)]
        quantities: Vec<String>,
    },
    /// Remove every variant of a category from the cart
    Clear {
        /// Category slug
        slug: String,
    },
}

#[derive(Subcommand)]
enum ExportFormat {
    /// Spreadsheet-friendly CSV
    Csv {
        #[command(flatten)]
        view: ViewArgs,
    },
}

/// Filters and ordering shared by `cart show` and `export`.
#[derive(Args)]
struct ViewArgs {
    /// Only this category ("Khác" for items without one)
    #[arg(long)]
    category: Option<String>,
    /// Only this subcategory
    #[arg(long)]
    subcategory: Option<String>,
    /// Only this core material
    #[arg(long)]
    core: Option<String>,
    /// Only this finish
    #[arg(long)]
    finish: Option<String>,
    /// Free text search (tones optional)
    #[arg(short, long)]
    search: Option<String>,
    /// Sort column (name, category, subcategory, core, finish, unit, price, quantity, total)
    #[arg(long)]
    sort: Option<SortColumn>,
    /// Sort descending
    #[arg(long, requires = "sort")]
    desc: bool,
}

impl ViewArgs {
    fn filter(&self) -> QuoteFilter {
        QuoteFilter {
            category: self.category.clone(),
            subcategory: self.subcategory.clone(),
            core: self.core.clone(),
            finish: self.finish.clone(),
            search: self.search.clone(),
        }
    }

    fn sort(&self) -> Option<QuoteSort> {
        self.sort.map(|column| QuoteSort {
            column,
            direction: if self.desc {
                SortDirection::Descending
            } else {
                SortDirection::Ascending
            },
        })
    }
}

fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "yotech_quote=info,quote_cli=info".into());

    // JSON for log shipping, text for humans
    let json = get_optional_env("QUOTE_LOG_JSON").is_some();
    let json_layer = json.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = tokio::task::spawn_blocking(QuoteContext::from_env).await??;

    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::Categories => commands::catalog::categories(&ctx),
            CatalogAction::Rows { slug, search } => {
                commands::catalog::rows(&ctx, &slug, search.as_deref())?;
            }
        },
        Commands::Cart { action } => match action {
            CartAction::Show { view } => commands::cart::show(&ctx, &view.filter(), view.sort()),
            CartAction::Add { variant } => commands::cart::add(&ctx, &variant.into(), false)?,
            CartAction::Increment { variant } => {
                commands::cart::add(&ctx, &variant.into(), true)?;
            }
            CartAction::Set { id, quantity } => commands::cart::set(&ctx, &id, quantity)?,
            CartAction::Remove { id } => commands::cart::remove(&ctx, &id),
            CartAction::Clear => commands::cart::clear(&ctx),
        },
        Commands::Category { action } => match action {
            CategoryAction::Show { slug } => commands::category::show(&ctx, &slug)?,
            CategoryAction::Apply { slug, quantities } => {
                commands::category::apply(&ctx, &slug, &quantities)?;
            }
            CategoryAction::Clear { slug } => commands::category::clear(&ctx, &slug)?,
        },
        Commands::Export { format } => match format {
            ExportFormat::Csv { view } => {
                commands::export::csv(&ctx, &view.filter(), view.sort())?;
            }
        },
    }
    Ok(())
}

impl From<VariantArgs> for commands::cart::Variant {
    fn from(args: VariantArgs) -> Self {
        Self {
            slug: args.slug,
            product: args.product,
            core: args.core,
            finish: args.finish,
            quantity: args.quantity,
        }
    }
}
