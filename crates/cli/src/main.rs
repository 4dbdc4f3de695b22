mod prompt;
mod render;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use storefront_core::{ItemId, Price};
use storefront_infra::{
    CatalogSource, FileCatalogSource, HttpCatalogSource, JsonFileStore, Outcome, Storefront,
    StorefrontConfig,
};
use storefront_inventory::CatalogQuery;
use storefront_observability::LogFormat;

/// Storefront demo: browse the catalog, fill a cart, check out.
#[derive(Parser, Debug)]
#[command(name = "storefront")]
#[command(about = "Catalog, cart and checkout with persisted stock", long_about = None)]
struct Cli {
    /// Directory holding the persisted catalog and cart [env: STOREFRONT_DATA_DIR]
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Remote catalog fetched on first run [env: STOREFRONT_CATALOG_URL]
    #[arg(long, global = true)]
    catalog_url: Option<String>,

    /// Read the first-run catalog from a local file instead of the remote URL
    #[arg(long, global = true, conflicts_with = "catalog_url")]
    catalog_file: Option<PathBuf>,

    /// Emit JSON logs on stderr [env: STOREFRONT_LOG_JSON]
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List products with their stock
    Catalog {
        /// Only products whose name contains this text (case-insensitive)
        #[arg(long)]
        name: Option<String>,
        /// Only products priced at or below this amount
        #[arg(long)]
        max_price: Option<f64>,
    },
    /// Show the cart and its total
    Cart,
    /// Put one unit of a product in the cart
    Add { id: ItemId },
    /// Take one unit of a product out of the cart
    Remove { id: ItemId },
    /// Return every unit in the cart to stock
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
    /// Buy everything in the cart
    Checkout {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = StorefrontConfig::from_env();
    if let Some(dir) = cli.data_dir.clone() {
        config.data_dir = dir;
    }
    if let Some(url) = cli.catalog_url.clone() {
        config.catalog_url = url;
    }
    config.log_json |= cli.log_json;

    storefront_observability::init(LogFormat::from_json_flag(config.log_json));
    tracing::debug!(?config, "configuration loaded");

    let source: Box<dyn CatalogSource> = match &cli.catalog_file {
        Some(path) => Box::new(FileCatalogSource::new(path)),
        None => Box::new(HttpCatalogSource::new(config.catalog_url.clone())),
    };
    let store = JsonFileStore::new(&config.data_dir);

    let mut shop = Storefront::open(store, source.as_ref())
        .await
        .context("Could not load the products. Please try again later")?;

    run(&mut shop, cli.command)
}

fn run(shop: &mut Storefront<JsonFileStore>, command: Command) -> Result<()> {
    match command {
        Command::Catalog { name, max_price } => {
            let mut query = CatalogQuery::new();
            if let Some(name) = name {
                query = query.name_contains(name);
            }
            if let Some(max) = max_price {
                query = query.max_price(Price::new(max).context("invalid --max-price")?);
            }
            print!("{}", render::catalog_table(shop.search(&query)));
        }
        Command::Cart => {
            print!("{}", render::cart_table(shop.cart()));
        }
        Command::Add { id } => {
            let outcome = shop.add(&id)?;
            report(&outcome, "Product added");
            print!("{}", render::cart_table(shop.cart()));
        }
        Command::Remove { id } => {
            let outcome = shop.remove(&id)?;
            report(&outcome, "Product removed");
            print!("{}", render::cart_table(shop.cart()));
        }
        Command::Clear { yes } => {
            if shop.cart().is_empty() {
                println!("The cart is already empty.");
                return Ok(());
            }
            let confirmed = yes
                || prompt::confirm("All products will be removed from the cart. Are you sure?")?;
            report(&shop.clear(confirmed)?, "The cart has been cleared");
        }
        Command::Checkout { yes } => {
            if shop.cart().is_empty() {
                println!("There are no products in the cart.");
                return Ok(());
            }
            let question = format!(
                "Your purchase total is ${}. Confirm the purchase?",
                shop.total_price()
            );
            if !(yes || prompt::confirm(&question)?) {
                println!("Keep shopping!");
                return Ok(());
            }
            report(&shop.checkout()?, "Purchase complete");
        }
    }
    Ok(())
}

fn report(outcome: &Outcome, applied: &str) {
    match outcome {
        Outcome::Applied => println!("{applied}."),
        Outcome::CheckedOut(receipt) => print!("{}", render::receipt(receipt)),
        Outcome::Declined(reason) => println!("{}", render::declined(reason)),
    }
}
