use std::path::PathBuf;

use anyhow::Context as _;
use clap::Parser;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::{info, Instrument};

use storefront::app_system::{setup_tracing, Storefront};
use storefront::config::Settings;
use storefront::domain::{NewOrder, NewProduct, OrderLine};

#[derive(Parser)]
#[command(author, version, about = "Storefront query gateway")]
struct Cli {
    /// Path to the TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON request graph to execute instead of the built-in demo query.
    #[arg(short, long)]
    query: Option<PathBuf>,

    /// Start with empty stores.
    #[arg(long)]
    no_seed: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup tracing once for the entire application
    setup_tracing();
    let cli = Cli::parse();

    let settings = Settings::load(cli.config.as_deref()).context("failed to load settings")?;
    info!(?settings, "Starting storefront");

    let system = Storefront::start(&settings).await;

    let account_id = if cli.no_seed {
        None
    } else {
        let span = tracing::info_span!("demo_seed");
        Some(seed_demo(&system).instrument(span).await?)
    };

    let request = match &cli.query {
        Some(path) => {
            let text = std::fs::read_to_string(path).with_context(|| format!("failed to read {path:?}"))?;
            serde_json::from_str(&text).with_context(|| format!("{path:?} is not valid JSON"))?
        }
        None => demo_query(account_id.as_deref().unwrap_or_default()),
    };

    let span = tracing::info_span!("gateway_request");
    let response = system.gateway.execute_json(request).instrument(span).await;
    println!("{}", serde_json::to_string_pretty(&response)?);

    system.shutdown().await.map_err(anyhow::Error::msg)?;
    info!("Application completed successfully");
    Ok(())
}

/// Creates one account, two products and an order. Returns the account ID.
async fn seed_demo(system: &Storefront) -> anyhow::Result<String> {
    let account = system
        .accounts
        .create_account("Alice".to_string())
        .await
        .context("failed to create demo account")?;

    let mug = system
        .catalog
        .create_product(NewProduct::new("Blue Mug", "ceramic mug, dishwasher safe", Decimal::new(999, 2)))
        .await
        .context("failed to create demo product")?;
    let tea = system
        .catalog
        .create_product(NewProduct::new("Green Tea", "loose leaf sencha", Decimal::new(450, 2)))
        .await
        .context("failed to create demo product")?;

    let order = NewOrder::new(account.id.clone(), vec![OrderLine::new(mug.id, 2), OrderLine::new(tea.id, 1)]);
    let order = system.orders.create_order(order).await.context("failed to create demo order")?;
    info!(account_id = %account.id, order_id = %order.id, total = %order.total_price().unwrap_or_default(), "Demo data seeded");

    Ok(account.id)
}

fn demo_query(account_id: &str) -> Value {
    json!({
        "operation": "query",
        "fields": [
            {
                "name": "products",
                "args": { "query": "mug" },
                "fields": [{ "name": "id" }, { "name": "name" }, { "name": "price" }]
            },
            {
                "name": "account",
                "args": { "id": account_id },
                "fields": [
                    { "name": "name" },
                    {
                        "name": "orders",
                        "fields": [
                            { "name": "id" },
                            { "name": "createdAt" },
                            { "name": "totalPrice" },
                            {
                                "name": "products",
                                "fields": [
                                    { "name": "name" },
                                    { "name": "quantity" },
                                    { "name": "price" },
                                    { "name": "product", "alias": "current", "fields": [{ "name": "price" }] }
                                ]
                            }
                        ]
                    }
                ]
            }
        ]
    })
}
