//! A short tour of the Puxbay client.
//!
//! Run with: `PUXBAY_API_KEY=pb_... cargo run --example quickstart`

use puxbay::models::{Customer, OpenCashDrawer};
use puxbay::{Client, Config, DateRange, ListParams};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "puxbay=debug".into()),
        )
        .init();

    let api_key = std::env::var("PUXBAY_API_KEY")?;
    let mut builder = Config::builder(api_key).timeout(Duration::from_secs(15));
    if let Ok(base_url) = std::env::var("PUXBAY_BASE_URL") {
        builder = builder.base_url(base_url);
    }
    let client = Client::new(builder.build()?)?;

    println!("=== Products ===");
    let page = client
        .products()
        .list(&ListParams::page(1).page_size(10))
        .await?;
    println!("{} products, showing {}", page.count, page.results.len());
    for product in &page.results {
        println!(
            "  {:<30} {:>8.2} ({} in stock)",
            product.name,
            product.price.unwrap_or_default(),
            product.stock_quantity.unwrap_or_default()
        );
    }

    println!("\n=== Customers ===");
    let customer = client
        .customers()
        .create(&Customer {
            name: "Walk-in Demo".into(),
            customer_type: Some("retail".into()),
            ..Default::default()
        })
        .await?;
    let customer_id = customer.id.clone().unwrap_or_default();
    let points = client
        .customers()
        .adjust_loyalty_points(&customer_id, 10, "Quickstart bonus")
        .await?;
    println!("Created {} with {} points", customer.name, points.new_balance);
    client.customers().delete(&customer_id).await?;

    println!("\n=== Cash drawer ===");
    let branches = client.branches().list(&ListParams::new()).await?;
    if let Some(branch_id) = branches.results.first().and_then(|b| b.id.clone()) {
        let drawer = client
            .cash_drawers()
            .open(&OpenCashDrawer::new(branch_id, 100.0).notes("quickstart"))
            .await?;
        if let Some(id) = drawer.id {
            let closed = client.cash_drawers().close(&id, 100.0).await?;
            println!("Drawer closed, difference {:?}", closed.difference);
        }
    }

    println!("\n=== Reports ===");
    let summary = client
        .reports()
        .financial_summary(&DateRange::new("2024-01-01", "2024-12-31"))
        .await?;
    println!(
        "{} orders, revenue {:.2}, average {:.2}",
        summary.total_orders, summary.total_revenue, summary.avg_order_value
    );
    for row in client.reports().low_stock().await? {
        println!("  low: {} ({} <= {})", row.name, row.stock_quantity, row.low_stock_threshold);
    }

    client.shutdown();
    Ok(())
}
