//! Example demonstrating error handling against the Puxbay API.
//!
//! This example shows how to:
//! - Branch on error kinds
//! - Read the server's message and the raw body
//! - Inspect rate-limit headers after retries run out
//! - Tell local errors (bad key, bad body) from HTTP ones
//!
//! Run with: `PUXBAY_API_KEY=pb_... cargo run --example error_handling`

use puxbay::models::Product;
use puxbay::{Client, Config, Error, ErrorKind};
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "puxbay=info".into()),
        )
        .init();

    println!("=== Example 1: Rejected API key ===");
    // Keys are checked locally before any connection is made
    match Config::builder("sk_live_wrong_vendor").build() {
        Ok(_) => println!("Unexpected success"),
        Err(e @ Error::InvalidApiKey) => println!("Rejected locally: {e}"),
        Err(e) => println!("Other error: {e}"),
    }
    println!();

    let api_key = std::env::var("PUXBAY_API_KEY").unwrap_or_else(|_| "pb_demo_key".to_string());
    let config = Config::builder(api_key)
        .max_retries(2)
        .backoff_base(Duration::from_millis(500))
        .build()?;
    let client = Client::new(config)?;

    println!("=== Example 2: Classifying HTTP errors ===");
    match client.products().get("does-not-exist").await {
        Ok(product) => println!("Found: {}", product.name),
        Err(e) => match e.kind() {
            Some(ErrorKind::NotFound) => println!("Not found: {}", e.message()),
            Some(ErrorKind::Authentication) => {
                println!("Key rejected ({}): {}", e.status_code(), e.message())
            }
            Some(ErrorKind::Validation) => println!("Bad request: {}", e.message()),
            Some(kind) => println!("{kind:?} (status {}): {}", e.status_code(), e.message()),
            None => println!("Local error: {e}"),
        },
    }
    println!();

    println!("=== Example 3: Raw responses ===");
    match client.get::<Product>("reports/low-stock/").await {
        // The report is a list, not a product, so this fails to decode
        Ok(response) => println!("Unexpected success: {:?}", response.data),
        Err(Error::DeserializationFailed {
            raw_response,
            serde_error,
            status,
        }) => {
            println!("Deserialization failed with status {status}");
            println!("  Serde error: {serde_error}");
            println!(
                "  Raw response (first 200 chars): {}",
                raw_response.chars().take(200).collect::<String>()
            );
        }
        Err(e) => println!("Request failed before decoding: {e}"),
    }
    println!();

    println!("=== Example 4: Rate limits and retries ===");
    match client.orders().get("any").await {
        Err(Error::RateLimited {
            rate_limit_info, ..
        }) => {
            println!("Still rate limited after all retries");
            println!("  Retry-After: {:?}", rate_limit_info.retry_after);
            println!("  Remaining: {:?}", rate_limit_info.remaining);
            if let Some(wait) = rate_limit_info.suggested_wait(Duration::from_secs(60)) {
                println!("  Waiting {wait:?} before trying again");
            }
        }
        Err(e) if e.is_retryable() => println!("Transient failure, safe to try later: {e}"),
        Err(e) => println!("Permanent failure: {e}"),
        Ok(order) => println!("Order {:?}", order.order_number),
    }

    client.shutdown();
    Ok(())
}
