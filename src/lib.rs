//! # Puxbay - Rust client for the Puxbay point-of-sale API
//!
//! An async, typed client for the Puxbay retail REST API built on `reqwest`.
//! One [`Client`] holds a pooled connection set and exposes an accessor per
//! resource (products, orders, customers, inventory, reports, ...). Every call
//! goes through the same pipeline: API-key header, JSON (de)serialization,
//! bounded exponential-backoff retries on `429` and `5xx`, and mapping of
//! error statuses to typed [`Error`]s.
//!
//! ## Quick Start
//!
//! ```no_run
//! use puxbay::{models::Product, Client, Config, ListParams};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), puxbay::Error> {
//!     let config = Config::builder("pb_live_abc123")
//!         .timeout(Duration::from_secs(15))
//!         .max_retries(3)
//!         .build()?;
//!     let client = Client::new(config)?;
//!
//!     // List the first page of products
//!     let page = client.products().list(&ListParams::page(1).page_size(20)).await?;
//!     println!("{} products in total", page.count);
//!
//!     // Create one, then adjust its stock
//!     let widget = client
//!         .products()
//!         .create(&Product {
//!             name: "Widget".into(),
//!             sku: Some("W-001".into()),
//!             price: Some(9.99),
//!             ..Default::default()
//!         })
//!         .await?;
//!
//!     let id = widget.id.unwrap_or_default();
//!     let adjusted = client.products().adjust_stock(&id, 25, "Initial delivery").await?;
//!     println!("Stock now {}", adjusted.new_quantity);
//!
//!     client.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Every failed HTTP exchange carries a status code, the message from the
//! body's `detail` or `message` field and the raw body:
//!
//! ```no_run
//! use puxbay::{Client, Error, ErrorKind};
//!
//! # async fn example(client: Client) {
//! match client.products().get("missing").await {
//!     Ok(product) => println!("Found {}", product.name),
//!     Err(e) if e.kind() == Some(ErrorKind::NotFound) => {
//!         println!("No such product: {}", e.message());
//!     }
//!     Err(Error::RateLimited { rate_limit_info, .. }) => {
//!         println!("Still throttled, retry after {:?}", rate_limit_info.retry_after);
//!     }
//!     Err(Error::DeserializationFailed { raw_response, serde_error, .. }) => {
//!         eprintln!("Unexpected body {raw_response}: {serde_error}");
//!     }
//!     Err(e) => eprintln!("Request failed ({}): {e}", e.status_code()),
//! }
//! # }
//! ```
//!
//! ## Retries
//!
//! Responses with status `429` or `>= 500`, and network failures, are retried
//! up to [`Config::max_retries`] times, sleeping `backoff_base * 2^n` before
//! retry `n + 1` (1 s, 2 s, 4 s with the defaults). When the retries run
//! out the last outcome is returned. Retries apply to every method, so a
//! `POST` may reach the server more than once.
//!
//! ## Logging
//!
//! The client logs through `tracing`: `debug` per attempt, `info` per final
//! response, `warn` on retries and server errors, `error` on client errors
//! and undecodable bodies. Install any subscriber to see them.

pub mod config;
mod client;
mod error;
pub mod metadata;
pub mod models;
pub mod rate_limit;
mod resources;
mod response;
pub mod retry;
pub mod transport;

pub use client::Client;
pub use config::{Config, ConfigBuilder};
pub use error::{Error, ErrorKind, Result, API_KEY_PREFIX};
pub use models::Paginated;
pub use rate_limit::RateLimitInfo;
pub use resources::{
    Create, DateRange, Delete, Entity, Inventory, ListParams, Reports, Resource, Update,
};
pub use response::Response;
pub use retry::RetryPolicy;
