//! OSRS Wiki real-time prices integration.
//!
//! This crate provides:
//! - REST client for the community prices API `/latest` endpoint
//! - Per-item response cache with a 30-second TTL
//! - Rate limiting and identification headers for respectful usage
//!
//! # Example
//!
//! ```ignore
//! use ge_arb_oracle::{WikiPriceClient, WikiPriceClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = WikiPriceClient::new(WikiPriceClientConfig::default())?;
//!
//!     let price = client.latest_price(4151).await?;
//!     println!("instant-buy {}gp / instant-sell {}gp", price.low, price.high);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;

pub use client::{WikiPriceClient, WikiPriceClientConfig, DEFAULT_USER_AGENT, WIKI_PRICES_URL};
pub use error::{OracleError, Result};
