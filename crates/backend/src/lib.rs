//! Backend integration for the arbitrage recommendation service.
//!
//! This crate provides:
//! - REST client with bearer-token auth (register/login)
//! - Recommendation fetch with account context query parameters
//! - Trade create/update/active endpoints for lifecycle tracking
//!
//! # Example
//!
//! ```ignore
//! use ge_arb_backend::{BackendClient, BackendClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = BackendClient::new(BackendClientConfig::default())?;
//!     client.login("user@example.com", "password").await?;
//!
//!     if let Some(trade) = client.active_trade().await? {
//!         println!("resuming trade {}", trade.trade_id);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod types;

pub use client::{BackendClient, BackendClientConfig};
pub use error::{BackendError, Result};
pub use types::{
    AuthResponse, RecommendationReply, TradeCreateRequest, TradeCreateResponse,
    TradeUpdateRequest, TradeUpdateResponse, WaitNotice,
};
