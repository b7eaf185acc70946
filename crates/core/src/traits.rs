use crate::price::LatestPrice;
use crate::trade::{ActiveTrade, NextAction, TradeStatus};
use anyhow::Result;
use async_trait::async_trait;

/// Real-time price lookup for one item.
///
/// Implementations are expected to cache; callers treat every failure as
/// "price unverifiable", never as fatal.
#[async_trait]
pub trait PriceOracle: Send + Sync {
    async fn latest_price(&self, item_id: i32) -> Result<LatestPrice>;
}

/// The recommendation/trade-tracking backend, reduced to the calls the
/// lifecycle orchestrator makes.
#[async_trait]
pub trait BackendApi: Send + Sync {
    /// Registers a new trade; returns the backend-assigned trade id.
    async fn create_trade(&self, item_id: i32, buy_price: i32, buy_quantity: i32) -> Result<i64>;

    /// Reports a status change; returns the backend's next-action hint.
    async fn update_trade(
        &self,
        trade_id: i64,
        status: TradeStatus,
        quantity_filled: i32,
    ) -> Result<NextAction>;

    /// Fetches the zero-or-one currently active trade.
    async fn active_trade(&self) -> Result<Option<ActiveTrade>>;
}

/// Surface for the one decision the tracker cannot make alone: whether to
/// proceed with trade creation after a blocking price-moved check.
#[async_trait]
pub trait DecisionPrompt: Send + Sync {
    async fn proceed_despite_price_move(&self, message: &str) -> bool;
}
