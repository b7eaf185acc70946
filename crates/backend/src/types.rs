//! Wire types for the backend REST API.

use ge_arb_core::trade::{ActiveTrade, NextAction, Recommendation, TradeStatus};
use serde::{Deserialize, Serialize};

/// Response from `/auth/register` and `/auth/login`.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    /// Bearer token for subsequent calls.
    pub token: String,
}

/// Reply from `/recommendations`: either a recommendation to act on, or a
/// wait indicator while a trade is still in flight.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum RecommendationReply {
    Ready(Recommendation),
    Wait(WaitNotice),
}

/// Backend asks the user to wait before requesting another recommendation.
#[derive(Debug, Clone, Deserialize)]
pub struct WaitNotice {
    pub action: String,
    pub message: Option<String>,
}

/// Request body for `/trades/create`.
#[derive(Debug, Clone, Serialize)]
pub struct TradeCreateRequest {
    pub item_id: i32,
    pub buy_price: i32,
    pub buy_quantity: i32,
}

/// Response from `/trades/create`.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeCreateResponse {
    pub trade_id: i64,
    pub status: TradeStatus,
    pub item_id: i32,
    pub buy_price: i32,
    pub buy_quantity: i32,
}

/// Request body for `/trades/{id}/update`.
#[derive(Debug, Clone, Serialize)]
pub struct TradeUpdateRequest {
    pub status: TradeStatus,
    pub quantity_filled: i32,
}

/// Response from `/trades/{id}/update`.
#[derive(Debug, Clone, Deserialize)]
pub struct TradeUpdateResponse {
    pub success: bool,
    pub trade: Option<ActiveTrade>,
    /// What the backend expects the user to do next.
    pub action: NextAction,
    /// Sell price to quote when `action` is `Sell`.
    pub sell_price: Option<i32>,
}
