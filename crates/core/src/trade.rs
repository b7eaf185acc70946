//! Recommendation and trade records mirroring the backend wire contract.

use serde::{Deserialize, Serialize};

/// A suggested trade computed by the backend's scoring engine.
///
/// Read-only to the tracker; the scoring metadata rides along for display
/// but only item, prices, and the quantity ceiling drive tracking decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub item_id: i32,
    pub item_name: String,
    /// Suggested buy price in gp.
    pub buy_price: i32,
    /// Suggested sell price in gp.
    pub sell_price: i32,
    /// Quantity ceiling for the buy order.
    pub buy_quantity: i32,
    pub margin: i32,
    pub ge_limit: i32,
    pub ml_score: f64,
    pub expected_profit: i32,
    pub expected_roi_percent: f64,
    pub volume_24h: i64,
}

/// Backend-side lifecycle status of a tracked trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeStatus {
    Buying,
    Bought,
    Selling,
    Completed,
}

impl TradeStatus {
    /// Returns the wire string for this status.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buying => "buying",
            Self::Bought => "bought",
            Self::Selling => "selling",
            Self::Completed => "completed",
        }
    }

    /// Returns true once the trade has finished both legs.
    #[must_use]
    pub fn is_completed(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl std::fmt::Display for TradeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Next-action hint returned by the backend after a trade update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NextAction {
    /// Keep waiting for the current leg to fill.
    Wait,
    /// Buy leg is done; place the sell order.
    Sell,
    /// Both legs are done.
    Complete,
}

/// Local mirror of the backend's record for the one in-flight trade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveTrade {
    pub trade_id: i64,
    pub item_id: i32,
    pub item_name: String,
    pub buy_price: i32,
    pub sell_price: i32,
    pub buy_quantity: i32,
    pub status: TradeStatus,
    pub buy_quantity_filled: i32,
    pub sell_quantity_filled: i32,
}
