//! Real-time price observations from the price oracle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Latest observed trades for one item, as reported by the price oracle.
///
/// `low` is the last instant-buy price and `high` the last instant-sell
/// price; each carries the unix timestamp of the trade it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LatestPrice {
    pub item_id: i32,
    /// Last instant-sell price in gp.
    pub high: i32,
    /// Unix timestamp (seconds) of the last instant-sell trade.
    pub high_time: i64,
    /// Last instant-buy price in gp.
    pub low: i32,
    /// Unix timestamp (seconds) of the last instant-buy trade.
    pub low_time: i64,
}

impl LatestPrice {
    /// Seconds elapsed since the last instant-buy trade, relative to `now`.
    #[must_use]
    pub fn secs_since_last_buy(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp() - self.low_time
    }

    /// Seconds elapsed since the last instant-sell trade, relative to `now`.
    #[must_use]
    pub fn secs_since_last_sell(&self, now: DateTime<Utc>) -> i64 {
        now.timestamp() - self.high_time
    }

    /// True if both sides traded within the last `max_age_secs`.
    #[must_use]
    pub fn is_recent(&self, now: DateTime<Utc>, max_age_secs: i64) -> bool {
        self.secs_since_last_buy(now) < max_age_secs
            && self.secs_since_last_sell(now) < max_age_secs
    }
}
