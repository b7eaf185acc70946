//! Pre-trade price validation.
//!
//! Recommendations are computed ahead of time; by the moment the user acts
//! on one, the market may have moved or dried up. The gate checks a
//! recommendation against the oracle's latest prices and classifies the
//! result. Only a significant price move blocks; everything else, including
//! an unreachable oracle, is at most a warning so the user is never stuck
//! behind a price lookup.

use chrono::{DateTime, Utc};
use ge_arb_core::price::LatestPrice;
use ge_arb_core::trade::Recommendation;
use ge_arb_core::traits::PriceOracle;
use tracing::{debug, warn};

// =============================================================================
// Configuration
// =============================================================================

/// Tolerances applied by the validation gate.
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Maximum tolerated upward buy-price drift, as a fraction.
    pub buy_drift_limit: f64,

    /// Maximum tolerated downward sell-price drift, as a fraction.
    pub sell_drift_limit: f64,

    /// Seconds without a trade on either side before warning about
    /// liquidity.
    pub low_liquidity_threshold_secs: i64,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            buy_drift_limit: 0.02,
            sell_drift_limit: 0.02,
            low_liquidity_threshold_secs: 600,
        }
    }
}

// =============================================================================
// Validation Result
// =============================================================================

/// Classification of a recommendation against current prices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationStatus {
    /// All checks passed.
    Valid,
    /// Price moved beyond tolerance (blocking).
    PriceMoved,
    /// No recent trades (warning).
    LowLiquidity,
    /// Could not verify (warning).
    OracleUnavailable,
}

/// Result of validating a recommendation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    /// Exactly one classification per validation.
    pub status: ValidationStatus,

    /// Advisory message for non-Valid statuses.
    pub message: Option<String>,

    /// The oracle snapshot the checks ran against, when one was available.
    pub latest: Option<LatestPrice>,
}

impl ValidationResult {
    /// Returns true if all checks passed.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.status == ValidationStatus::Valid
    }

    /// Returns true for advisory statuses that do not stop the trade path.
    #[must_use]
    pub fn is_warning(&self) -> bool {
        matches!(
            self.status,
            ValidationStatus::LowLiquidity | ValidationStatus::OracleUnavailable
        )
    }

    /// Returns true for the one status that requires a user decision.
    #[must_use]
    pub fn is_blocking(&self) -> bool {
        self.status == ValidationStatus::PriceMoved
    }
}

// =============================================================================
// ValidationGate
// =============================================================================

/// Validates recommendations against real-time prices before a trade is
/// tracked.
#[derive(Debug)]
pub struct ValidationGate<O: PriceOracle> {
    oracle: O,
    config: GateConfig,
}

impl<O: PriceOracle> ValidationGate<O> {
    /// Creates a gate with default tolerances.
    #[must_use]
    pub fn new(oracle: O) -> Self {
        Self::with_config(oracle, GateConfig::default())
    }

    /// Creates a gate with explicit tolerances.
    #[must_use]
    pub fn with_config(oracle: O, config: GateConfig) -> Self {
        Self { oracle, config }
    }

    /// Returns the configured tolerances.
    #[must_use]
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Validates a recommendation against the oracle's latest prices.
    ///
    /// Oracle failure degrades to [`ValidationStatus::OracleUnavailable`];
    /// this method never returns an error.
    pub async fn validate(&self, rec: &Recommendation) -> ValidationResult {
        match self.oracle.latest_price(rec.item_id).await {
            Ok(latest) => self.evaluate(rec, &latest, Utc::now()),
            Err(err) => {
                warn!(item_id = rec.item_id, error = %err, "price check unavailable");
                ValidationResult {
                    status: ValidationStatus::OracleUnavailable,
                    message: Some(
                        "Could not verify current price - trade at your own risk".to_string(),
                    ),
                    latest: None,
                }
            }
        }
    }

    /// Applies the drift and liquidity checks against an already-fetched
    /// price, relative to `now`. Checks are ordered; the first that fires
    /// determines the result.
    #[must_use]
    pub fn evaluate(
        &self,
        rec: &Recommendation,
        latest: &LatestPrice,
        now: DateTime<Utc>,
    ) -> ValidationResult {
        // 1. Buy price drift. Strictly greater than the limit blocks.
        if rec.buy_price > 0 {
            let buy_drift = f64::from(latest.low - rec.buy_price) / f64::from(rec.buy_price);
            if buy_drift > self.config.buy_drift_limit {
                let message = format!(
                    "Buy price increased {:.1}%\nExpected: {} gp\nCurrent: {} gp\n\nTrade may no longer be profitable.",
                    buy_drift * 100.0,
                    rec.buy_price,
                    latest.low
                );
                return ValidationResult {
                    status: ValidationStatus::PriceMoved,
                    message: Some(message),
                    latest: Some(latest.clone()),
                };
            }
        }

        // 2. Sell price drift. Strictly below the negative limit blocks.
        if rec.sell_price > 0 {
            let sell_drift = f64::from(latest.high - rec.sell_price) / f64::from(rec.sell_price);
            if sell_drift < -self.config.sell_drift_limit {
                let message = format!(
                    "Sell price decreased {:.1}%\nExpected: {} gp\nCurrent: {} gp\n\nTrade may no longer be profitable.",
                    sell_drift.abs() * 100.0,
                    rec.sell_price,
                    latest.high
                );
                return ValidationResult {
                    status: ValidationStatus::PriceMoved,
                    message: Some(message),
                    latest: Some(latest.clone()),
                };
            }
        }

        // 3. Liquidity: recency of the slower side.
        let stale_secs = latest
            .secs_since_last_buy(now)
            .max(latest.secs_since_last_sell(now));
        if stale_secs > self.config.low_liquidity_threshold_secs {
            let minutes = stale_secs / 60;
            let message = format!(
                "Low liquidity warning\n\nNo trades in last {minutes} minutes.\nOrder may take hours to fill."
            );
            return ValidationResult {
                status: ValidationStatus::LowLiquidity,
                message: Some(message),
                latest: Some(latest.clone()),
            };
        }

        debug!(item_id = rec.item_id, "price validation passed");
        ValidationResult {
            status: ValidationStatus::Valid,
            message: None,
            latest: Some(latest.clone()),
        }
    }
}
