//! Trade lifecycle orchestration.
//!
//! Ties the pieces together: offer snapshots flow through the reconciler,
//! and the resulting events are matched against whatever the orchestrator is
//! currently focused on. A focused recommendation turns into a tracked trade
//! when the user places the matching buy order; a focused trade advances as
//! its orders fill. The backend is the source of truth for trade state; the
//! orchestrator only reports what it observed and mirrors what comes back.

use ge_arb_core::events::OfferEvent;
use ge_arb_core::offer::{OfferKind, OfferSnapshot};
use ge_arb_core::trade::{ActiveTrade, NextAction, Recommendation, TradeStatus};
use ge_arb_core::traits::{BackendApi, DecisionPrompt, PriceOracle};
use tracing::{debug, info, warn};

use crate::gate::{ValidationGate, ValidationResult};
use crate::reconciler::OfferReconciler;

// =============================================================================
// Focus
// =============================================================================

/// What the orchestrator is currently attending to.
///
/// At most one recommendation or one in-flight trade is tracked at a time;
/// the variants are mutually exclusive by construction.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Focus {
    /// Nothing to track; all offer events are ignored.
    #[default]
    Idle,
    /// A recommendation is pending; waiting for the user to place its
    /// buy order.
    Recommendation(Recommendation),
    /// A trade is registered with the backend and being advanced.
    Trade(ActiveTrade),
}

impl Focus {
    /// Returns true when nothing is tracked.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }
}

// =============================================================================
// Outcomes
// =============================================================================

/// What the orchestrator did in response to one offer event.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackerOutcome {
    /// The trade was registered with the backend. `warning` carries a
    /// non-blocking validation result the embedding UI may surface.
    TradeCreated {
        trade_id: i64,
        warning: Option<ValidationResult>,
    },

    /// Price validation blocked and the user chose not to proceed; the
    /// recommendation was dropped.
    Declined { validation: ValidationResult },

    /// The buy leg filled and was reported; the backend's next-action hint
    /// rides along.
    BuyReported { action: NextAction },

    /// The sell order for the focused trade was observed on the exchange.
    SellObserved,

    /// The sell leg filled; the trade is finished and the focus cleared.
    Completed,
}

// =============================================================================
// Configuration
// =============================================================================

/// Behavior switches for the orchestrator.
#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// When false, offer events are dropped entirely.
    pub auto_track: bool,

    /// When false, trades are created without the price validation gate.
    pub validate_prices: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            auto_track: true,
            validate_prices: true,
        }
    }
}

impl OrchestratorConfig {
    /// Builds the switches from loaded plugin settings.
    #[must_use]
    pub fn from_settings(settings: &ge_arb_core::config::TrackingSettings) -> Self {
        Self {
            auto_track: settings.auto_track,
            validate_prices: settings.validate_prices,
        }
    }
}

// =============================================================================
// TradeOrchestrator
// =============================================================================

/// Drives the recommendation-to-completion trade lifecycle from a stream of
/// offer snapshots.
///
/// Not internally synchronized; the owner feeds snapshots from a single
/// task, matching the reconciler's mutation contract.
pub struct TradeOrchestrator<B, O, P>
where
    B: BackendApi,
    O: PriceOracle,
    P: DecisionPrompt,
{
    backend: B,
    gate: ValidationGate<O>,
    prompt: P,
    reconciler: OfferReconciler,
    focus: Focus,
    config: OrchestratorConfig,
}

impl<B, O, P> TradeOrchestrator<B, O, P>
where
    B: BackendApi,
    O: PriceOracle,
    P: DecisionPrompt,
{
    /// Creates an orchestrator with default behavior switches.
    #[must_use]
    pub fn new(backend: B, oracle: O, prompt: P) -> Self {
        Self::with_config(backend, oracle, prompt, OrchestratorConfig::default())
    }

    /// Creates an orchestrator with explicit behavior switches.
    #[must_use]
    pub fn with_config(backend: B, oracle: O, prompt: P, config: OrchestratorConfig) -> Self {
        Self {
            backend,
            gate: ValidationGate::new(oracle),
            prompt,
            reconciler: OfferReconciler::new(),
            focus: Focus::Idle,
            config,
        }
    }

    /// Returns the current focus.
    #[must_use]
    pub fn focus(&self) -> &Focus {
        &self.focus
    }

    /// Focuses a fresh recommendation, replacing whatever was focused.
    pub fn set_recommendation(&mut self, rec: Recommendation) {
        info!(
            item_id = rec.item_id,
            item = %rec.item_name,
            buy_price = rec.buy_price,
            "recommendation focused"
        );
        self.focus = Focus::Recommendation(rec);
    }

    /// Drops the current focus.
    pub fn clear_focus(&mut self) {
        self.focus = Focus::Idle;
    }

    /// Adopts the backend's active trade as the focus, if one exists.
    ///
    /// Used at startup to resume a trade that was in flight when the client
    /// last shut down.
    pub async fn sync_active_trade(&mut self) -> anyhow::Result<()> {
        if let Some(trade) = self.backend.active_trade().await? {
            info!(
                trade_id = trade.trade_id,
                item = %trade.item_name,
                status = %trade.status,
                "resumed active trade"
            );
            self.focus = Focus::Trade(trade);
        }
        Ok(())
    }

    /// Feeds one offer snapshot through the reconciler and reacts to the
    /// resulting events.
    ///
    /// Backend failures propagate; the caller decides whether to retry the
    /// snapshot. Events that do not concern the focus produce no outcome.
    pub async fn on_offer_changed(
        &mut self,
        snapshot: OfferSnapshot,
    ) -> anyhow::Result<Vec<TrackerOutcome>> {
        if !self.config.auto_track {
            return Ok(Vec::new());
        }

        let events = self.reconciler.reconcile(snapshot);
        let mut outcomes = Vec::new();
        for event in events {
            if let Some(outcome) = self.handle_event(event).await? {
                outcomes.push(outcome);
            }
        }
        Ok(outcomes)
    }

    async fn handle_event(&mut self, event: OfferEvent) -> anyhow::Result<Option<TrackerOutcome>> {
        match event {
            OfferEvent::NewOrderPlaced { snapshot, .. } => self.on_new_order(snapshot).await,
            OfferEvent::OrderFilled { snapshot } => self.on_order_filled(snapshot).await,
            OfferEvent::OrderProgressed {
                snapshot,
                quantity_delta,
                ..
            } => {
                debug!(
                    slot = snapshot.slot,
                    item_id = snapshot.item_id,
                    quantity_delta,
                    "order progressed"
                );
                Ok(None)
            }
            OfferEvent::InconsistentTransition { .. } => Ok(None),
        }
    }

    async fn on_new_order(
        &mut self,
        snapshot: OfferSnapshot,
    ) -> anyhow::Result<Option<TrackerOutcome>> {
        match &self.focus {
            Focus::Recommendation(rec)
                if snapshot.kind.is_buy() && Self::matches_recommendation(rec, &snapshot) =>
            {
                let rec = rec.clone();
                self.begin_tracking(&rec, &snapshot).await.map(Some)
            }
            Focus::Trade(trade)
                if snapshot.kind.is_sell()
                    && snapshot.item_id == trade.item_id
                    && snapshot.price == trade.sell_price
                    && matches!(trade.status, TradeStatus::Bought | TradeStatus::Selling) =>
            {
                info!(
                    trade_id = trade.trade_id,
                    item = %trade.item_name,
                    price = snapshot.price,
                    "sell order placed for tracked trade"
                );
                Ok(Some(TrackerOutcome::SellObserved))
            }
            _ => {
                debug!(
                    slot = snapshot.slot,
                    item_id = snapshot.item_id,
                    kind = %snapshot.kind,
                    "new order does not concern the current focus"
                );
                Ok(None)
            }
        }
    }

    /// True if a buy order plausibly executes the recommendation: same item,
    /// same price, quantity not above the recommended ceiling.
    fn matches_recommendation(rec: &Recommendation, snapshot: &OfferSnapshot) -> bool {
        snapshot.item_id == rec.item_id
            && snapshot.price == rec.buy_price
            && snapshot.total_quantity <= rec.buy_quantity
    }

    async fn begin_tracking(
        &mut self,
        rec: &Recommendation,
        snapshot: &OfferSnapshot,
    ) -> anyhow::Result<TrackerOutcome> {
        let mut warning = None;
        if self.config.validate_prices {
            let validation = self.gate.validate(rec).await;
            if validation.is_blocking() {
                let message = validation.message.as_deref().unwrap_or("Price moved");
                if !self.prompt.proceed_despite_price_move(message).await {
                    info!(item_id = rec.item_id, "trade declined after price move");
                    self.focus = Focus::Idle;
                    return Ok(TrackerOutcome::Declined { validation });
                }
                warning = Some(validation);
            } else if validation.is_warning() {
                warning = Some(validation);
            }
        }

        let trade_id = self
            .backend
            .create_trade(rec.item_id, rec.buy_price, snapshot.total_quantity)
            .await?;
        info!(
            trade_id,
            item_id = rec.item_id,
            buy_price = rec.buy_price,
            quantity = snapshot.total_quantity,
            "trade created"
        );

        // Prefer the backend's record; synthesize one if the refetch fails
        // so tracking survives a transient read error.
        self.focus = match self.backend.active_trade().await {
            Ok(Some(trade)) => Focus::Trade(trade),
            Ok(None) => {
                warn!(trade_id, "backend reports no active trade after create");
                Focus::Trade(Self::local_trade(rec, trade_id, snapshot))
            }
            Err(err) => {
                warn!(trade_id, error = %err, "active trade refetch failed");
                Focus::Trade(Self::local_trade(rec, trade_id, snapshot))
            }
        };

        Ok(TrackerOutcome::TradeCreated { trade_id, warning })
    }

    fn mark_bought_locally(&mut self, quantity_filled: i32) {
        if let Focus::Trade(trade) = &mut self.focus {
            trade.status = TradeStatus::Bought;
            trade.buy_quantity_filled = quantity_filled;
        }
    }

    fn local_trade(rec: &Recommendation, trade_id: i64, snapshot: &OfferSnapshot) -> ActiveTrade {
        ActiveTrade {
            trade_id,
            item_id: rec.item_id,
            item_name: rec.item_name.clone(),
            buy_price: rec.buy_price,
            sell_price: rec.sell_price,
            buy_quantity: snapshot.total_quantity,
            status: TradeStatus::Buying,
            buy_quantity_filled: snapshot.quantity_filled,
            sell_quantity_filled: 0,
        }
    }

    async fn on_order_filled(
        &mut self,
        snapshot: OfferSnapshot,
    ) -> anyhow::Result<Option<TrackerOutcome>> {
        let Focus::Trade(trade) = &self.focus else {
            return Ok(None);
        };

        if snapshot.kind == OfferKind::Bought
            && snapshot.item_id == trade.item_id
            && snapshot.price == trade.buy_price
            && trade.status == TradeStatus::Buying
        {
            let trade_id = trade.trade_id;
            let action = self
                .backend
                .update_trade(trade_id, TradeStatus::Bought, snapshot.quantity_filled)
                .await?;
            info!(
                trade_id,
                quantity = snapshot.quantity_filled,
                action = ?action,
                "buy leg filled"
            );

            // Adopt the backend's record; the sell quote may have been
            // revised now that the buy leg is done. Fall back to a local
            // update if the refetch fails.
            match self.backend.active_trade().await {
                Ok(Some(updated)) => self.focus = Focus::Trade(updated),
                Ok(None) => {
                    warn!(trade_id, "backend reports no active trade after buy fill");
                    self.mark_bought_locally(snapshot.quantity_filled);
                }
                Err(err) => {
                    warn!(trade_id, error = %err, "active trade refetch failed");
                    self.mark_bought_locally(snapshot.quantity_filled);
                }
            }
            return Ok(Some(TrackerOutcome::BuyReported { action }));
        }

        if snapshot.kind == OfferKind::Sold
            && snapshot.item_id == trade.item_id
            && snapshot.price == trade.sell_price
            && matches!(trade.status, TradeStatus::Bought | TradeStatus::Selling)
        {
            let trade_id = trade.trade_id;
            self.backend
                .update_trade(trade_id, TradeStatus::Completed, snapshot.quantity_filled)
                .await?;
            info!(
                trade_id,
                quantity = snapshot.quantity_filled,
                "sell leg filled, trade complete"
            );
            self.focus = Focus::Idle;
            return Ok(Some(TrackerOutcome::Completed));
        }

        debug!(
            slot = snapshot.slot,
            item_id = snapshot.item_id,
            kind = %snapshot.kind,
            "filled order does not concern the tracked trade"
        );
        Ok(None)
    }
}
