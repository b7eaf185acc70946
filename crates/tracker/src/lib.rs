//! Grand Exchange trade tracking.
//!
//! Three layers, composed by [`TradeOrchestrator`]:
//!
//! - [`reconciler`] turns raw per-slot offer snapshots into lifecycle
//!   events by diffing each snapshot against the slot's last known state.
//! - [`gate`] validates a recommendation against real-time oracle prices
//!   before a trade is registered, blocking only on a significant price
//!   move.
//! - [`orchestrator`] matches lifecycle events against the focused
//!   recommendation or in-flight trade and keeps the backend informed.
//!
//! The collaborators (backend, price oracle, user prompt) enter through the
//! traits in `ge-arb-core`, so everything here is testable with stubs.

pub mod gate;
pub mod orchestrator;
pub mod reconciler;

pub use gate::{GateConfig, ValidationGate, ValidationResult, ValidationStatus};
pub use orchestrator::{Focus, OrchestratorConfig, TradeOrchestrator, TrackerOutcome};
pub use reconciler::OfferReconciler;
