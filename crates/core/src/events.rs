//! Lifecycle events derived from pairs of offer snapshots.

use crate::offer::OfferSnapshot;
use serde::{Deserialize, Serialize};

/// High-level transition inferred by the reconciler for one slot.
///
/// One reconciliation call can yield zero, one, or two events: a fill that
/// also finishes the order emits `OrderProgressed` followed by `OrderFilled`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum OfferEvent {
    /// A distinct new offer now occupies the slot.
    NewOrderPlaced {
        snapshot: OfferSnapshot,
        /// The displaced occupant, if the slot was in use.
        previous: Option<OfferSnapshot>,
    },

    /// The slot's offer gained fills since the last observation.
    OrderProgressed {
        snapshot: OfferSnapshot,
        previous: OfferSnapshot,
        /// Units filled since the previous observation.
        quantity_delta: i32,
        /// Gp moved since the previous observation.
        spend_delta: i64,
    },

    /// The slot's offer reached its filled terminal state.
    OrderFilled { snapshot: OfferSnapshot },

    /// The observed pair is internally impossible and was discarded.
    InconsistentTransition {
        snapshot: OfferSnapshot,
        previous: OfferSnapshot,
    },
}

impl OfferEvent {
    /// Returns the slot this event concerns.
    #[must_use]
    pub fn slot(&self) -> u8 {
        self.snapshot().slot
    }

    /// Returns the snapshot that triggered this event.
    #[must_use]
    pub fn snapshot(&self) -> &OfferSnapshot {
        match self {
            Self::NewOrderPlaced { snapshot, .. }
            | Self::OrderProgressed { snapshot, .. }
            | Self::OrderFilled { snapshot }
            | Self::InconsistentTransition { snapshot, .. } => snapshot,
        }
    }
}
