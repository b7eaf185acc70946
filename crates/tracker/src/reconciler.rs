//! Offer-slot snapshot reconciliation.
//!
//! The host client delivers noisy, event-driven snapshots of each order-book
//! slot: duplicates, reordered observations, and slots silently reused for
//! unrelated offers. The reconciler turns that stream into clean lifecycle
//! events by comparing each snapshot against the last one seen for the same
//! slot.
//!
//! # Overview
//!
//! Per snapshot, the reconciler:
//! 1. Decides whether the slot holds a new logical offer or the same one
//! 2. Vetoes transitions that no legitimate offer sequence can produce
//! 3. Emits progress and completion events for surviving transitions
//! 4. Stores the snapshot as the slot's new point of comparison
//!
//! The per-slot table is mutated only from the host's single event-delivery
//! context; there is no internal locking.
//!
//! # Example
//!
//! ```ignore
//! use ge_arb_tracker::OfferReconciler;
//!
//! let mut reconciler = OfferReconciler::new();
//!
//! for snapshot in host_events {
//!     for event in reconciler.reconcile(snapshot) {
//!         println!("slot {}: {:?}", event.slot(), event);
//!     }
//! }
//! ```

use ge_arb_core::events::OfferEvent;
use ge_arb_core::offer::OfferSnapshot;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Converts raw per-slot offer snapshots into lifecycle events.
///
/// Owns the slot-to-last-snapshot table exclusively; the host event source
/// neither owns nor inspects it.
#[derive(Debug, Default)]
pub struct OfferReconciler {
    /// Last snapshot seen per slot. Absent until the slot's first
    /// observation, removed again when the slot empties.
    slots: HashMap<u8, OfferSnapshot>,
}

impl OfferReconciler {
    /// Creates an empty reconciler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the last snapshot stored for a slot.
    #[must_use]
    pub fn last_seen(&self, slot: u8) -> Option<&OfferSnapshot> {
        self.slots.get(&slot)
    }

    /// Returns the number of slots currently tracked.
    #[must_use]
    pub fn tracked_slots(&self) -> usize {
        self.slots.len()
    }

    /// Forgets all per-slot state.
    pub fn clear(&mut self) {
        self.slots.clear();
    }

    /// Classifies `snapshot` against the previous observation for its slot
    /// and returns the lifecycle events it implies.
    ///
    /// The snapshot is always stored as the slot's new last-seen value, even
    /// when the transition is rejected as inconsistent, so the next event is
    /// compared against the most recent observation rather than a stale one.
    pub fn reconcile(&mut self, snapshot: OfferSnapshot) -> Vec<OfferEvent> {
        let slot = snapshot.slot;

        if snapshot.kind.is_empty() {
            // Slot vacated; the next occupant is unrelated to anything seen.
            if self.slots.remove(&slot).is_some() {
                debug!(slot, "slot vacated");
            }
            return Vec::new();
        }

        let previous = self.slots.get(&slot).cloned();
        let mut events = Vec::new();

        if snapshot.is_new_offer(previous.as_ref()) {
            if snapshot.is_consistent_with(previous.as_ref()) {
                info!(
                    slot,
                    item_id = snapshot.item_id,
                    price = snapshot.price,
                    total_quantity = snapshot.total_quantity,
                    kind = %snapshot.kind,
                    "new offer placed"
                );
                events.push(OfferEvent::NewOrderPlaced {
                    snapshot: snapshot.clone(),
                    previous: previous.clone(),
                });
            } else if let Some(prev) = previous {
                // Fill counters retreated while the offer identity held
                // still. Unexplainable; discard the transition but keep the
                // snapshot so it is not reprocessed on the next event.
                warn!(
                    slot,
                    item_id = snapshot.item_id,
                    quantity_filled = snapshot.quantity_filled,
                    previous_filled = prev.quantity_filled,
                    "inconsistent offer transition discarded"
                );
                events.push(OfferEvent::InconsistentTransition {
                    snapshot: snapshot.clone(),
                    previous: prev,
                });
            }
        } else if let Some(prev) = previous {
            let quantity_delta = snapshot.quantity_filled - prev.quantity_filled;
            let spend_delta = snapshot.spent - prev.spent;

            if quantity_delta <= 0 && spend_delta <= 0 {
                // Host runtimes redeliver identical snapshots.
                debug!(slot, "duplicate snapshot ignored");
            } else {
                debug!(
                    slot,
                    item_id = snapshot.item_id,
                    quantity_delta,
                    spend_delta,
                    kind = %snapshot.kind,
                    "offer progressed"
                );
                events.push(OfferEvent::OrderProgressed {
                    snapshot: snapshot.clone(),
                    previous: prev.clone(),
                    quantity_delta,
                    spend_delta,
                });

                if snapshot.kind.completes(prev.kind) {
                    info!(
                        slot,
                        item_id = snapshot.item_id,
                        quantity_filled = snapshot.quantity_filled,
                        kind = %snapshot.kind,
                        "offer filled"
                    );
                    events.push(OfferEvent::OrderFilled {
                        snapshot: snapshot.clone(),
                    });
                }
            }
        }

        self.slots.insert(slot, snapshot);
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ge_arb_core::offer::OfferKind;

    fn snap(
        slot: u8,
        item_id: i32,
        price: i32,
        total: i32,
        filled: i32,
        spent: i64,
        kind: OfferKind,
    ) -> OfferSnapshot {
        OfferSnapshot::new(slot, item_id, price, total, filled, spent, kind)
    }

    // ==================== New Offer Tests ====================

    #[test]
    fn test_first_snapshot_is_new_order() {
        let mut reconciler = OfferReconciler::new();

        let events = reconciler.reconcile(snap(0, 554, 5, 1000, 0, 0, OfferKind::Buying));

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            OfferEvent::NewOrderPlaced { ref previous, .. } if previous.is_none()
        ));
        assert_eq!(reconciler.tracked_slots(), 1);
    }

    #[test]
    fn test_price_change_is_new_order_not_anomaly() {
        let mut reconciler = OfferReconciler::new();
        reconciler.reconcile(snap(0, 554, 5, 1000, 400, 2000, OfferKind::Buying));

        let events = reconciler.reconcile(snap(0, 554, 6, 1000, 0, 0, OfferKind::Buying));

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            OfferEvent::NewOrderPlaced { ref previous, .. } if previous.is_some()
        ));
    }

    #[test]
    fn test_item_change_is_new_order() {
        let mut reconciler = OfferReconciler::new();
        reconciler.reconcile(snap(0, 554, 5, 1000, 400, 2000, OfferKind::Buying));

        let events = reconciler.reconcile(snap(0, 560, 200, 100, 0, 0, OfferKind::Buying));

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], OfferEvent::NewOrderPlaced { .. }));
    }

    // ==================== Progress Tests ====================

    #[test]
    fn test_partial_fill_emits_progress_with_deltas() {
        let mut reconciler = OfferReconciler::new();
        reconciler.reconcile(snap(0, 554, 5, 1000, 0, 0, OfferKind::Buying));

        let events = reconciler.reconcile(snap(0, 554, 5, 1000, 400, 2000, OfferKind::Buying));

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            OfferEvent::OrderProgressed {
                quantity_delta: 400,
                spend_delta: 2000,
                ..
            }
        ));
    }

    #[test]
    fn test_completion_emits_progress_then_fill() {
        let mut reconciler = OfferReconciler::new();
        reconciler.reconcile(snap(0, 554, 5, 1000, 0, 0, OfferKind::Buying));
        reconciler.reconcile(snap(0, 554, 5, 1000, 400, 2000, OfferKind::Buying));

        let events = reconciler.reconcile(snap(0, 554, 5, 1000, 1000, 5000, OfferKind::Bought));

        assert_eq!(events.len(), 2);
        assert!(matches!(
            events[0],
            OfferEvent::OrderProgressed {
                quantity_delta: 600,
                ..
            }
        ));
        assert!(matches!(events[1], OfferEvent::OrderFilled { .. }));
    }

    #[test]
    fn test_sell_completion_emits_fill() {
        let mut reconciler = OfferReconciler::new();
        reconciler.reconcile(snap(2, 4151, 2_580_000, 1, 0, 0, OfferKind::Selling));

        let events = reconciler.reconcile(snap(2, 4151, 2_580_000, 1, 1, 2_580_000, OfferKind::Sold));

        assert_eq!(events.len(), 2);
        assert!(matches!(events[1], OfferEvent::OrderFilled { .. }));
    }

    #[test]
    fn test_spend_only_progress_still_emits() {
        let mut reconciler = OfferReconciler::new();
        reconciler.reconcile(snap(0, 554, 5, 1000, 100, 500, OfferKind::Buying));

        let events = reconciler.reconcile(snap(0, 554, 5, 1000, 100, 600, OfferKind::Buying));

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            OfferEvent::OrderProgressed {
                quantity_delta: 0,
                spend_delta: 100,
                ..
            }
        ));
    }

    #[test]
    fn test_cancellation_does_not_emit_fill() {
        let mut reconciler = OfferReconciler::new();
        reconciler.reconcile(snap(0, 554, 5, 1000, 100, 500, OfferKind::Buying));

        let events = reconciler.reconcile(snap(0, 554, 5, 1000, 150, 750, OfferKind::Cancelled));

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], OfferEvent::OrderProgressed { .. }));
    }

    // ==================== Duplicate / Idempotence Tests ====================

    #[test]
    fn test_identical_snapshot_emits_nothing() {
        let mut reconciler = OfferReconciler::new();
        reconciler.reconcile(snap(0, 554, 5, 1000, 400, 2000, OfferKind::Buying));

        let events = reconciler.reconcile(snap(0, 554, 5, 1000, 400, 2000, OfferKind::Buying));

        assert!(events.is_empty());
    }

    // ==================== Inconsistency Tests ====================

    #[test]
    fn test_filled_decrease_same_identity_is_inconsistent() {
        // Same item, price, and total, but the fill counter retreated.
        // Classified new by the decrease, then vetoed.
        let mut reconciler = OfferReconciler::new();
        reconciler.reconcile(snap(1, 2, 10, 100, 50, 500, OfferKind::Buying));

        let events = reconciler.reconcile(snap(1, 2, 10, 100, 30, 300, OfferKind::Buying));

        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], OfferEvent::InconsistentTransition { .. }));
    }

    #[test]
    fn test_inconsistent_snapshot_still_replaces_state() {
        let mut reconciler = OfferReconciler::new();
        reconciler.reconcile(snap(1, 2, 10, 100, 50, 500, OfferKind::Buying));
        reconciler.reconcile(snap(1, 2, 10, 100, 30, 300, OfferKind::Buying));

        // Progress is now measured against the rejected snapshot, not the
        // older one, so the same event is not reprocessed.
        let events = reconciler.reconcile(snap(1, 2, 10, 100, 35, 350, OfferKind::Buying));

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            OfferEvent::OrderProgressed {
                quantity_delta: 5,
                spend_delta: 50,
                ..
            }
        ));
    }

    #[test]
    fn test_monotone_sequence_never_inconsistent() {
        let mut reconciler = OfferReconciler::new();
        let fills = [(0, 0), (100, 500), (100, 500), (400, 2000), (1000, 5000)];

        for (filled, spent) in fills {
            let kind = if filled == 1000 {
                OfferKind::Bought
            } else {
                OfferKind::Buying
            };
            let events = reconciler.reconcile(snap(0, 554, 5, 1000, filled, spent, kind));
            assert!(!events
                .iter()
                .any(|e| matches!(e, OfferEvent::InconsistentTransition { .. })));
        }
    }

    // ==================== Empty Slot Tests ====================

    #[test]
    fn test_empty_snapshot_clears_slot_silently() {
        let mut reconciler = OfferReconciler::new();
        reconciler.reconcile(snap(0, 554, 5, 1000, 1000, 5000, OfferKind::Bought));

        let events = reconciler.reconcile(snap(0, 0, 0, 0, 0, 0, OfferKind::Empty));

        assert!(events.is_empty());
        assert_eq!(reconciler.tracked_slots(), 0);
        assert!(reconciler.last_seen(0).is_none());
    }

    #[test]
    fn test_next_occupant_after_empty_is_unrelated() {
        let mut reconciler = OfferReconciler::new();
        reconciler.reconcile(snap(0, 554, 5, 1000, 1000, 5000, OfferKind::Bought));
        reconciler.reconcile(snap(0, 0, 0, 0, 0, 0, OfferKind::Empty));

        // Same identity as the old occupant, but compared against nothing.
        let events = reconciler.reconcile(snap(0, 554, 5, 1000, 0, 0, OfferKind::Buying));

        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            OfferEvent::NewOrderPlaced { ref previous, .. } if previous.is_none()
        ));
    }

    // ==================== Multi-Slot Tests ====================

    #[test]
    fn test_slots_are_independent() {
        let mut reconciler = OfferReconciler::new();
        reconciler.reconcile(snap(0, 554, 5, 1000, 0, 0, OfferKind::Buying));
        reconciler.reconcile(snap(1, 560, 200, 100, 0, 0, OfferKind::Buying));

        let events = reconciler.reconcile(snap(0, 554, 5, 1000, 500, 2500, OfferKind::Buying));

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].slot(), 0);
        assert_eq!(reconciler.tracked_slots(), 2);
        assert_eq!(reconciler.last_seen(1).map(|s| s.quantity_filled), Some(0));
    }

    // ==================== End-to-End Scenario ====================

    #[test]
    fn test_buy_order_full_lifecycle() {
        let mut reconciler = OfferReconciler::new();

        let a = reconciler.reconcile(snap(0, 554, 5, 1000, 0, 0, OfferKind::Buying));
        assert!(matches!(a[0], OfferEvent::NewOrderPlaced { .. }));

        let b = reconciler.reconcile(snap(0, 554, 5, 1000, 400, 2000, OfferKind::Buying));
        assert!(matches!(
            b[0],
            OfferEvent::OrderProgressed {
                quantity_delta: 400,
                ..
            }
        ));

        let c = reconciler.reconcile(snap(0, 554, 5, 1000, 1000, 5000, OfferKind::Bought));
        assert_eq!(c.len(), 2);
        assert!(matches!(c[1], OfferEvent::OrderFilled { .. }));

        let d = reconciler.reconcile(snap(0, 0, 0, 0, 0, 0, OfferKind::Empty));
        assert!(d.is_empty());
        assert_eq!(reconciler.tracked_slots(), 0);
    }
}
