//! Offer-slot snapshots and the transition predicates used to classify them.
//!
//! A Grand Exchange offer occupies one of eight slots. The host client
//! reports the slot's state as opaque snapshots; everything the tracker
//! knows about an offer's lifecycle is inferred by comparing a snapshot
//! against the immediately preceding one for the same slot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Direction and completion state of an offer slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OfferKind {
    /// Buy order still filling.
    Buying,
    /// Buy order fully filled.
    Bought,
    /// Sell order still filling.
    Selling,
    /// Sell order fully filled.
    Sold,
    /// Order cancelled by the player.
    Cancelled,
    /// Slot holds no offer.
    Empty,
}

impl OfferKind {
    /// Returns true for buy-side kinds.
    #[must_use]
    pub fn is_buy(self) -> bool {
        matches!(self, Self::Buying | Self::Bought)
    }

    /// Returns true for sell-side kinds.
    #[must_use]
    pub fn is_sell(self) -> bool {
        matches!(self, Self::Selling | Self::Sold)
    }

    /// Returns true if no further fills can occur.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Bought | Self::Sold | Self::Cancelled)
    }

    /// Returns true if the slot is vacant.
    #[must_use]
    pub fn is_empty(self) -> bool {
        matches!(self, Self::Empty)
    }

    /// Returns true if this kind is the filled terminal of `prior`
    /// (Buying to Bought, Selling to Sold).
    #[must_use]
    pub fn completes(self, prior: OfferKind) -> bool {
        matches!(
            (prior, self),
            (Self::Buying, Self::Bought) | (Self::Selling, Self::Sold)
        )
    }

    /// Returns the display string.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Buying => "buying",
            Self::Bought => "bought",
            Self::Selling => "selling",
            Self::Sold => "sold",
            Self::Cancelled => "cancelled",
            Self::Empty => "empty",
        }
    }
}

impl std::fmt::Display for OfferKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Snapshot of one offer slot at a point in time.
///
/// Within a single logical offer's lifetime, `item_id` and `price` never
/// change and `quantity_filled` / `spent` are non-decreasing. Any observation
/// violating that either marks a reused slot or a malformed event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OfferSnapshot {
    /// Slot index in the order book (0..7).
    pub slot: u8,

    /// Item being traded.
    pub item_id: i32,

    /// Unit price set on the offer, in gp.
    pub price: i32,

    /// Quantity requested.
    pub total_quantity: i32,

    /// Cumulative quantity filled so far.
    pub quantity_filled: i32,

    /// Cumulative gp moved so far.
    pub spent: i64,

    /// Direction and completion state.
    pub kind: OfferKind,

    /// When this snapshot was observed.
    pub observed_at: DateTime<Utc>,
}

impl OfferSnapshot {
    /// Creates a snapshot observed now.
    #[must_use]
    pub fn new(
        slot: u8,
        item_id: i32,
        price: i32,
        total_quantity: i32,
        quantity_filled: i32,
        spent: i64,
        kind: OfferKind,
    ) -> Self {
        Self {
            slot,
            item_id,
            price,
            total_quantity,
            quantity_filled,
            spent,
            kind,
            observed_at: Utc::now(),
        }
    }

    /// True if this snapshot cannot belong to the same logical offer as
    /// `previous`.
    ///
    /// A decrease in filled quantity means the slot was reused: fills never
    /// retreat within one offer's lifetime.
    #[must_use]
    pub fn is_new_offer(&self, previous: Option<&OfferSnapshot>) -> bool {
        let Some(prev) = previous else {
            return true;
        };

        self.item_id != prev.item_id
            || self.price != prev.price
            || self.total_quantity != prev.total_quantity
            || self.quantity_filled < prev.quantity_filled
    }

    /// True unless item and price are unchanged while filled quantity or
    /// spend decreased, which no legitimate offer sequence can produce.
    ///
    /// A changed item or price is a different offer, not a contradiction;
    /// the veto applies only when the offer identity held still.
    #[must_use]
    pub fn is_consistent_with(&self, previous: Option<&OfferSnapshot>) -> bool {
        let Some(prev) = previous else {
            return true;
        };

        if self.item_id != prev.item_id || self.price != prev.price {
            return true;
        }

        self.quantity_filled >= prev.quantity_filled && self.spent >= prev.spent
    }
}
