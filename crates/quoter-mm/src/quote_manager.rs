//! Quote lifecycle management.
//!
//! Owns the two resting quotes on the primary instrument, one ask and one
//! bid, and decides on every primary book update:
//! - whether the resting quote on a side is stale and must be cancelled
//! - whether a fresh quote may be inserted, and how large it may be
//!
//! Cancellation on a side always happens before insertion on that side in
//! the same update. A cancelled quote leaves its slot immediately; its
//! resident volume stays in the ledger until the exchange confirms it.

use quoter_core::{Lifespan, OrderId, OrderIdAllocator, Price, Side, Volume};
use serde::Serialize;
use tracing::{debug, info};

use crate::gateway::OrderGateway;
use crate::ledger::OrderLedger;

/// One quote slot. An empty slot has no id, no price and no volume.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum QuoteSlot {
    #[default]
    Empty,
    Resting {
        order_id: OrderId,
        price: Price,
        /// Not-yet-filled quantity.
        volume: Volume,
    },
}

impl QuoteSlot {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn order_id(&self) -> Option<OrderId> {
        match self {
            Self::Empty => None,
            Self::Resting { order_id, .. } => Some(*order_id),
        }
    }

    /// Price the quote was inserted at; zero when empty.
    pub fn price(&self) -> Price {
        match self {
            Self::Empty => Price::ZERO,
            Self::Resting { price, .. } => *price,
        }
    }

    /// Resident volume; zero when empty.
    pub fn volume(&self) -> Volume {
        match self {
            Self::Empty => Volume::ZERO,
            Self::Resting { volume, .. } => *volume,
        }
    }

    fn holds(&self, id: OrderId) -> bool {
        self.order_id() == Some(id)
    }
}

/// Inputs for sizing one insert.
#[derive(Debug, Clone, Copy)]
pub struct InsertRequest {
    pub side: Side,
    /// New top-of-book price on that side; zero means no quote.
    pub price: Price,
    /// Target volume from the position tracker.
    pub desired_volume: i64,
    pub net_position: i64,
    pub position_limit: i64,
    /// Volume on this side that could still fill, including cancels in flight.
    pub resident_volume: Volume,
}

/// Cap a desired quote size so that even a complete fill of everything
/// resident on that side cannot breach the position limit.
///
/// The result may be zero or negative when there is no capacity left.
pub fn capped_volume(
    side: Side,
    desired: i64,
    net_position: i64,
    position_limit: i64,
    resident: Volume,
) -> i64 {
    let capacity = match side {
        Side::Sell => position_limit + net_position - resident.signed(),
        Side::Buy => position_limit - net_position - resident.signed(),
    };
    capacity.min(desired)
}

/// Manages the ask and bid quote slots.
#[derive(Debug, Default)]
pub struct QuoteManager {
    ask: QuoteSlot,
    bid: QuoteSlot,
}

impl QuoteManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slot for a side: sells rest in the ask slot, buys in the bid slot.
    pub fn slot(&self, side: Side) -> &QuoteSlot {
        match side {
            Side::Sell => &self.ask,
            Side::Buy => &self.bid,
        }
    }

    fn slot_mut(&mut self, side: Side) -> &mut QuoteSlot {
        match side {
            Side::Sell => &mut self.ask,
            Side::Buy => &mut self.bid,
        }
    }

    pub fn ask(&self) -> &QuoteSlot {
        &self.ask
    }

    pub fn bid(&self) -> &QuoteSlot {
        &self.bid
    }

    /// Cancel the resting quote on `side` if the top of book moved away from it.
    ///
    /// A zero `new_top` (empty book side) never triggers a cancel. The slot is
    /// emptied without waiting for the cancel acknowledgement.
    pub fn cancel_stale<G: OrderGateway>(
        &mut self,
        side: Side,
        new_top: Price,
        gateway: &mut G,
    ) -> Option<OrderId> {
        let slot = self.slot_mut(side);
        let QuoteSlot::Resting {
            order_id, price, ..
        } = *slot
        else {
            return None;
        };
        if new_top.is_zero() || new_top == price {
            return None;
        }

        gateway.cancel_order(order_id);
        *slot = QuoteSlot::Empty;
        info!(
            order_id = %order_id,
            side = %side,
            old_price = %price,
            new_price = %new_top,
            "Cancelling stale quote"
        );
        Some(order_id)
    }

    /// Insert a quote if the slot is empty, the price is set, and the capped
    /// volume is strictly positive.
    pub fn insert<G: OrderGateway>(
        &mut self,
        request: InsertRequest,
        ids: &mut OrderIdAllocator,
        ledger: &mut OrderLedger,
        gateway: &mut G,
    ) -> Option<OrderId> {
        let InsertRequest {
            side,
            price,
            desired_volume,
            net_position,
            position_limit,
            resident_volume,
        } = request;

        let capped = capped_volume(
            side,
            desired_volume,
            net_position,
            position_limit,
            resident_volume,
        );
        if !self.slot(side).is_empty() || price.is_zero() {
            return None;
        }
        let Some(volume) = Volume::from_positive(capped) else {
            debug!(
                side = %side,
                desired = desired_volume,
                capped,
                position = net_position,
                resident = %resident_volume,
                "No capacity for quote"
            );
            return None;
        };

        let order_id = ids.next_id();
        *self.slot_mut(side) = QuoteSlot::Resting {
            order_id,
            price,
            volume,
        };
        gateway.insert_order(order_id, side, price, volume, Lifespan::GoodForDay);
        ledger.record_quote(order_id, side, volume);
        info!(
            order_id = %order_id,
            side = %side,
            price = %price,
            volume = %volume,
            "Inserted quote"
        );
        Some(order_id)
    }

    /// Empty the slot holding `order_id`. Returns the side if a slot was cleared.
    pub fn clear(&mut self, order_id: OrderId) -> Option<Side> {
        for side in [Side::Sell, Side::Buy] {
            let slot = self.slot_mut(side);
            if slot.holds(order_id) {
                *slot = QuoteSlot::Empty;
                return Some(side);
            }
        }
        None
    }

    /// Lower the resident volume of the slot holding `order_id`.
    pub fn reduce_volume(&mut self, order_id: OrderId, remaining: Volume) {
        for side in [Side::Sell, Side::Buy] {
            if let QuoteSlot::Resting {
                order_id: id,
                volume,
                ..
            } = self.slot_mut(side)
            {
                if *id == order_id {
                    *volume = (*volume).min(remaining);
                    return;
                }
            }
        }
    }
}
