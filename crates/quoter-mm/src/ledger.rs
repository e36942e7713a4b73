//! Order ledger: attributes fills, statuses and errors to the order that
//! produced them.
//!
//! Every quote id lives here from the moment its insert is sent until the
//! order reaches a terminal state. That includes quotes whose cancel is
//! still in flight: they no longer occupy a quote slot, but their resident
//! volume can still fill and therefore still counts against the position
//! limit. Hedge ids are recorded separately and never occupy a slot; they
//! are fill-and-kill, so the first fill report for a hedge is terminal.

use std::collections::HashMap;

use quoter_core::{OrderId, Side, Volume};

/// What an order id was sent for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrderRole {
    /// Resting quote on the primary instrument.
    Quote(Side),
    /// Aggressive order on the hedge instrument.
    Hedge(Side),
}

/// A live ledger entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub role: OrderRole,
    /// Quotes: volume that can still trade. Hedges: requested volume.
    pub resident: Volume,
    /// Latest cumulative fees reported for this order.
    pub fees: i64,
}

/// Result of applying a hedge fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HedgeFillOutcome {
    pub side: Side,
    /// Requested volume the venue killed instead of filling.
    pub unfilled: Volume,
}

/// Tracks every live order id and its role.
#[derive(Debug, Default)]
pub struct OrderLedger {
    entries: HashMap<OrderId, LedgerEntry>,
}

impl OrderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a quote insert.
    pub fn record_quote(&mut self, order_id: OrderId, side: Side, volume: Volume) {
        self.entries.insert(
            order_id,
            LedgerEntry {
                role: OrderRole::Quote(side),
                resident: volume,
                fees: 0,
            },
        );
    }

    /// Record a hedge order.
    pub fn record_hedge(&mut self, order_id: OrderId, side: Side, volume: Volume) {
        self.entries.insert(
            order_id,
            LedgerEntry {
                role: OrderRole::Hedge(side),
                resident: volume,
                fees: 0,
            },
        );
    }

    pub fn get(&self, order_id: OrderId) -> Option<&LedgerEntry> {
        self.entries.get(&order_id)
    }

    pub fn role(&self, order_id: OrderId) -> Option<OrderRole> {
        self.entries.get(&order_id).map(|e| e.role)
    }

    /// Side of a live quote, `None` for hedges and unknown ids.
    pub fn quote_side(&self, order_id: OrderId) -> Option<Side> {
        match self.role(order_id) {
            Some(OrderRole::Quote(side)) => Some(side),
            _ => None,
        }
    }

    pub fn contains(&self, order_id: OrderId) -> bool {
        self.entries.contains_key(&order_id)
    }

    /// Volume on one side that could still trade: resting quotes plus
    /// quotes with a cancel in flight.
    pub fn resident_volume(&self, side: Side) -> Volume {
        Volume::new(
            self.entries
                .values()
                .filter(|e| e.role == OrderRole::Quote(side))
                .map(|e| e.resident.lots())
                .sum(),
        )
    }

    /// Lower a quote's resident volume to `remaining`. Never raises it.
    pub fn reduce_resident(&mut self, order_id: OrderId, remaining: Volume) {
        if let Some(entry) = self.entries.get_mut(&order_id) {
            entry.resident = entry.resident.min(remaining);
        }
    }

    /// Store the latest cumulative fees for an order and return the change
    /// since the previous report.
    pub fn update_fees(&mut self, order_id: OrderId, fees: i64) -> i64 {
        match self.entries.get_mut(&order_id) {
            Some(entry) => {
                let delta = fees - entry.fees;
                entry.fees = fees;
                delta
            }
            None => 0,
        }
    }

    /// Apply a hedge fill and drop the entry. Nothing of a hedge rests
    /// after its fill report, even a partial one.
    pub fn record_hedge_fill(
        &mut self,
        order_id: OrderId,
        volume: Volume,
    ) -> Option<HedgeFillOutcome> {
        let OrderRole::Hedge(side) = self.entries.get(&order_id)?.role else {
            return None;
        };
        let entry = self.entries.remove(&order_id)?;
        Some(HedgeFillOutcome {
            side,
            unfilled: entry.resident.saturating_sub(volume),
        })
    }

    /// Drop an id that reached a terminal state.
    pub fn remove(&mut self, order_id: OrderId) -> Option<LedgerEntry> {
        self.entries.remove(&order_id)
    }

    /// Number of live quote ids on one side.
    pub fn quote_count(&self, side: Side) -> usize {
        self.entries
            .values()
            .filter(|e| e.role == OrderRole::Quote(side))
            .count()
    }

    /// Number of hedge ids still awaiting fills.
    pub fn hedge_count(&self) -> usize {
        self.entries
            .values()
            .filter(|e| matches!(e.role, OrderRole::Hedge(_)))
            .count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
