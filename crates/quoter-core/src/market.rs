//! Instruments and top-of-book snapshots.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::units::{Price, Volume};

/// Number of price levels per side in every book or trade-tick snapshot.
pub const TOP_LEVEL_COUNT: usize = 5;

/// The two instruments the core knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Instrument {
    /// Primary instrument: two-sided quotes rest here.
    Future,
    /// Secondary instrument: only used to hedge inventory.
    Etf,
}

impl Instrument {
    /// Whether this is the quoted instrument.
    pub fn is_primary(&self) -> bool {
        matches!(self, Self::Future)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Future => "future",
            Self::Etf => "etf",
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed-depth snapshot of one instrument.
///
/// Index 0 is the best level. Missing levels are reported as zero price and
/// zero volume. The same shape carries order-book updates and trade ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookSnapshot {
    pub instrument: Instrument,
    pub sequence_number: u64,
    pub ask_prices: [Price; TOP_LEVEL_COUNT],
    pub ask_volumes: [Volume; TOP_LEVEL_COUNT],
    pub bid_prices: [Price; TOP_LEVEL_COUNT],
    pub bid_volumes: [Volume; TOP_LEVEL_COUNT],
}

impl BookSnapshot {
    /// Snapshot with only the top level populated.
    pub fn top_of_book(
        instrument: Instrument,
        sequence_number: u64,
        best_ask: Price,
        best_ask_volume: Volume,
        best_bid: Price,
        best_bid_volume: Volume,
    ) -> Self {
        let mut snapshot = Self::empty(instrument, sequence_number);
        snapshot.ask_prices[0] = best_ask;
        snapshot.ask_volumes[0] = best_ask_volume;
        snapshot.bid_prices[0] = best_bid;
        snapshot.bid_volumes[0] = best_bid_volume;
        snapshot
    }

    /// Snapshot with every level empty.
    pub fn empty(instrument: Instrument, sequence_number: u64) -> Self {
        Self {
            instrument,
            sequence_number,
            ask_prices: [Price::ZERO; TOP_LEVEL_COUNT],
            ask_volumes: [Volume::ZERO; TOP_LEVEL_COUNT],
            bid_prices: [Price::ZERO; TOP_LEVEL_COUNT],
            bid_volumes: [Volume::ZERO; TOP_LEVEL_COUNT],
        }
    }

    /// Best ask price (zero when the ask side is empty).
    pub fn best_ask(&self) -> Price {
        self.ask_prices[0]
    }

    /// Best bid price (zero when the bid side is empty).
    pub fn best_bid(&self) -> Price {
        self.bid_prices[0]
    }

    pub fn best_ask_volume(&self) -> Volume {
        self.ask_volumes[0]
    }

    pub fn best_bid_volume(&self) -> Volume {
        self.bid_volumes[0]
    }
}
