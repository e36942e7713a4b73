//! Position tracking for market making.
//!
//! Tracks the net primary position from quote fills and the hedge position
//! already sent to the hedge venue, and derives the quote sizes for the next
//! insert from the current inventory skew.

use quoter_core::{Price, Side, Volume};
use serde::Serialize;

/// Counters kept alongside the positions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FillStats {
    /// Lots bought on the primary instrument.
    pub bought: u64,
    /// Lots sold on the primary instrument.
    pub sold: u64,
    /// Number of quote fills processed.
    pub fill_count: u64,
    /// Lots sent to buy on the hedge instrument.
    pub hedge_bought: u64,
    /// Lots sent to sell on the hedge instrument.
    pub hedge_sold: u64,
    /// Cumulative fees across all quote orders (negative = rebate).
    pub fees: i64,
    /// Price of the most recent quote fill.
    pub last_fill_price: Price,
}

/// Net and hedge positions plus next-quote targets.
#[derive(Debug, Clone)]
pub struct PositionTracker {
    position_limit: i64,
    /// Primary inventory from fills (positive = long).
    net_position: i64,
    /// Hedge volume already sent (positive = bought).
    hedge_position: i64,
    next_bid_volume: i64,
    next_ask_volume: i64,
    stats: FillStats,
}

impl PositionTracker {
    /// Create a flat tracker quoting `initial_volume` on both sides until the
    /// first fill.
    pub fn new(position_limit: i64, initial_volume: i64) -> Self {
        Self {
            position_limit,
            net_position: 0,
            hedge_position: 0,
            next_bid_volume: initial_volume,
            next_ask_volume: initial_volume,
            stats: FillStats::default(),
        }
    }

    pub fn net_position(&self) -> i64 {
        self.net_position
    }

    pub fn hedge_position(&self) -> i64 {
        self.hedge_position
    }

    /// Net position plus hedge position: the risk not yet offset.
    pub fn exposure(&self) -> i64 {
        self.net_position + self.hedge_position
    }

    /// Target size for the next quote on `side`.
    pub fn next_volume(&self, side: Side) -> i64 {
        match side {
            Side::Buy => self.next_bid_volume,
            Side::Sell => self.next_ask_volume,
        }
    }

    pub fn next_bid_volume(&self) -> i64 {
        self.next_bid_volume
    }

    pub fn next_ask_volume(&self) -> i64 {
        self.next_ask_volume
    }

    pub fn stats(&self) -> &FillStats {
        &self.stats
    }

    /// Record a quote fill and recompute the next-quote targets.
    ///
    /// The targets only take effect on the next insert decision.
    pub fn apply_fill(&mut self, side: Side, price: Price, volume: Volume) {
        let lots = volume.signed();
        match side {
            Side::Buy => {
                self.net_position += lots;
                self.stats.bought += volume.lots();
            }
            Side::Sell => {
                self.net_position -= lots;
                self.stats.sold += volume.lots();
            }
        }
        self.stats.fill_count += 1;
        self.stats.last_fill_price = price;
        self.recompute_targets();
    }

    /// Record a hedge order at send time.
    pub fn apply_hedge(&mut self, side: Side, volume: Volume) {
        let lots = volume.signed();
        match side {
            Side::Buy => {
                self.hedge_position += lots;
                self.stats.hedge_bought += volume.lots();
            }
            Side::Sell => {
                self.hedge_position -= lots;
                self.stats.hedge_sold += volume.lots();
            }
        }
    }

    pub fn add_fees(&mut self, delta: i64) {
        self.stats.fees += delta;
    }

    /// The side further from flat gets the larger size, so that full fills
    /// at both targets pull the position back toward flat.
    fn recompute_targets(&mut self) {
        let room = self.position_limit - self.net_position;
        self.next_bid_volume = if self.net_position < 0 {
            div_ceil(room, 2)
        } else {
            room.div_euclid(2)
        };
        self.next_ask_volume = self.net_position + self.next_bid_volume;
    }
}

fn div_ceil(numerator: i64, denominator: i64) -> i64 {
    -((-numerator).div_euclid(denominator))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(tracker: &mut PositionTracker, side: Side, lots: u64) {
        tracker.apply_fill(side, Price::new(10_000), Volume::new(lots));
    }

    #[test]
    fn test_initial_targets() {
        let tracker = PositionTracker::new(100, 10);
        assert_eq!(tracker.net_position(), 0);
        assert_eq!(tracker.next_bid_volume(), 10);
        assert_eq!(tracker.next_ask_volume(), 10);
    }

    #[test]
    fn test_buy_fill_increases_position() {
        let mut tracker = PositionTracker::new(100, 10);
        fill(&mut tracker, Side::Buy, 6);
        assert_eq!(tracker.net_position(), 6);
        assert_eq!(tracker.stats().bought, 6);
        assert_eq!(tracker.stats().last_fill_price, Price::new(10_000));
    }

    #[test]
    fn test_sell_fill_decreases_position() {
        let mut tracker = PositionTracker::new(100, 10);
        fill(&mut tracker, Side::Sell, 4);
        assert_eq!(tracker.net_position(), -4);
        assert_eq!(tracker.stats().sold, 4);
        assert_eq!(tracker.stats().fill_count, 1);
    }

    #[test]
    fn test_targets_when_long() {
        let mut tracker = PositionTracker::new(100, 10);
        fill(&mut tracker, Side::Buy, 95);
        // floor((100 - 95) / 2) = 2, ask = 95 + 2
        assert_eq!(tracker.next_bid_volume(), 2);
        assert_eq!(tracker.next_ask_volume(), 97);
    }

    #[test]
    fn test_targets_when_short_round_up() {
        let mut tracker = PositionTracker::new(100, 10);
        fill(&mut tracker, Side::Sell, 5);
        // ceil((100 + 5) / 2) = 53, ask = -5 + 53
        assert_eq!(tracker.next_bid_volume(), 53);
        assert_eq!(tracker.next_ask_volume(), 48);
    }

    #[test]
    fn test_targets_when_flat_after_round_trip() {
        let mut tracker = PositionTracker::new(100, 10);
        fill(&mut tracker, Side::Buy, 7);
        fill(&mut tracker, Side::Sell, 7);
        assert_eq!(tracker.net_position(), 0);
        assert_eq!(tracker.next_bid_volume(), 50);
        assert_eq!(tracker.next_ask_volume(), 50);
    }

    #[test]
    fn test_targets_odd_room_when_long() {
        let mut tracker = PositionTracker::new(100, 10);
        fill(&mut tracker, Side::Buy, 3);
        // floor(97 / 2) = 48
        assert_eq!(tracker.next_bid_volume(), 48);
        assert_eq!(tracker.next_ask_volume(), 51);
    }

    #[test]
    fn test_hedge_moves_exposure_not_net() {
        let mut tracker = PositionTracker::new(100, 10);
        fill(&mut tracker, Side::Buy, 25);
        tracker.apply_hedge(Side::Sell, Volume::new(15));

        assert_eq!(tracker.net_position(), 25);
        assert_eq!(tracker.hedge_position(), -15);
        assert_eq!(tracker.exposure(), 10);
        assert_eq!(tracker.stats().hedge_sold, 15);
        // Targets are driven by the net position only
        assert_eq!(tracker.next_bid_volume(), 37);
    }

    #[test]
    fn test_div_ceil() {
        assert_eq!(div_ceil(105, 2), 53);
        assert_eq!(div_ceil(104, 2), 52);
        assert_eq!(div_ceil(-3, 2), -1);
    }

    #[test]
    fn test_fees_accumulate() {
        let mut tracker = PositionTracker::new(100, 10);
        tracker.add_fees(-3);
        tracker.add_fees(5);
        assert_eq!(tracker.stats().fees, 2);
    }
}
