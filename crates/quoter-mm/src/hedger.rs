//! Hedge timing over unhedged exposure.
//!
//! Exposure (net position plus hedge position) may sit outside tolerance
//! for at most the configured window. The window only measures continuous
//! over-exposure: it restarts whenever exposure is back within tolerance,
//! and again after every hedge sent.

use std::time::{Duration, Instant};

use quoter_core::{Price, Side, Volume};
use serde::Serialize;
use tracing::{debug, warn};

/// Where the exposure stands relative to tolerance.
///
/// Sending a hedge is momentary: it happens inside `evaluate`, which then
/// settles on one of these two states from the post-hedge exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HedgeState {
    WithinTolerance,
    OverExposedTiming,
}

/// A hedge order the trader should send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HedgePlan {
    pub side: Side,
    pub price: Price,
    pub volume: Volume,
}

/// Decides when accumulated exposure must be flattened on the hedge venue.
#[derive(Debug, Clone)]
pub struct Hedger {
    max_unhedged_lots: i64,
    time_limit: Duration,
    /// Aggressive sell price (venue minimum bid on tick).
    sell_price: Price,
    /// Aggressive buy price (venue maximum ask on tick).
    buy_price: Price,
    window_start: Instant,
    state: HedgeState,
    hedges_sent: u64,
}

impl Hedger {
    pub fn new(
        max_unhedged_lots: i64,
        time_limit: Duration,
        sell_price: Price,
        buy_price: Price,
        now: Instant,
    ) -> Self {
        Self {
            max_unhedged_lots: max_unhedged_lots.max(0),
            time_limit,
            sell_price,
            buy_price,
            window_start: now,
            state: HedgeState::WithinTolerance,
            hedges_sent: 0,
        }
    }

    pub fn state(&self) -> HedgeState {
        self.state
    }

    pub fn window_start(&self) -> Instant {
        self.window_start
    }

    /// Time spent in the current window.
    pub fn elapsed(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.window_start)
    }

    pub fn hedges_sent(&self) -> u64 {
        self.hedges_sent
    }

    /// Evaluate the exposure after a primary book update.
    ///
    /// Returns a hedge to send once exposure has been over tolerance for the
    /// whole window. The hedge brings exposure back to the tolerance edge.
    pub fn evaluate(&mut self, now: Instant, exposure: i64) -> Option<HedgePlan> {
        if exposure.abs() <= self.max_unhedged_lots {
            self.state = HedgeState::WithinTolerance;
            self.window_start = now;
            return None;
        }

        self.state = HedgeState::OverExposedTiming;
        let elapsed = self.elapsed(now);
        if elapsed < self.time_limit {
            debug!(
                exposure,
                elapsed_ms = elapsed.as_millis() as u64,
                "Over-exposed, hedge window running"
            );
            return None;
        }

        // |exposure| > max_unhedged_lots >= 0 here, so the excess is positive
        let volume =
            Volume::new(exposure.unsigned_abs() - self.max_unhedged_lots.unsigned_abs());
        let plan = if exposure > 0 {
            HedgePlan {
                side: Side::Sell,
                price: self.sell_price,
                volume,
            }
        } else {
            HedgePlan {
                side: Side::Buy,
                price: self.buy_price,
                volume,
            }
        };

        self.window_start = now;
        self.hedges_sent += 1;
        let post_exposure = exposure + plan.side.sign() * plan.volume.signed();
        self.state = if post_exposure.abs() <= self.max_unhedged_lots {
            HedgeState::WithinTolerance
        } else {
            HedgeState::OverExposedTiming
        };
        warn!(
            exposure,
            post_exposure,
            side = %plan.side,
            volume = %plan.volume,
            elapsed_ms = elapsed.as_millis() as u64,
            "Unhedged exposure over limit for too long, hedging"
        );
        Some(plan)
    }
}
