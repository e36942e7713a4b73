//! Trader configuration.
//!
//! All limits are fixed for the lifetime of an `AutoTrader`: they are read
//! once at construction and never reconfigured while events are flowing.

use quoter_core::{CoreError, Price, Result};
use serde::{Deserialize, Serialize};

/// Maximum absolute primary position, in lots.
pub const POSITION_LIMIT: i64 = 100;
/// Price increment, in cents.
pub const TICK_SIZE_IN_CENTS: u64 = 100;
/// Unhedged lots tolerated before the hedge window starts counting.
pub const MAX_UNHEDGED_LOTS: i64 = 10;
/// How long exposure may stay over tolerance before a hedge is sent.
pub const UNHEDGED_LOTS_TIME_LIMIT_MS: u64 = 57_500;
/// Quote size on both sides before the first fill.
pub const INITIAL_QUOTE_VOLUME: i64 = 10;
/// Lowest bid price the venue accepts, in cents.
pub const MINIMUM_BID: u64 = 1;
/// Highest ask price the venue accepts, in cents.
pub const MAXIMUM_ASK: u64 = 2_147_483_647;

/// Limits and constants for one trading session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraderConfig {
    /// Position cap per side in lots.
    #[serde(default = "default_position_limit")]
    pub position_limit: i64,

    /// Tick size in cents.
    #[serde(default = "default_tick_size")]
    pub tick_size: u64,

    /// Tolerated unhedged lots.
    #[serde(default = "default_max_unhedged_lots")]
    pub max_unhedged_lots: i64,

    /// Continuous over-exposure (ms) that triggers a hedge.
    #[serde(default = "default_unhedged_time_limit_ms")]
    pub unhedged_time_limit_ms: u64,

    /// Bid/ask target volume until the first fill.
    #[serde(default = "default_initial_quote_volume")]
    pub initial_quote_volume: i64,

    /// Venue minimum acceptable bid price.
    #[serde(default = "default_minimum_bid")]
    pub minimum_bid: u64,

    /// Venue maximum acceptable ask price.
    #[serde(default = "default_maximum_ask")]
    pub maximum_ask: u64,
}

impl Default for TraderConfig {
    fn default() -> Self {
        Self {
            position_limit: default_position_limit(),
            tick_size: default_tick_size(),
            max_unhedged_lots: default_max_unhedged_lots(),
            unhedged_time_limit_ms: default_unhedged_time_limit_ms(),
            initial_quote_volume: default_initial_quote_volume(),
            minimum_bid: default_minimum_bid(),
            maximum_ask: default_maximum_ask(),
        }
    }
}

impl TraderConfig {
    /// Check the limits are usable.
    pub fn validate(&self) -> Result<()> {
        if self.tick_size == 0 {
            return Err(CoreError::InvalidConfig("tick_size must be > 0".into()));
        }
        if self.position_limit <= 0 {
            return Err(CoreError::InvalidConfig(format!(
                "position_limit must be > 0, got {}",
                self.position_limit
            )));
        }
        if self.max_unhedged_lots < 0 {
            return Err(CoreError::InvalidConfig(format!(
                "max_unhedged_lots must be >= 0, got {}",
                self.max_unhedged_lots
            )));
        }
        if self.initial_quote_volume <= 0 || self.initial_quote_volume > self.position_limit {
            return Err(CoreError::InvalidConfig(format!(
                "initial_quote_volume must be in 1..={}, got {}",
                self.position_limit, self.initial_quote_volume
            )));
        }
        if self.minimum_bid >= self.maximum_ask {
            return Err(CoreError::InvalidConfig(format!(
                "minimum_bid ({}) must be below maximum_ask ({})",
                self.minimum_bid, self.maximum_ask
            )));
        }
        Ok(())
    }

    /// Sell-hedge price: the lowest on-tick price the venue accepts for a bid.
    pub fn min_bid_nearest_tick(&self) -> Price {
        Price::new(self.minimum_bid + self.tick_size).round_down_to_tick(self.tick_size)
    }

    /// Buy-hedge price: the highest on-tick price the venue accepts for an ask.
    pub fn max_ask_nearest_tick(&self) -> Price {
        Price::new(self.maximum_ask).round_down_to_tick(self.tick_size)
    }

    pub fn unhedged_time_limit(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.unhedged_time_limit_ms)
    }
}

fn default_position_limit() -> i64 {
    POSITION_LIMIT
}
fn default_tick_size() -> u64 {
    TICK_SIZE_IN_CENTS
}
fn default_max_unhedged_lots() -> i64 {
    MAX_UNHEDGED_LOTS
}
fn default_unhedged_time_limit_ms() -> u64 {
    UNHEDGED_LOTS_TIME_LIMIT_MS
}
fn default_initial_quote_volume() -> i64 {
    INITIAL_QUOTE_VOLUME
}
fn default_minimum_bid() -> u64 {
    MINIMUM_BID
}
fn default_maximum_ask() -> u64 {
    MAXIMUM_ASK
}
