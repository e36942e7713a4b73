//! Order-related types and identifiers.
//!
//! Provides order side, lifespan, and client order id types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Buy,
    Sell,
}

impl Side {
    /// Returns the opposite side.
    pub fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }

    /// Returns 1 for buy, -1 for sell (for position calculations).
    pub fn sign(&self) -> i64 {
        match self {
            Self::Buy => 1,
            Self::Sell => -1,
        }
    }

    /// Label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How long an inserted order may rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifespan {
    /// Fill what crosses immediately, cancel the rest.
    FillAndKill,
    /// Rest until filled, cancelled, or the session ends.
    #[default]
    GoodForDay,
}

impl fmt::Display for Lifespan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FillAndKill => write!(f, "fak"),
            Self::GoodForDay => write!(f, "gfd"),
        }
    }
}

/// Client order id.
///
/// Zero is reserved by the connector to mean "no order", so a valid id is
/// never zero. Absence is expressed with `Option<OrderId>` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(NonZeroU64);

impl OrderId {
    /// Convert a raw connector id. Returns `None` for zero.
    pub fn from_raw(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    pub fn get(&self) -> u64 {
        self.0.get()
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Allocates client order ids from a single increasing counter.
///
/// Quote and hedge orders draw from the same counter, so an id is never
/// handed out twice for the lifetime of the allocator.
#[derive(Debug, Clone)]
pub struct OrderIdAllocator {
    next: NonZeroU64,
}

impl Default for OrderIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderIdAllocator {
    /// Start allocating at 1.
    pub fn new() -> Self {
        Self {
            next: NonZeroU64::MIN,
        }
    }

    /// Hand out the next id.
    ///
    /// # Panics
    ///
    /// Panics if the `u64` id space is exhausted.
    pub fn next_id(&mut self) -> OrderId {
        let id = OrderId(self.next);
        self.next = self
            .next
            .checked_add(1)
            .expect("client order id space exhausted");
        id
    }

    /// The id the next call to `next_id` will return.
    pub fn peek(&self) -> OrderId {
        OrderId(self.next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_opposite() {
        assert_eq!(Side::Buy.opposite(), Side::Sell);
        assert_eq!(Side::Sell.opposite(), Side::Buy);
    }

    #[test]
    fn test_side_sign() {
        assert_eq!(Side::Buy.sign(), 1);
        assert_eq!(Side::Sell.sign(), -1);
    }

    #[test]
    fn test_order_id_zero_is_none() {
        assert!(OrderId::from_raw(0).is_none());
        assert_eq!(OrderId::from_raw(7).map(|id| id.get()), Some(7));
    }

    #[test]
    fn test_allocator_monotonic() {
        let mut ids = OrderIdAllocator::new();
        assert_eq!(ids.peek().get(), 1);
        let a = ids.next_id();
        let b = ids.next_id();
        let c = ids.next_id();
        assert_eq!((a.get(), b.get(), c.get()), (1, 2, 3));
        assert!(a < b && b < c);
    }

    #[test]
    fn test_lifespan_default_is_good_for_day() {
        assert_eq!(Lifespan::default(), Lifespan::GoodForDay);
        let json = serde_json::to_string(&Lifespan::GoodForDay).unwrap();
        assert_eq!(json, "\"good_for_day\"");
    }
}
