//! Integer price and volume types.
//!
//! Prices are whole cents and volumes are whole lots, exactly as the
//! venue reports them. Wrapping them keeps a price from being passed where
//! a lot count is expected.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Price in cents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(pub u64);

impl Price {
    pub const ZERO: Self = Self(0);

    #[inline]
    pub fn new(cents: u64) -> Self {
        Self(cents)
    }

    #[inline]
    pub fn cents(&self) -> u64 {
        self.0
    }

    /// A zero price means the level is empty.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Round down to a multiple of `tick_size`.
    #[inline]
    pub fn round_down_to_tick(&self, tick_size: u64) -> Self {
        if tick_size == 0 {
            return *self;
        }
        Self(self.0 / tick_size * tick_size)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Price {
    fn from(cents: u64) -> Self {
        Self(cents)
    }
}

/// Volume in lots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Volume(pub u64);

impl Volume {
    pub const ZERO: Self = Self(0);

    #[inline]
    pub fn new(lots: u64) -> Self {
        Self(lots)
    }

    #[inline]
    pub fn lots(&self) -> u64 {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Lots as a signed quantity for position arithmetic.
    ///
    /// Venue volumes are bounded far below `i64::MAX`; larger values saturate.
    #[inline]
    pub fn signed(&self) -> i64 {
        i64::try_from(self.0).unwrap_or(i64::MAX)
    }

    /// Build from a signed lot count, returning `None` unless strictly positive.
    #[inline]
    pub fn from_positive(lots: i64) -> Option<Self> {
        u64::try_from(lots).ok().filter(|l| *l > 0).map(Self)
    }

    #[inline]
    pub fn saturating_sub(self, other: Volume) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl fmt::Display for Volume {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Volume {
    fn from(lots: u64) -> Self {
        Self(lots)
    }
}
