//! Order actions requested from the connector.
//!
//! Actions are one-way commands: the connector acknowledges each one later
//! through a fill, status, or error event.

use serde::{Deserialize, Serialize};

use crate::order::{Lifespan, OrderId, Side};
use crate::units::{Price, Volume};

/// A command the core asks the connector to carry out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OrderAction {
    /// Insert a quote on the primary instrument.
    Insert {
        order_id: OrderId,
        side: Side,
        price: Price,
        volume: Volume,
        lifespan: Lifespan,
    },
    /// Cancel a resting quote.
    Cancel { order_id: OrderId },
    /// Send an aggressive order on the hedge instrument.
    Hedge {
        order_id: OrderId,
        side: Side,
        price: Price,
        volume: Volume,
    },
}

impl OrderAction {
    /// Id the action refers to.
    pub fn order_id(&self) -> OrderId {
        match self {
            Self::Insert { order_id, .. }
            | Self::Cancel { order_id }
            | Self::Hedge { order_id, .. } => *order_id,
        }
    }

    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::Cancel { .. } => "cancel",
            Self::Hedge { .. } => "hedge",
        }
    }

    #[must_use]
    pub fn is_insert(&self) -> bool {
        matches!(self, Self::Insert { .. })
    }

    #[must_use]
    pub fn is_cancel(&self) -> bool {
        matches!(self, Self::Cancel { .. })
    }

    #[must_use]
    pub fn is_hedge(&self) -> bool {
        matches!(self, Self::Hedge { .. })
    }
}
