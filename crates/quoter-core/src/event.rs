//! Events delivered by the connector.
//!
//! Order identifiers are kept raw (`u64`) here because the connector uses
//! zero for errors that are not tied to any order. The strategy converts
//! them with [`OrderId::from_raw`](crate::OrderId::from_raw).

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::market::BookSnapshot;
use crate::units::{Price, Volume};

/// One inbound event from the connector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ConnectorEvent {
    /// Top-of-book snapshot for one instrument.
    OrderBookUpdate(BookSnapshot),
    /// Summary of recent trading activity. Informational only.
    TradeTicks(BookSnapshot),
    /// One of our quotes traded.
    OrderFilled {
        order_id: u64,
        price: Price,
        volume: Volume,
    },
    /// Status change of one of our quotes. Remaining volume zero is terminal.
    OrderStatus {
        order_id: u64,
        fill_volume: Volume,
        remaining_volume: Volume,
        fees: i64,
    },
    /// Rejection or failure reported by the exchange.
    Error { order_id: u64, message: String },
    /// One of our hedge orders traded.
    HedgeFilled {
        order_id: u64,
        price: Price,
        volume: Volume,
    },
    /// The execution connection dropped.
    Disconnect,
}

impl ConnectorEvent {
    /// Short label used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OrderBookUpdate(_) => "order_book_update",
            Self::TradeTicks(_) => "trade_ticks",
            Self::OrderFilled { .. } => "order_filled",
            Self::OrderStatus { .. } => "order_status",
            Self::Error { .. } => "error",
            Self::HedgeFilled { .. } => "hedge_filled",
            Self::Disconnect => "disconnect",
        }
    }
}

/// Journal record: an event stamped with monotonic milliseconds since the
/// session started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimedEvent {
    pub at_ms: u64,
    pub event: ConnectorEvent,
}

impl TimedEvent {
    /// Parse one JSON line of an event journal. `line` is 1-based and only
    /// used for error reporting.
    pub fn parse_line(text: &str, line: usize) -> Result<Self> {
        serde_json::from_str(text).map_err(|source| CoreError::Journal { line, source })
    }
}
