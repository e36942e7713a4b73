//! Market making decision core.
//!
//! Quotes one primary instrument on both sides and flattens excess exposure
//! on a correlated hedge instrument:
//! - Quote lifecycle management (cancel stale, insert capped)
//! - Position tracking with skewed next-quote sizes
//! - Timed hedging of unhedged exposure
//! - Order ledger for attributing connector events
//!
//! # Architecture
//!
//! ```text
//! Connector event → AutoTrader.handle_event()
//!                    ├─ QuoteManager: cancel/insert per side
//!                    ├─ PositionTracker: net/hedge position, next sizes
//!                    ├─ Hedger: exposure window, hedge plan
//!                    └─ OrderLedger: live ids, pending cancels, fees
//!                         ↓
//!                    OrderGateway (insert / cancel / hedge)
//! ```

pub mod config;
pub mod gateway;
pub mod hedger;
pub mod inventory;
pub mod ledger;
pub mod quote_manager;
pub mod trader;

pub use config::TraderConfig;
pub use gateway::{OrderGateway, RecordingGateway};
pub use hedger::{HedgePlan, HedgeState, Hedger};
pub use inventory::{FillStats, PositionTracker};
pub use ledger::{LedgerEntry, OrderLedger, OrderRole};
pub use quote_manager::{capped_volume, InsertRequest, QuoteManager, QuoteSlot};
pub use trader::{AutoTrader, TraderSnapshot};
