//! Core domain types for the quoting and hedging core.
//!
//! This crate provides fundamental types used throughout the workspace:
//! - `Instrument`: the quoted primary instrument and its hedge instrument
//! - `Price`, `Volume`: integer cents and lots
//! - `OrderId`, `OrderIdAllocator`: non-zero, never-reused client order ids
//! - `BookSnapshot`, `ConnectorEvent`: inputs delivered by the connector
//! - `OrderAction`: commands requested from the connector

pub mod error;
pub mod event;
pub mod execution;
pub mod market;
pub mod order;
pub mod units;

pub use error::{CoreError, Result};
pub use event::{ConnectorEvent, TimedEvent};
pub use execution::OrderAction;
pub use market::{BookSnapshot, Instrument, TOP_LEVEL_COUNT};
pub use order::{Lifespan, OrderId, OrderIdAllocator, Side};
pub use units::{Price, Volume};
