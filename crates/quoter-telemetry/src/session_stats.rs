//! Session summary built from the collected metrics.
//!
//! Reads the counters back from the registry at the end of a session
//! (or on demand) and logs one structured summary line.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use crate::metrics::{
    HEDGES_TOTAL, HEDGE_LOTS_TOTAL, HEDGE_POSITION, NET_POSITION, QUOTE_CANCELS_TOTAL,
    QUOTE_INSERTS_TOTAL, STALE_BOOKS_DROPPED,
};

/// Activity counters for one session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStats {
    pub started_at: DateTime<Utc>,
    pub duration_secs: i64,
    pub ask_inserts: u64,
    pub bid_inserts: u64,
    pub ask_cancels: u64,
    pub bid_cancels: u64,
    pub hedges: u64,
    pub hedged_lots: u64,
    pub net_position: i64,
    pub hedge_position: i64,
    pub stale_books_dropped: i64,
}

/// Session statistics reporter.
///
/// Counters are process-wide, so the reporter remembers their values at
/// creation and reports the difference.
pub struct SessionReporter {
    start_time: DateTime<Utc>,
    baseline: Counters,
}

#[derive(Debug, Clone, Copy, Default)]
struct Counters {
    ask_inserts: u64,
    bid_inserts: u64,
    ask_cancels: u64,
    bid_cancels: u64,
    hedges: u64,
    hedged_lots: u64,
}

impl Counters {
    fn read() -> Self {
        Self {
            ask_inserts: counter_value(&QUOTE_INSERTS_TOTAL, "sell"),
            bid_inserts: counter_value(&QUOTE_INSERTS_TOTAL, "buy"),
            ask_cancels: counter_value(&QUOTE_CANCELS_TOTAL, "sell"),
            bid_cancels: counter_value(&QUOTE_CANCELS_TOTAL, "buy"),
            hedges: counter_value(&HEDGES_TOTAL, "sell") + counter_value(&HEDGES_TOTAL, "buy"),
            hedged_lots: counter_value(&HEDGE_LOTS_TOTAL, "sell")
                + counter_value(&HEDGE_LOTS_TOTAL, "buy"),
        }
    }
}

fn counter_value(counter: &prometheus::CounterVec, side: &str) -> u64 {
    counter.with_label_values(&[side]).get() as u64
}

impl SessionReporter {
    pub fn new() -> Self {
        Self {
            start_time: Utc::now(),
            baseline: Counters::read(),
        }
    }

    pub fn start_time(&self) -> DateTime<Utc> {
        self.start_time
    }

    /// Current statistics since the reporter was created.
    pub fn stats(&self) -> SessionStats {
        let now = Counters::read();
        let base = self.baseline;
        SessionStats {
            started_at: self.start_time,
            duration_secs: (Utc::now() - self.start_time).num_seconds(),
            ask_inserts: now.ask_inserts - base.ask_inserts,
            bid_inserts: now.bid_inserts - base.bid_inserts,
            ask_cancels: now.ask_cancels - base.ask_cancels,
            bid_cancels: now.bid_cancels - base.bid_cancels,
            hedges: now.hedges - base.hedges,
            hedged_lots: now.hedged_lots - base.hedged_lots,
            net_position: NET_POSITION.get(),
            hedge_position: HEDGE_POSITION.get(),
            stale_books_dropped: STALE_BOOKS_DROPPED.get(),
        }
    }

    /// Log the session summary.
    pub fn log_summary(&self) -> SessionStats {
        let stats = self.stats();
        info!(
            started_at = %stats.started_at.to_rfc3339(),
            duration_secs = stats.duration_secs,
            ask_inserts = stats.ask_inserts,
            bid_inserts = stats.bid_inserts,
            ask_cancels = stats.ask_cancels,
            bid_cancels = stats.bid_cancels,
            hedges = stats.hedges,
            hedged_lots = stats.hedged_lots,
            net_position = stats.net_position,
            hedge_position = stats.hedge_position,
            stale_books_dropped = stats.stale_books_dropped,
            "Session summary"
        );
        stats
    }
}

impl Default for SessionReporter {
    fn default() -> Self {
        Self::new()
    }
}
