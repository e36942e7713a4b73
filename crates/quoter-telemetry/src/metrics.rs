//! Prometheus metrics for the quoting core.
//!
//! Covers:
//! - Quote inserts and cancels per side
//! - Hedge orders and hedged lots per side
//! - Connector events processed and order errors
//! - Net, hedge and unhedged positions
//! - Connection state and dropped out-of-order book updates
//!
//! # Panics
//!
//! Metric registration uses `unwrap()` intentionally. If registration fails,
//! it indicates a fatal configuration error (e.g., duplicate metric names)
//! that should cause an immediate crash at startup rather than silent failure.
//! These panics only occur during static initialization, never at runtime.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_gauge, register_histogram_vec, register_int_gauge,
    register_int_gauge_vec, CounterVec, Encoder, Gauge, HistogramVec, IntGauge, IntGaugeVec,
    TextEncoder,
};
use quoter_core::Side;

use crate::error::{TelemetryError, TelemetryResult};

/// Quote inserts sent to the connector.
pub static QUOTE_INSERTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "quoter_quote_inserts_total",
        "Total quote insert requests",
        &["side"]
    )
    .unwrap()
});

/// Quote cancels sent to the connector.
pub static QUOTE_CANCELS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "quoter_quote_cancels_total",
        "Total quote cancel requests",
        &["side"]
    )
    .unwrap()
});

/// Hedge orders sent.
pub static HEDGES_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "quoter_hedges_total",
        "Total hedge orders sent",
        &["side"]
    )
    .unwrap()
});

/// Lots sent on hedge orders.
pub static HEDGE_LOTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "quoter_hedge_lots_total",
        "Total lots sent on hedge orders",
        &["side"]
    )
    .unwrap()
});

/// Connector events processed.
/// Labels: event (order_book_update/trade_ticks/order_filled/...)
pub static EVENTS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "quoter_events_total",
        "Total connector events processed",
        &["event"]
    )
    .unwrap()
});

/// Time spent handling one connector event, in microseconds.
pub static DISPATCH_LATENCY_US: Lazy<HistogramVec> = Lazy::new(|| {
    register_histogram_vec!(
        "quoter_dispatch_latency_us",
        "Event handling latency in microseconds",
        &["event"],
        vec![1.0, 2.0, 5.0, 10.0, 20.0, 50.0, 100.0, 200.0, 500.0, 1000.0]
    )
    .unwrap()
});

/// Net position on the primary instrument.
pub static NET_POSITION: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("quoter_net_position", "Net position on the primary instrument")
        .unwrap()
});

/// Position sent to the hedge instrument.
pub static HEDGE_POSITION: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("quoter_hedge_position", "Hedge position sent").unwrap()
});

/// Net plus hedge position.
pub static UNHEDGED_EXPOSURE: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "quoter_unhedged_exposure",
        "Net position plus hedge position"
    )
    .unwrap()
});

/// Live order ids per role.
/// Labels: role (ask/bid/hedge)
pub static LIVE_ORDERS: Lazy<IntGaugeVec> = Lazy::new(|| {
    register_int_gauge_vec!(
        "quoter_live_orders",
        "Order ids not yet in a terminal state",
        &["role"]
    )
    .unwrap()
});

/// Out-of-order book updates dropped.
pub static STALE_BOOKS_DROPPED: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!(
        "quoter_stale_books_dropped",
        "Out-of-order book updates dropped"
    )
    .unwrap()
});

/// Execution connection state (1 = connected, 0 = disconnected).
pub static CONNECTED: Lazy<Gauge> = Lazy::new(|| {
    register_gauge!(
        "quoter_connected",
        "Execution connection state (1=connected)"
    )
    .unwrap()
});

/// Metrics facade for easy access.
pub struct Metrics;

impl Metrics {
    pub fn quote_inserted(side: Side) {
        QUOTE_INSERTS_TOTAL
            .with_label_values(&[side.as_str()])
            .inc();
    }

    pub fn quote_cancelled(side: Side) {
        QUOTE_CANCELS_TOTAL
            .with_label_values(&[side.as_str()])
            .inc();
    }

    /// Record a hedge order and its size.
    pub fn hedge_sent(side: Side, lots: u64) {
        HEDGES_TOTAL.with_label_values(&[side.as_str()]).inc();
        HEDGE_LOTS_TOTAL
            .with_label_values(&[side.as_str()])
            .inc_by(lots as f64);
    }

    /// Record a processed event and how long it took.
    pub fn event_handled(kind: &str, latency_us: f64) {
        EVENTS_TOTAL.with_label_values(&[kind]).inc();
        DISPATCH_LATENCY_US
            .with_label_values(&[kind])
            .observe(latency_us);
    }

    pub fn positions(net: i64, hedge: i64) {
        NET_POSITION.set(net);
        HEDGE_POSITION.set(hedge);
        UNHEDGED_EXPOSURE.set(net + hedge);
    }

    pub fn live_orders(asks: usize, bids: usize, hedges: usize) {
        LIVE_ORDERS.with_label_values(&["ask"]).set(asks as i64);
        LIVE_ORDERS.with_label_values(&["bid"]).set(bids as i64);
        LIVE_ORDERS.with_label_values(&["hedge"]).set(hedges as i64);
    }

    pub fn stale_books(count: u64) {
        STALE_BOOKS_DROPPED.set(count as i64);
    }

    pub fn connected(is_connected: bool) {
        CONNECTED.set(if is_connected { 1.0 } else { 0.0 });
    }

    /// Render every registered metric in the Prometheus text format.
    pub fn render() -> TelemetryResult<String> {
        let mut buffer = Vec::new();
        TextEncoder::new()
            .encode(&prometheus::gather(), &mut buffer)
            .map_err(|e| TelemetryError::Metrics(e.to_string()))?;
        String::from_utf8(buffer).map_err(|e| TelemetryError::Metrics(e.to_string()))
    }
}
