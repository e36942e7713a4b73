//! Event dispatch for the quoting and hedging core.
//!
//! # Architecture
//!
//! ```text
//! ConnectorEvent → AutoTrader::handle_event()
//!     ├─ order book (primary) → QuoteManager: cancel stale, insert (ask, then bid)
//!     │                       → Hedger: evaluate exposure, maybe hedge
//!     ├─ order filled         → PositionTracker: position + next targets
//!     ├─ order status / error → QuoteManager + OrderLedger: partial or terminal
//!     └─ hedge filled         → OrderLedger: hedge id retired
//!                                   ↓
//!                          OrderGateway (insert / cancel / hedge)
//! ```
//!
//! Handlers run to completion one at a time and never block. Each field of
//! `AutoTrader` has exactly one writer:
//! - `quotes`: slot occupancy, written by book updates, statuses and errors
//! - `position`: positions and targets, written by fills and hedges sent
//! - `hedger`: the hedge window, written by primary book updates
//! - `ledger`: live order ids, written on insert, hedge, and terminal events
//! - `ids`: the id counter, written on insert and hedge

use std::collections::HashMap;
use std::time::Instant;

use quoter_core::{
    BookSnapshot, ConnectorEvent, Instrument, OrderId, OrderIdAllocator, Price, Result, Side,
    Volume,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::TraderConfig;
use crate::gateway::OrderGateway;
use crate::hedger::{HedgeState, Hedger};
use crate::inventory::{FillStats, PositionTracker};
use crate::ledger::{OrderLedger, OrderRole};
use crate::quote_manager::{InsertRequest, QuoteManager, QuoteSlot};

/// Remembers the last sequence number per instrument.
#[derive(Debug, Default)]
struct SequenceGate {
    last: HashMap<Instrument, u64>,
}

impl SequenceGate {
    /// Accept `sequence` if it is newer than anything seen for `instrument`.
    fn accept(&mut self, instrument: Instrument, sequence: u64) -> bool {
        match self.last.get(&instrument) {
            Some(&last) if sequence <= last => false,
            _ => {
                self.last.insert(instrument, sequence);
                true
            }
        }
    }

    /// Forget every instrument; the next sequence number is accepted as is.
    fn reset(&mut self) {
        self.last.clear();
    }
}

/// Point-in-time view of the trader, for logging and reporting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TraderSnapshot {
    pub ask: QuoteSlot,
    pub bid: QuoteSlot,
    pub net_position: i64,
    pub hedge_position: i64,
    pub exposure: i64,
    pub next_ask_volume: i64,
    pub next_bid_volume: i64,
    pub hedge_state: HedgeState,
    pub hedges_sent: u64,
    pub live_ask_orders: usize,
    pub live_bid_orders: usize,
    pub live_hedge_orders: usize,
    pub stale_books_dropped: u64,
    pub connected: bool,
    pub stats: FillStats,
}

/// Quoting and hedging state machine for one primary/hedge instrument pair.
#[derive(Debug)]
pub struct AutoTrader {
    config: TraderConfig,
    ids: OrderIdAllocator,
    quotes: QuoteManager,
    position: PositionTracker,
    hedger: Hedger,
    ledger: OrderLedger,
    book_sequence: SequenceGate,
    tick_sequence: SequenceGate,
    stale_books_dropped: u64,
    connected: bool,
}

impl AutoTrader {
    /// Create a trader with empty slots and a flat position.
    ///
    /// `now` starts the hedge window.
    pub fn new(config: TraderConfig, now: Instant) -> Result<Self> {
        config.validate()?;
        let hedger = Hedger::new(
            config.max_unhedged_lots,
            config.unhedged_time_limit(),
            config.min_bid_nearest_tick(),
            config.max_ask_nearest_tick(),
            now,
        );
        let position = PositionTracker::new(config.position_limit, config.initial_quote_volume);
        Ok(Self {
            config,
            ids: OrderIdAllocator::new(),
            quotes: QuoteManager::new(),
            position,
            hedger,
            ledger: OrderLedger::new(),
            book_sequence: SequenceGate::default(),
            tick_sequence: SequenceGate::default(),
            stale_books_dropped: 0,
            connected: true,
        })
    }

    pub fn config(&self) -> &TraderConfig {
        &self.config
    }

    pub fn quotes(&self) -> &QuoteManager {
        &self.quotes
    }

    pub fn position(&self) -> &PositionTracker {
        &self.position
    }

    pub fn hedger(&self) -> &Hedger {
        &self.hedger
    }

    pub fn ledger(&self) -> &OrderLedger {
        &self.ledger
    }

    pub fn is_connected(&self) -> bool {
        self.connected
    }

    pub fn snapshot(&self) -> TraderSnapshot {
        TraderSnapshot {
            ask: *self.quotes.ask(),
            bid: *self.quotes.bid(),
            net_position: self.position.net_position(),
            hedge_position: self.position.hedge_position(),
            exposure: self.position.exposure(),
            next_ask_volume: self.position.next_ask_volume(),
            next_bid_volume: self.position.next_bid_volume(),
            hedge_state: self.hedger.state(),
            hedges_sent: self.hedger.hedges_sent(),
            live_ask_orders: self.ledger.quote_count(Side::Sell),
            live_bid_orders: self.ledger.quote_count(Side::Buy),
            live_hedge_orders: self.ledger.hedge_count(),
            stale_books_dropped: self.stale_books_dropped,
            connected: self.connected,
            stats: *self.position.stats(),
        }
    }

    /// Dispatch one connector event.
    pub fn handle_event<G: OrderGateway>(
        &mut self,
        gateway: &mut G,
        now: Instant,
        event: &ConnectorEvent,
    ) {
        match event {
            ConnectorEvent::OrderBookUpdate(book) => self.on_order_book_update(gateway, now, book),
            ConnectorEvent::TradeTicks(ticks) => self.on_trade_ticks(ticks),
            ConnectorEvent::OrderFilled {
                order_id,
                price,
                volume,
            } => self.on_order_filled(*order_id, *price, *volume),
            ConnectorEvent::OrderStatus {
                order_id,
                fill_volume,
                remaining_volume,
                fees,
            } => self.on_order_status(*order_id, *fill_volume, *remaining_volume, *fees),
            ConnectorEvent::Error { order_id, message } => self.on_error(*order_id, message),
            ConnectorEvent::HedgeFilled {
                order_id,
                price,
                volume,
            } => self.on_hedge_filled(*order_id, *price, *volume),
            ConnectorEvent::Disconnect => self.on_disconnect(),
        }
    }

    /// Re-quote on primary book updates and check the hedge window.
    pub fn on_order_book_update<G: OrderGateway>(
        &mut self,
        gateway: &mut G,
        now: Instant,
        book: &BookSnapshot,
    ) {
        debug!(
            instrument = %book.instrument,
            sequence = book.sequence_number,
            ask_price = %book.best_ask(),
            ask_volume = %book.best_ask_volume(),
            bid_price = %book.best_bid(),
            bid_volume = %book.best_bid_volume(),
            "Order book update"
        );

        if !self
            .book_sequence
            .accept(book.instrument, book.sequence_number)
        {
            self.stale_books_dropped += 1;
            debug!(
                instrument = %book.instrument,
                sequence = book.sequence_number,
                "Dropping out-of-order book update"
            );
            return;
        }

        if !book.instrument.is_primary() {
            return;
        }

        self.requote_side(gateway, Side::Sell, book.best_ask());
        self.requote_side(gateway, Side::Buy, book.best_bid());

        let exposure = self.position.exposure();
        if let Some(plan) = self.hedger.evaluate(now, exposure) {
            let order_id = self.ids.next_id();
            gateway.send_hedge_order(order_id, plan.side, plan.price, plan.volume);
            self.ledger.record_hedge(order_id, plan.side, plan.volume);
            self.position.apply_hedge(plan.side, plan.volume);
            info!(
                order_id = %order_id,
                side = %plan.side,
                price = %plan.price,
                volume = %plan.volume,
                hedge_position = self.position.hedge_position(),
                "Sent hedge order"
            );
        }
    }

    /// Cancel-then-insert for one side.
    fn requote_side<G: OrderGateway>(&mut self, gateway: &mut G, side: Side, top: Price) {
        self.quotes.cancel_stale(side, top, gateway);
        let request = InsertRequest {
            side,
            price: top,
            desired_volume: self.position.next_volume(side),
            net_position: self.position.net_position(),
            position_limit: self.config.position_limit,
            resident_volume: self.ledger.resident_volume(side),
        };
        self.quotes
            .insert(request, &mut self.ids, &mut self.ledger, gateway);
    }

    /// Trade ticks are informational.
    pub fn on_trade_ticks(&mut self, ticks: &BookSnapshot) {
        if !self
            .tick_sequence
            .accept(ticks.instrument, ticks.sequence_number)
        {
            debug!(
                instrument = %ticks.instrument,
                sequence = ticks.sequence_number,
                "Out-of-order trade ticks"
            );
            return;
        }
        debug!(
            instrument = %ticks.instrument,
            sequence = ticks.sequence_number,
            ask_price = %ticks.best_ask(),
            ask_volume = %ticks.best_ask_volume(),
            bid_price = %ticks.best_bid(),
            bid_volume = %ticks.best_bid_volume(),
            "Trade ticks"
        );
    }

    /// Apply a quote fill to the position.
    pub fn on_order_filled(&mut self, order_id: u64, price: Price, volume: Volume) {
        let Some(side) = OrderId::from_raw(order_id).and_then(|id| self.ledger.quote_side(id))
        else {
            debug!(order_id, price = %price, volume = %volume, "Fill for untracked order");
            return;
        };

        self.position.apply_fill(side, price, volume);
        info!(
            order_id,
            side = %side,
            price = %price,
            volume = %volume,
            position = self.position.net_position(),
            next_ask = self.position.next_ask_volume(),
            next_bid = self.position.next_bid_volume(),
            "Quote filled"
        );
    }

    /// Track partial fills and terminal states of quotes.
    pub fn on_order_status(
        &mut self,
        order_id: u64,
        fill_volume: Volume,
        remaining_volume: Volume,
        fees: i64,
    ) {
        let tracked = OrderId::from_raw(order_id).filter(|id| self.ledger.quote_side(*id).is_some());
        let Some(id) = tracked else {
            debug!(
                order_id,
                fill_volume = %fill_volume,
                remaining_volume = %remaining_volume,
                "Status for untracked order"
            );
            return;
        };

        let fee_delta = self.ledger.update_fees(id, fees);
        self.position.add_fees(fee_delta);
        self.apply_status(id, fill_volume, remaining_volume);
    }

    fn apply_status(&mut self, id: OrderId, fill_volume: Volume, remaining_volume: Volume) {
        if remaining_volume.is_zero() {
            let cleared = self.quotes.clear(id);
            self.ledger.remove(id);
            info!(
                order_id = %id,
                fill_volume = %fill_volume,
                slot_cleared = cleared.is_some(),
                "Quote reached terminal state"
            );
        } else if !fill_volume.is_zero() {
            self.quotes.reduce_volume(id, remaining_volume);
            self.ledger.reduce_resident(id, remaining_volume);
            debug!(
                order_id = %id,
                fill_volume = %fill_volume,
                remaining_volume = %remaining_volume,
                "Quote partially filled"
            );
        }
    }

    /// A rejected or failed quote is cleared as if fully cancelled.
    pub fn on_error(&mut self, order_id: u64, message: &str) {
        let id = OrderId::from_raw(order_id);
        match id.and_then(|id| self.ledger.role(id).map(|role| (id, role))) {
            Some((id, OrderRole::Quote(side))) => {
                warn!(order_id, side = %side, message, "Quote order error, clearing slot");
                self.apply_status(id, Volume::ZERO, Volume::ZERO);
            }
            Some((id, OrderRole::Hedge(side))) => {
                // Position was booked at send time and is left as is
                warn!(order_id, side = %side, message, "Hedge order error");
                self.ledger.remove(id);
            }
            None => {
                warn!(order_id, message, "Error for untracked order");
            }
        }
    }

    /// Hedge fills only update bookkeeping; the hedge position was booked at send.
    pub fn on_hedge_filled(&mut self, order_id: u64, price: Price, volume: Volume) {
        let outcome = OrderId::from_raw(order_id)
            .and_then(|id| self.ledger.record_hedge_fill(id, volume));
        match outcome {
            Some(outcome) => info!(
                order_id,
                side = %outcome.side,
                price = %price,
                volume = %volume,
                unfilled = %outcome.unfilled,
                "Hedge order filled"
            ),
            None => debug!(order_id, price = %price, volume = %volume, "Fill for untracked hedge"),
        }
    }

    /// No reconciliation is attempted; recovery belongs to the connector.
    /// A new session may restart sequence numbering, so the gates are reset.
    pub fn on_disconnect(&mut self) {
        self.connected = false;
        self.book_sequence.reset();
        self.tick_sequence.reset();
        warn!(
            position = self.position.net_position(),
            hedge_position = self.position.hedge_position(),
            live_orders = self.ledger.len(),
            "Execution connection lost, sequence tracking reset"
        );
    }
}
