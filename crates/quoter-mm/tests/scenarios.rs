//! End-to-end behaviour of the trader driven through connector events.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use quoter_core::{
    BookSnapshot, ConnectorEvent, Instrument, Lifespan, OrderAction, OrderId, Price, Side, Volume,
};
use quoter_mm::{AutoTrader, HedgeState, QuoteSlot, RecordingGateway, TraderConfig};

struct Harness {
    trader: AutoTrader,
    gw: RecordingGateway,
    start: Instant,
    seq: u64,
}

impl Harness {
    fn new() -> Self {
        let start = Instant::now();
        Self {
            trader: AutoTrader::new(TraderConfig::default(), start).unwrap(),
            gw: RecordingGateway::new(),
            start,
            seq: 0,
        }
    }

    fn at(&self, ms: u64) -> Instant {
        self.start + Duration::from_millis(ms)
    }

    fn book(&mut self, ms: u64, ask: u64, bid: u64) -> Vec<OrderAction> {
        self.seq += 1;
        let snapshot = BookSnapshot::top_of_book(
            Instrument::Future,
            self.seq,
            Price::new(ask),
            Volume::new(50),
            Price::new(bid),
            Volume::new(50),
        );
        let now = self.at(ms);
        self.trader.handle_event(
            &mut self.gw,
            now,
            &ConnectorEvent::OrderBookUpdate(snapshot),
        );
        self.gw.take_actions()
    }

    fn send(&mut self, ms: u64, event: ConnectorEvent) -> Vec<OrderAction> {
        let now = self.at(ms);
        self.trader.handle_event(&mut self.gw, now, &event);
        self.gw.take_actions()
    }

    fn fill(&mut self, id: OrderId, price: u64, lots: u64) {
        self.send(
            0,
            ConnectorEvent::OrderFilled {
                order_id: id.get(),
                price: Price::new(price),
                volume: Volume::new(lots),
            },
        );
    }

    fn status(&mut self, id: OrderId, filled: u64, remaining: u64) {
        self.send(
            0,
            ConnectorEvent::OrderStatus {
                order_id: id.get(),
                fill_volume: Volume::new(filled),
                remaining_volume: Volume::new(remaining),
                fees: 0,
            },
        );
    }

    fn ask_id(&self) -> OrderId {
        self.trader.quotes().ask().order_id().unwrap()
    }

    fn bid_id(&self) -> OrderId {
        self.trader.quotes().bid().order_id().unwrap()
    }
}

fn insert(order_id: OrderId, side: Side, price: u64, lots: u64) -> OrderAction {
    OrderAction::Insert {
        order_id,
        side,
        price: Price::new(price),
        volume: Volume::new(lots),
        lifespan: Lifespan::GoodForDay,
    }
}

#[test]
fn test_first_book_quotes_both_sides() {
    let mut h = Harness::new();
    let actions = h.book(0, 10_000, 9_900);

    assert_eq!(
        actions,
        vec![
            insert(h.ask_id(), Side::Sell, 10_000, 10),
            insert(h.bid_id(), Side::Buy, 9_900, 10),
        ]
    );
    assert!(!actions.iter().any(OrderAction::is_cancel));
}

#[test]
fn test_moved_bid_is_cancelled_then_requoted() {
    let mut h = Harness::new();
    h.book(0, 10_000, 9_900);
    let old_bid = h.bid_id();

    let actions = h.book(10, 10_000, 9_950);
    // Cancel goes out first, the fresh bid follows in the same update
    assert_eq!(actions[0], OrderAction::Cancel { order_id: old_bid });
    assert!(matches!(
        actions[1],
        OrderAction::Insert {
            side: Side::Buy,
            price: Price(9_950),
            ..
        }
    ));
    assert_ne!(h.bid_id(), old_bid);
    // The old bid still counts until its cancel is confirmed
    assert!(h.trader.ledger().contains(old_bid));

    h.status(old_bid, 0, 0);
    assert!(!h.trader.ledger().contains(old_bid));
}

#[test]
fn test_pending_cancel_volume_caps_new_quote() {
    let mut h = Harness::new();
    h.book(0, 10_000, 9_900);
    let bid = h.bid_id();
    // Long 85 with the old bid's 10 lots still resident when it moves
    h.fill(bid, 9_900, 85);

    let actions = h.book(10, 10_000, 9_950);
    assert_eq!(actions.len(), 2);
    // Room is 100 - 85 - 10 resident = 5
    assert!(matches!(
        actions[1],
        OrderAction::Insert {
            side: Side::Buy,
            volume: Volume(5),
            ..
        }
    ));
}

#[test]
fn test_long_position_caps_bid() {
    let mut h = Harness::new();
    h.book(0, 10_000, 9_900);
    let (ask, bid) = (h.ask_id(), h.bid_id());
    h.fill(bid, 9_900, 95);
    h.status(bid, 95, 0);
    h.status(ask, 0, 0);

    let actions = h.book(10, 10_000, 9_900);
    // next targets at +95: bid 2, ask 97; caps: bid 5, ask 195
    assert_eq!(
        actions,
        vec![
            insert(h.ask_id(), Side::Sell, 10_000, 97),
            insert(h.bid_id(), Side::Buy, 9_900, 2),
        ]
    );
    assert!(h.trader.position().net_position() + 2 <= 100);
}

#[test]
fn test_exposure_over_limit_hedges_after_window() {
    let mut h = Harness::new();
    h.book(0, 10_000, 9_900);
    let bid = h.bid_id();
    h.fill(bid, 9_900, 25);
    assert_eq!(h.trader.position().exposure(), 25);

    // Over tolerance but the window has not elapsed
    let actions = h.book(30_000, 10_000, 9_900);
    assert!(!actions.iter().any(OrderAction::is_hedge));
    assert_eq!(h.trader.hedger().state(), HedgeState::OverExposedTiming);

    let actions = h.book(57_500, 10_000, 9_900);
    let hedges: Vec<_> = actions.iter().filter(|a| a.is_hedge()).collect();
    assert_eq!(hedges.len(), 1);
    assert!(matches!(
        hedges[0],
        OrderAction::Hedge {
            side: Side::Sell,
            price: Price(100),
            volume: Volume(15),
            ..
        }
    ));
    assert_eq!(h.trader.position().hedge_position(), -15);
    assert_eq!(h.trader.position().net_position(), 25);
    assert_eq!(h.trader.hedger().state(), HedgeState::WithinTolerance);
}

#[test]
fn test_hedge_timer_resets_when_back_in_tolerance() {
    let mut h = Harness::new();
    h.book(0, 10_000, 9_900);
    let (ask, bid) = (h.ask_id(), h.bid_id());
    h.fill(bid, 9_900, 25);
    h.book(40_000, 10_000, 9_900);

    // Selling brings exposure back within tolerance
    h.fill(ask, 10_000, 15);
    h.book(50_000, 10_000, 9_900);
    assert_eq!(h.trader.hedger().window_start(), h.at(50_000));

    // Over again, but the window restarted at 50s
    h.fill(bid, 9_900, 10);
    let actions = h.book(100_000, 10_000, 9_900);
    assert!(!actions.iter().any(OrderAction::is_hedge));
    let actions = h.book(107_500, 10_000, 9_900);
    assert!(actions.iter().any(OrderAction::is_hedge));
}

#[test]
fn test_hedge_fill_leaves_positions_alone() {
    let mut h = Harness::new();
    h.book(0, 10_000, 9_900);
    h.fill(h.bid_id(), 9_900, 25);
    let actions = h.book(60_000, 10_000, 9_900);
    let hedge = actions.iter().find(|a| a.is_hedge()).unwrap().order_id();

    h.send(
        60_001,
        ConnectorEvent::HedgeFilled {
            order_id: hedge.get(),
            price: Price::new(10_000),
            volume: Volume::new(15),
        },
    );
    assert_eq!(h.trader.position().net_position(), 25);
    assert_eq!(h.trader.position().hedge_position(), -15);
    assert!(!h.trader.ledger().contains(hedge));
}

#[test]
fn test_partial_hedge_fill_retires_hedge_order() {
    let mut h = Harness::new();
    h.book(0, 10_000, 9_900);
    h.fill(h.bid_id(), 9_900, 25);
    let actions = h.book(60_000, 10_000, 9_900);
    let hedge = actions.iter().find(|a| a.is_hedge()).unwrap().order_id();
    assert_eq!(h.trader.snapshot().live_hedge_orders, 1);

    h.send(
        60_001,
        ConnectorEvent::HedgeFilled {
            order_id: hedge.get(),
            price: Price::new(9_950),
            volume: Volume::new(5),
        },
    );
    assert!(!h.trader.ledger().contains(hedge));
    assert_eq!(h.trader.snapshot().live_hedge_orders, 0);
    // Booked at send time for the full requested volume
    assert_eq!(h.trader.position().hedge_position(), -15);
}

#[test]
fn test_partial_status_shrinks_slot_without_requote() {
    let mut h = Harness::new();
    h.book(0, 10_000, 9_900);
    let bid = h.bid_id();

    h.fill(bid, 9_900, 4);
    h.status(bid, 4, 6);
    assert_eq!(h.trader.quotes().bid().volume(), Volume::new(6));
    assert_eq!(h.trader.ledger().get(bid).unwrap().resident, Volume::new(6));
    assert_eq!(h.bid_id(), bid);

    // Same top of book: both slots are still resting
    assert!(h.book(10, 10_000, 9_900).is_empty());
    assert_eq!(h.bid_id(), bid);
}

#[test]
fn test_error_on_bid_clears_slot_and_allows_requote() {
    let mut h = Harness::new();
    h.book(0, 10_000, 9_900);
    let bid = h.bid_id();

    h.send(
        1,
        ConnectorEvent::Error {
            order_id: bid.get(),
            message: "order rejected".to_string(),
        },
    );
    assert_eq!(*h.trader.quotes().bid(), QuoteSlot::Empty);
    assert!(!h.trader.ledger().contains(bid));

    let actions = h.book(2, 10_000, 9_900);
    assert_eq!(actions, vec![insert(h.bid_id(), Side::Buy, 9_900, 10)]);
    assert_ne!(h.bid_id(), bid);
}

#[test]
fn test_terminal_events_are_idempotent() {
    let mut h = Harness::new();
    h.book(0, 10_000, 9_900);
    let ask = h.ask_id();
    h.status(ask, 0, 0);
    let after_first = h.trader.snapshot();

    h.status(ask, 0, 0);
    h.send(
        1,
        ConnectorEvent::Error {
            order_id: ask.get(),
            message: "late error".to_string(),
        },
    );
    h.fill(ask, 10_000, 3);
    assert_eq!(h.trader.snapshot(), after_first);
}

#[test]
fn test_out_of_order_and_secondary_books_are_ignored() {
    let mut h = Harness::new();
    h.book(0, 10_000, 9_900);
    let before = h.trader.snapshot();

    let stale = BookSnapshot::top_of_book(
        Instrument::Future,
        0,
        Price::new(10_100),
        Volume::new(5),
        Price::new(9_800),
        Volume::new(5),
    );
    assert!(h.send(5, ConnectorEvent::OrderBookUpdate(stale)).is_empty());

    let etf = BookSnapshot::top_of_book(
        Instrument::Etf,
        7,
        Price::new(10_100),
        Volume::new(5),
        Price::new(9_800),
        Volume::new(5),
    );
    assert!(h.send(6, ConnectorEvent::OrderBookUpdate(etf)).is_empty());
    assert_eq!(h.trader.quotes().ask(), &before.ask);
    assert_eq!(h.trader.quotes().bid(), &before.bid);
}

#[test]
fn test_quoting_resumes_after_disconnect_restarts_sequence() {
    let mut h = Harness::new();
    for ms in 0..5 {
        h.book(ms, 10_000, 9_900);
    }
    let ask = h.ask_id();

    h.send(10, ConnectorEvent::Disconnect);
    h.status(ask, 0, 0);
    assert!(h.trader.quotes().ask().is_empty());

    // The new session numbers its books from one again
    h.seq = 0;
    let actions = h.book(20, 10_000, 9_900);
    assert_eq!(actions, vec![insert(h.ask_id(), Side::Sell, 10_000, 10)]);
    assert_eq!(h.trader.snapshot().stale_books_dropped, 0);
}

/// Minimal exchange: rests inserts, fills them partially, confirms cancels.
#[derive(Default)]
struct Exchange {
    resting: BTreeMap<OrderId, (Side, u64, u64)>,
}

impl Exchange {
    fn accept(&mut self, actions: Vec<OrderAction>) -> Vec<ConnectorEvent> {
        let mut acks = Vec::new();
        for action in actions {
            match action {
                OrderAction::Insert {
                    order_id,
                    side,
                    price,
                    volume,
                    ..
                } => {
                    self.resting
                        .insert(order_id, (side, price.cents(), volume.lots()));
                }
                OrderAction::Cancel { order_id } => {
                    if self.resting.remove(&order_id).is_some() {
                        acks.push(ConnectorEvent::OrderStatus {
                            order_id: order_id.get(),
                            fill_volume: Volume::ZERO,
                            remaining_volume: Volume::ZERO,
                            fees: 0,
                        });
                    }
                }
                OrderAction::Hedge { .. } => {}
            }
        }
        acks
    }

    fn fill_one(&mut self, pick: u64, lots: u64) -> Vec<ConnectorEvent> {
        if self.resting.is_empty() {
            return Vec::new();
        }
        let idx = (pick % self.resting.len() as u64) as usize;
        let order_id = *self.resting.keys().nth(idx).unwrap();
        let (_, price, remaining) = self.resting[&order_id];
        let traded = lots.min(remaining);
        let left = remaining - traded;
        if left == 0 {
            self.resting.remove(&order_id);
        } else if let Some(entry) = self.resting.get_mut(&order_id) {
            entry.2 = left;
        }
        vec![
            ConnectorEvent::OrderFilled {
                order_id: order_id.get(),
                price: Price::new(price),
                volume: Volume::new(traded),
            },
            ConnectorEvent::OrderStatus {
                order_id: order_id.get(),
                fill_volume: Volume::new(traded),
                remaining_volume: Volume::new(left),
                fees: -(traded as i64),
            },
        ]
    }
}

struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self
            .0
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.0 >> 33
    }
}

#[test]
fn test_position_never_exceeds_limit_under_random_flow() {
    let mut h = Harness::new();
    let mut exchange = Exchange::default();
    let mut rng = Lcg(7);
    let mut inserts_seen = Vec::new();

    for step in 0..2_000u64 {
        let mid = 10_000 + (rng.next() % 11) * 100;
        let actions = h.book(step * 1_000, mid + 100, mid - 100);

        // Cancel on a side always precedes the insert on that side
        for side in [Side::Sell, Side::Buy] {
            let slot_actions: Vec<_> = actions
                .iter()
                .filter(|a| match a {
                    OrderAction::Insert { side: s, .. } => *s == side,
                    OrderAction::Cancel { order_id } => {
                        inserts_seen.iter().any(|(id, s)| id == order_id && *s == side)
                    }
                    OrderAction::Hedge { .. } => false,
                })
                .collect();
            if slot_actions.len() == 2 {
                assert!(slot_actions[0].is_cancel() && slot_actions[1].is_insert());
            }
        }
        for action in &actions {
            if let OrderAction::Insert { order_id, side, .. } = action {
                inserts_seen.push((*order_id, *side));
            }
        }

        let mut events = exchange.accept(actions);
        if rng.next() % 2 == 0 {
            events.extend(exchange.fill_one(rng.next(), 1 + rng.next() % 40));
        }
        for event in events {
            let now = h.at(step * 1_000 + 1);
            h.trader.handle_event(&mut h.gw, now, &event);
            assert!(h.gw.take_actions().is_empty());
        }

        let position = h.trader.position().net_position();
        assert!(position.abs() <= 100, "position {position} at step {step}");

        // Slots and ledger agree
        for slot in [h.trader.quotes().ask(), h.trader.quotes().bid()] {
            if let Some(id) = slot.order_id() {
                assert!(h.trader.ledger().contains(id));
            }
        }
    }

    let stats = h.trader.position().stats();
    assert!(stats.fill_count > 0);
    assert_eq!(
        stats.bought as i64 - stats.sold as i64,
        h.trader.position().net_position()
    );
}
