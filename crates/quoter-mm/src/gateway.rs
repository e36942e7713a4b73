//! Order gateway seam between the decision core and the connector.
//!
//! Every method is a one-way command. The connector acknowledges each
//! request later with a fill, status, or error event; acknowledgements for
//! one order id must arrive in fill-history order, but may interleave
//! freely with events for other ids.

use quoter_core::{Lifespan, OrderAction, OrderId, Price, Side, Volume};

/// Trait for requesting order actions from the connector.
///
/// This trait abstracts the transport, allowing for:
/// - Unit testing with a recording implementation
/// - Replay of recorded sessions
pub trait OrderGateway {
    /// Insert a quote on the primary instrument.
    fn insert_order(
        &mut self,
        order_id: OrderId,
        side: Side,
        price: Price,
        volume: Volume,
        lifespan: Lifespan,
    );

    /// Cancel a resting quote.
    fn cancel_order(&mut self, order_id: OrderId);

    /// Send an aggressive order on the hedge instrument.
    fn send_hedge_order(&mut self, order_id: OrderId, side: Side, price: Price, volume: Volume);
}

/// Gateway that records requested actions in emission order.
#[derive(Debug, Default, Clone)]
pub struct RecordingGateway {
    actions: Vec<OrderAction>,
}

impl RecordingGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Actions recorded so far.
    pub fn actions(&self) -> &[OrderAction] {
        &self.actions
    }

    /// Drain recorded actions.
    pub fn take_actions(&mut self) -> Vec<OrderAction> {
        std::mem::take(&mut self.actions)
    }

    pub fn clear(&mut self) {
        self.actions.clear();
    }
}

impl OrderGateway for RecordingGateway {
    fn insert_order(
        &mut self,
        order_id: OrderId,
        side: Side,
        price: Price,
        volume: Volume,
        lifespan: Lifespan,
    ) {
        self.actions.push(OrderAction::Insert {
            order_id,
            side,
            price,
            volume,
            lifespan,
        });
    }

    fn cancel_order(&mut self, order_id: OrderId) {
        self.actions.push(OrderAction::Cancel { order_id });
    }

    fn send_hedge_order(&mut self, order_id: OrderId, side: Side, price: Price, volume: Volume) {
        self.actions.push(OrderAction::Hedge {
            order_id,
            side,
            price,
            volume,
        });
    }
}
