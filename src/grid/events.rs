//! Observer interface for engine notifications
//!
//! Defines how external components hear about price updates, trades,
//! rebalances and errors. The engine invokes the observer synchronously from
//! its tick, so notifications arrive in transition order.

use log::warn;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use super::types::Trade;

/// Receives engine notifications
pub trait GridObserver: Send + Sync {
    /// A price was observed
    fn on_price_update(&self, price: f64);

    /// A trade completed; `ledger` is newest-first
    fn on_trade(&self, trade: &Trade, pnl: f64, volume: f64, ledger: &[Trade]);

    /// The grid was recentered because `price` left the range
    fn on_rebalance(&self, price_min: f64, price_max: f64, levels: &[f64], price: f64);

    /// A recoverable error the user should see
    fn on_error(&self, message: &str);
}

/// An observer that ignores everything
#[derive(Debug, Default)]
pub struct NoOpObserver;

impl GridObserver for NoOpObserver {
    fn on_price_update(&self, _price: f64) {}

    fn on_trade(&self, _trade: &Trade, _pnl: f64, _volume: f64, _ledger: &[Trade]) {}

    fn on_rebalance(&self, _price_min: f64, _price_max: f64, _levels: &[f64], _price: f64) {}

    fn on_error(&self, _message: &str) {}
}

/// Owned form of a notification
#[derive(Debug, Clone)]
pub enum GridEvent {
    PriceUpdate(f64),
    Trade {
        trade: Trade,
        pnl: f64,
        volume: f64,
        ledger: Vec<Trade>,
    },
    Rebalance {
        price_min: f64,
        price_max: f64,
        levels: Vec<f64>,
        price: f64,
    },
    Error(String),
}

/// Forwards notifications over an unbounded channel, preserving order
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: UnboundedSender<GridEvent>,
}

impl ChannelObserver {
    pub fn new() -> (Self, UnboundedReceiver<GridEvent>) {
        let (sender, receiver) = unbounded_channel();
        (Self { sender }, receiver)
    }

    fn send(&self, event: GridEvent) {
        if self.sender.send(event).is_err() {
            warn!("Grid event receiver dropped");
        }
    }
}

impl GridObserver for ChannelObserver {
    fn on_price_update(&self, price: f64) {
        self.send(GridEvent::PriceUpdate(price));
    }

    fn on_trade(&self, trade: &Trade, pnl: f64, volume: f64, ledger: &[Trade]) {
        self.send(GridEvent::Trade {
            trade: trade.clone(),
            pnl,
            volume,
            ledger: ledger.to_vec(),
        });
    }

    fn on_rebalance(&self, price_min: f64, price_max: f64, levels: &[f64], price: f64) {
        self.send(GridEvent::Rebalance {
            price_min,
            price_max,
            levels: levels.to_vec(),
            price,
        });
    }

    fn on_error(&self, message: &str) {
        self.send(GridEvent::Error(message.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::types::OrderSide;

    #[test]
    fn test_noop_observer() {
        let observer = NoOpObserver;
        observer.on_price_update(1.0);
        observer.on_error("ignored");
        // Should not panic
    }

    #[tokio::test]
    async fn test_channel_observer_preserves_order() {
        let (observer, mut rx) = ChannelObserver::new();
        let trade = Trade::new(OrderSide::Buy, 1.0, 10.0, "SUI", "7K", None);

        observer.on_price_update(1.0);
        observer.on_trade(&trade, 0.5, 10.0, std::slice::from_ref(&trade));
        observer.on_rebalance(0.5, 1.5, &[0.5, 1.0, 1.5], 1.6);
        observer.on_error("boom");

        assert!(matches!(rx.recv().await, Some(GridEvent::PriceUpdate(p)) if p == 1.0));
        match rx.recv().await {
            Some(GridEvent::Trade { ledger, volume, .. }) => {
                assert_eq!(ledger.len(), 1);
                assert_eq!(volume, 10.0);
            }
            other => panic!("unexpected event: {:?}", other),
        }
        assert!(matches!(rx.recv().await, Some(GridEvent::Rebalance { price, .. }) if price == 1.6));
        assert!(matches!(rx.recv().await, Some(GridEvent::Error(m)) if m == "boom"));
    }

    #[test]
    fn test_dropped_receiver_does_not_panic() {
        let (observer, rx) = ChannelObserver::new();
        drop(rx);
        observer.on_price_update(2.0);
    }
}
