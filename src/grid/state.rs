//! Live engine state (in memory only)

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::config::GridConfig;
use super::executor::estimate_grid_profit;
use super::strategy::compute_levels;
use super::types::{GridBounds, Trade};

/// Maximum number of trades kept in the ledger
pub const LEDGER_CAPACITY: usize = 200;

/// Bounded trade history, newest first; the oldest entry is evicted when full
#[derive(Debug, Clone, Serialize)]
pub struct TradeLedger {
    trades: Vec<Trade>,
    capacity: usize,
}

impl TradeLedger {
    pub fn new() -> Self {
        Self {
            trades: Vec::with_capacity(LEDGER_CAPACITY),
            capacity: LEDGER_CAPACITY,
        }
    }

    /// Record a trade, returning the evicted oldest trade if the ledger was full
    pub fn push(&mut self, trade: Trade) -> Option<Trade> {
        self.trades.insert(0, trade);
        if self.trades.len() > self.capacity {
            self.trades.pop()
        } else {
            None
        }
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Most recent trade
    pub fn latest(&self) -> Option<&Trade> {
        self.trades.first()
    }

    pub fn as_slice(&self) -> &[Trade] {
        &self.trades
    }

    pub fn to_vec(&self) -> Vec<Trade> {
        self.trades.clone()
    }
}

impl Default for TradeLedger {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything a running engine tracks between ticks
#[derive(Debug, Clone)]
pub struct EngineState {
    /// Active range and levels
    pub bounds: GridBounds,
    /// Last price the crossing detector compared against
    pub last_price: Option<f64>,
    /// Level that fired most recently; suppresses re-firing on it
    pub last_crossed_level: Option<f64>,
    /// Estimated cumulative profit in the quote asset
    pub pnl: f64,
    /// Cumulative traded notional in the quote asset
    pub volume: f64,
    pub ledger: TradeLedger,
    pub started_at: Option<DateTime<Utc>>,
}

impl EngineState {
    /// Fresh state with levels computed from `config`
    pub fn new(config: &GridConfig) -> Self {
        Self {
            bounds: GridBounds {
                price_min: config.price_min,
                price_max: config.price_max,
                levels: compute_levels(config.price_min, config.price_max, config.grid_count),
            },
            last_price: None,
            last_crossed_level: None,
            pnl: 0.0,
            volume: 0.0,
            ledger: TradeLedger::new(),
            started_at: None,
        }
    }

    /// Account for a completed trade and append it to the ledger
    pub fn record_trade(&mut self, trade: Trade, capital_per_level: f64) {
        self.volume += capital_per_level;
        self.pnl += estimate_grid_profit(self.bounds.spacing(), trade.price, capital_per_level);
        self.ledger.push(trade);
    }

    /// Replace the range and forget the last crossed level
    pub fn apply_rebalance(&mut self, bounds: GridBounds) {
        self.bounds = bounds;
        self.last_crossed_level = None;
    }

    /// Advance the crossing baseline after a crossing, whatever the trade outcome
    pub fn mark_crossed(&mut self, level: f64, price: f64) {
        self.last_crossed_level = Some(level);
        self.last_price = Some(price);
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at
            .map(|t| (Utc::now() - t).num_seconds().max(0) as u64)
            .unwrap_or(0)
    }
}
