//! Core data types for grid trading

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Trade side chosen from the direction of a crossing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    /// Side implied by moving from `last_price` to `current_price`:
    /// rising price sells, falling price buys
    pub fn from_move(last_price: f64, current_price: f64) -> Self {
        if current_price > last_price {
            OrderSide::Sell
        } else {
            OrderSide::Buy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            OrderSide::Buy => "BUY",
            OrderSide::Sell => "SELL",
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Engine lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotStatus {
    /// Constructed, never started
    Idle,
    /// Timer armed, ticks are processed
    Running,
    /// Stopped; a fresh engine is required to trade again
    Stopped,
}

impl BotStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, BotStatus::Running)
    }
}

impl fmt::Display for BotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Settlement status of a ledger entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TradeStatus {
    Filled,
}

/// A completed swap, immutable once recorded in the ledger
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trade {
    pub id: Uuid,
    pub side: OrderSide,
    /// Price that triggered the trade
    pub price: f64,
    /// Base asset amount (capital per level / price)
    pub amount: f64,
    /// price * amount, in the quote asset
    pub quote_total: f64,
    /// Base token symbol
    pub token: String,
    /// Route provider that built the transaction
    pub via: String,
    /// Transaction digest returned by the wallet
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    pub status: TradeStatus,
    pub timestamp: DateTime<Utc>,
}

impl Trade {
    pub fn new(
        side: OrderSide,
        price: f64,
        amount: f64,
        token: impl Into<String>,
        via: impl Into<String>,
        digest: Option<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            side,
            price,
            amount,
            quote_total: price * amount,
            token: token.into(),
            via: via.into(),
            digest,
            status: TradeStatus::Filled,
            timestamp: Utc::now(),
        }
    }
}

/// A price observation from one source
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSample {
    pub price: f64,
    /// Name of the source that produced it
    pub source: String,
    pub timestamp: DateTime<Utc>,
}

impl PriceSample {
    pub fn new(price: f64, source: impl Into<String>) -> Self {
        Self {
            price,
            source: source.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Active grid range; replaced wholesale on rebalance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridBounds {
    pub price_min: f64,
    pub price_max: f64,
    pub levels: Vec<f64>,
}

impl GridBounds {
    /// Distance between adjacent levels
    pub fn spacing(&self) -> f64 {
        if self.levels.len() < 2 {
            return 0.0;
        }
        (self.price_max - self.price_min) / (self.levels.len() - 1) as f64
    }
}

/// Snapshot of engine statistics
#[derive(Debug, Clone, Serialize)]
pub struct EngineStats {
    pub pnl: f64,
    pub volume: f64,
    pub trades: Vec<Trade>,
    pub levels: Vec<f64>,
    pub price_min: f64,
    pub price_max: f64,
    pub last_price: Option<f64>,
    pub running: bool,
    pub uptime_secs: u64,
}

/// What a single tick did
#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Engine not running, superseded, or a previous tick still in flight
    Skipped,
    /// Every price source failed
    PriceUnavailable,
    /// Price observed, no level crossed (includes the first baseline sample)
    NoCrossing { price: f64 },
    /// Grid recentered on `price`
    Rebalanced { price: f64, price_min: f64, price_max: f64 },
    /// Trade executed at `level`
    Traded { level: f64, side: OrderSide },
    /// Level crossed but the trade failed
    TradeFailed { level: f64, side: OrderSide, reason: String },
}
