//! Grid trading engine for Sui token pairs
//!
//! Places an evenly spaced ladder of price levels between a floor and a
//! ceiling, polls a price oracle on a fixed cadence, and swaps a fixed slice
//! of capital through a DEX aggregator whenever price crosses a level. When
//! price leaves the range the grid is recentered around it.
//!
//! # Architecture
//!
//! - [`config`] - Grid configuration, validation and APR projection
//! - [`types`] - Core data types (OrderSide, Trade, TickOutcome, etc.)
//! - [`errors`] - Grid-specific error types
//! - [`tokens`] - Supported token registry and base-unit conversion
//! - [`strategy`] - Level calculation and crossing detection
//! - [`rebalance`] - Out-of-range recentering policy
//! - [`oracle`] - Ordered price-source fallback with per-source timeouts
//! - [`sources`] - HTTP price sources (Binance, 7K, CoinGecko)
//! - [`executor`] - Route building and delegated signing (mockable for testing)
//! - [`paper`] - Local route builder and wallet for dry runs
//! - [`events`] - Observer interface and channel forwarding
//! - [`state`] - Live engine state and bounded trade ledger
//! - [`engine`] - Tick-driven state machine
//!
//! # Example Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use sui_grid_bot::grid::{
//!     token_by_symbol, ChannelObserver, GridBotEngine, GridConfig, PaperRouteBuilder,
//!     PaperWallet, PriceOracle, RouteProvider, RouteRegistry, TradeExecutor,
//! };
//!
//! // $500 over 10 levels between $3.20 and $4.10
//! let config = GridConfig::new(token_by_symbol("SUI")?, 3.2, 4.1, 10, 500.0, wallet_address);
//!
//! let routes = RouteRegistry::new().with(Arc::new(PaperRouteBuilder::new(RouteProvider::SevenK)));
//! let executor = TradeExecutor::new(routes, Arc::new(PaperWallet::new()));
//! let (observer, mut events) = ChannelObserver::new();
//!
//! let mut engine = GridBotEngine::new(config, oracle, executor, Arc::new(observer))?;
//! engine.start().await?;
//!
//! while let Some(event) = events.recv().await {
//!     println!("{:?}", event);
//! }
//! ```
//!
//! # Testing
//!
//! Mock collaborators live in [`executor::mock`]:
//!
//! ```rust,ignore
//! use sui_grid_bot::grid::executor::mock::{MockPriceSource, MockRouteBuilder, MockWalletSigner};
//!
//! let source = MockPriceSource::sequence("feed", vec![Some(1.05), Some(1.12), None]);
//! let wallet = MockWalletSigner::new();
//! ```

pub mod config;
pub mod engine;
pub mod errors;
pub mod events;
pub mod executor;
pub mod oracle;
pub mod paper;
pub mod rebalance;
pub mod sources;
pub mod state;
pub mod strategy;
pub mod tokens;
pub mod types;

// Re-export commonly used types
pub use self::config::{AprEstimate, GridConfig, RouteProvider, TradingMode};
pub use engine::GridBotEngine;
pub use errors::{GridError, GridResult};
pub use events::{ChannelObserver, GridEvent, GridObserver, NoOpObserver};
pub use executor::{Route, RouteBuilder, RouteRegistry, TradeExecutor, UnsignedTransaction, WalletSigner};
pub use oracle::{PriceOracle, PriceSource};
pub use paper::{PaperRouteBuilder, PaperWallet};
pub use sources::{build_oracle, BinancePriceSource, CoinGeckoPriceSource, SevenKPriceSource};
pub use state::{EngineState, TradeLedger};
pub use tokens::{supported_symbols, token_by_symbol, TokenInfo};
pub use types::{BotStatus, EngineStats, GridBounds, OrderSide, PriceSample, TickOutcome, Trade, TradeStatus};
