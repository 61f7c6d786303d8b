//! Grid trading configuration

use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::errors::{GridError, GridResult};
use super::tokens::{TokenInfo, USDC};

/// Trading cadence; selects the tick interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TradingMode {
    Conservative,
    #[default]
    Balanced,
    Aggressive,
}

impl TradingMode {
    /// Time between price checks
    pub fn tick_interval(&self) -> Duration {
        match self {
            TradingMode::Conservative => Duration::from_secs(12),
            TradingMode::Balanced => Duration::from_secs(8),
            TradingMode::Aggressive => Duration::from_secs(4),
        }
    }

    /// Relative trade frequency used by the APR projection
    fn activity_multiplier(&self) -> f64 {
        match self {
            TradingMode::Conservative => 0.7,
            TradingMode::Balanced => 1.0,
            TradingMode::Aggressive => 1.4,
        }
    }
}

/// Liquidity router used to build swap transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RouteProvider {
    #[serde(rename = "aftermath")]
    Aftermath,
    #[default]
    #[serde(rename = "7k")]
    SevenK,
}

impl RouteProvider {
    /// Label recorded on trades
    pub fn label(&self) -> &'static str {
        match self {
            RouteProvider::Aftermath => "Aftermath",
            RouteProvider::SevenK => "7K",
        }
    }
}

impl fmt::Display for RouteProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Projected yield of a grid setup
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AprEstimate {
    /// Annualised return in percent
    pub apr_pct: f64,
    /// Profit per grid step in percent of the mid price
    pub per_grid_pct: f64,
}

pub const MIN_GRID_COUNT: u32 = 2;
pub const MAX_GRID_COUNT: u32 = 50;
pub const MIN_SLIPPAGE_PCT: f64 = 0.1;
pub const MAX_SLIPPAGE_PCT: f64 = 1.0;
pub const MIN_CALL_TIMEOUT_MS: u64 = 5_000;
pub const MAX_CALL_TIMEOUT_MS: u64 = 8_000;

/// Grid bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridConfig {
    /// Base token being traded
    pub token: TokenInfo,

    /// Quote asset (USDC unless overridden)
    #[serde(default = "default_quote")]
    pub quote: TokenInfo,

    /// Lower price boundary for the grid
    pub price_min: f64,

    /// Upper price boundary for the grid
    pub price_max: f64,

    /// Number of grid levels, both bounds included
    pub grid_count: u32,

    /// Total capital in the quote asset, split evenly across levels
    pub total_capital: f64,

    /// Slippage tolerance in percent (0.1 - 1.0)
    pub slippage_pct: f64,

    #[serde(default)]
    pub mode: TradingMode,

    #[serde(default)]
    pub route_provider: RouteProvider,

    /// Connected wallet that signs every swap
    pub wallet_address: String,

    /// Timeout for each route-builder and wallet call (milliseconds, 5000 - 8000)
    #[serde(default = "default_call_timeout")]
    pub call_timeout_ms: u64,
}

fn default_quote() -> TokenInfo {
    USDC.clone()
}

fn default_call_timeout() -> u64 {
    8_000
}

impl GridConfig {
    /// Create a new grid configuration with required parameters
    ///
    /// # Arguments
    /// * `token` - Base token to trade
    /// * `price_min` - Lower price boundary
    /// * `price_max` - Upper price boundary
    /// * `grid_count` - Number of grid levels
    /// * `total_capital` - Total quote amount allocated to the grid
    /// * `wallet_address` - Address of the signing wallet
    pub fn new(
        token: TokenInfo,
        price_min: f64,
        price_max: f64,
        grid_count: u32,
        total_capital: f64,
        wallet_address: impl Into<String>,
    ) -> Self {
        Self {
            token,
            quote: default_quote(),
            price_min,
            price_max,
            grid_count,
            total_capital,
            slippage_pct: 0.5,
            mode: TradingMode::default(),
            route_provider: RouteProvider::default(),
            wallet_address: wallet_address.into(),
            call_timeout_ms: default_call_timeout(),
        }
    }

    /// Builder: set trading mode
    pub fn with_mode(mut self, mode: TradingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Builder: set route provider
    pub fn with_route_provider(mut self, provider: RouteProvider) -> Self {
        self.route_provider = provider;
        self
    }

    /// Builder: set slippage tolerance in percent
    pub fn with_slippage_pct(mut self, pct: f64) -> Self {
        self.slippage_pct = pct;
        self
    }

    /// Builder: set quote asset
    pub fn with_quote(mut self, quote: TokenInfo) -> Self {
        self.quote = quote;
        self
    }

    /// Builder: set external call timeout
    pub fn with_call_timeout_ms(mut self, ms: u64) -> Self {
        self.call_timeout_ms = ms;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> GridResult<()> {
        if !(self.price_min > 0.0) {
            return Err(GridError::InvalidConfig(
                "price_min must be positive".into(),
            ));
        }

        if self.price_min >= self.price_max {
            return Err(GridError::InvalidConfig(
                "price_min must be less than price_max".into(),
            ));
        }

        if !(MIN_GRID_COUNT..=MAX_GRID_COUNT).contains(&self.grid_count) {
            return Err(GridError::InvalidConfig(format!(
                "grid_count must be between {} and {}",
                MIN_GRID_COUNT, MAX_GRID_COUNT
            )));
        }

        if !(self.total_capital > 0.0) {
            return Err(GridError::InvalidConfig(
                "total_capital must be positive".into(),
            ));
        }

        if !(MIN_SLIPPAGE_PCT..=MAX_SLIPPAGE_PCT).contains(&self.slippage_pct) {
            return Err(GridError::InvalidConfig(format!(
                "slippage_pct must be between {} and {}",
                MIN_SLIPPAGE_PCT, MAX_SLIPPAGE_PCT
            )));
        }

        if self.wallet_address.trim().is_empty() {
            return Err(GridError::InvalidConfig(
                "wallet_address cannot be empty".into(),
            ));
        }

        if self.token.contract == self.quote.contract {
            return Err(GridError::InvalidConfig(
                "token and quote asset must differ".into(),
            ));
        }

        if !(MIN_CALL_TIMEOUT_MS..=MAX_CALL_TIMEOUT_MS).contains(&self.call_timeout_ms) {
            return Err(GridError::InvalidConfig(format!(
                "call_timeout_ms must be between {} and {}",
                MIN_CALL_TIMEOUT_MS, MAX_CALL_TIMEOUT_MS
            )));
        }

        Ok(())
    }

    /// Notional size of one trade in the quote asset
    pub fn capital_per_level(&self) -> f64 {
        self.total_capital / self.grid_count as f64
    }

    /// Slippage tolerance as a fraction (0.005 for 0.5%)
    pub fn slippage(&self) -> f64 {
        self.slippage_pct / 100.0
    }

    pub fn tick_interval(&self) -> Duration {
        self.mode.tick_interval()
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    /// Price distance between adjacent levels
    pub fn grid_spacing(&self) -> f64 {
        (self.price_max - self.price_min) / (self.grid_count.saturating_sub(1)).max(1) as f64
    }

    /// Projected APR assuming 3.5 grid round trips per day, scaled by mode
    ///
    /// Returns `None` for an unusable range.
    pub fn estimate_apr(&self) -> Option<AprEstimate> {
        if !(self.price_min > 0.0) || self.price_min >= self.price_max || self.grid_count < 2 {
            return None;
        }

        let mid = (self.price_min + self.price_max) / 2.0;
        let grid_profit = self.grid_spacing() / mid;
        let trades_per_day = self.mode.activity_multiplier() * 3.5;
        let daily_return = grid_profit * trades_per_day;

        Some(AprEstimate {
            apr_pct: daily_return * 365.0 * 100.0,
            per_grid_pct: grid_profit * 100.0,
        })
    }

    /// Load config from JSON file
    pub fn load_from_file(path: impl AsRef<std::path::Path>) -> GridResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to JSON file
    pub fn save_to_file(&self, path: impl AsRef<std::path::Path>) -> GridResult<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::tokens::token_by_symbol;

    fn sui_config(min: f64, max: f64, count: u32, capital: f64) -> GridConfig {
        GridConfig::new(token_by_symbol("SUI").unwrap(), min, max, count, capital, "0xwallet")
    }

    #[test]
    fn test_config_validation() {
        assert!(sui_config(1.0, 2.0, 10, 500.0).validate().is_ok());

        // Invalid: min >= max
        assert!(sui_config(2.0, 1.0, 10, 500.0).validate().is_err());
        assert!(sui_config(1.0, 1.0, 10, 500.0).validate().is_err());

        // Invalid: grid_count out of range
        assert!(sui_config(1.0, 2.0, 1, 500.0).validate().is_err());
        assert!(sui_config(1.0, 2.0, 51, 500.0).validate().is_err());

        // Invalid: non-positive capital
        assert!(sui_config(1.0, 2.0, 10, 0.0).validate().is_err());
        assert!(sui_config(1.0, 2.0, 10, -5.0).validate().is_err());

        // Invalid: non-positive floor
        assert!(sui_config(0.0, 2.0, 10, 500.0).validate().is_err());
    }

    #[test]
    fn test_slippage_bounds() {
        let config = sui_config(1.0, 2.0, 10, 500.0);
        assert!(config.clone().with_slippage_pct(0.1).validate().is_ok());
        assert!(config.clone().with_slippage_pct(1.0).validate().is_ok());
        assert!(config.clone().with_slippage_pct(0.05).validate().is_err());
        assert!(config.clone().with_slippage_pct(1.5).validate().is_err());
        assert!((config.with_slippage_pct(0.5).slippage() - 0.005).abs() < 1e-12);
    }

    #[test]
    fn test_call_timeout_bounds() {
        let config = sui_config(1.0, 2.0, 10, 500.0);
        assert!(config.clone().with_call_timeout_ms(5_000).validate().is_ok());
        assert!(config.clone().with_call_timeout_ms(8_000).validate().is_ok());
        assert!(matches!(
            config.clone().with_call_timeout_ms(1).validate(),
            Err(GridError::InvalidConfig(_))
        ));
        assert!(matches!(
            config.with_call_timeout_ms(600_000).validate(),
            Err(GridError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("grid_config_{}.json", uuid::Uuid::new_v4()));
        let config = sui_config(3.2, 4.1, 10, 500.0)
            .with_mode(TradingMode::Aggressive)
            .with_route_provider(RouteProvider::Aftermath)
            .with_call_timeout_ms(5_000);

        config.save_to_file(&path).unwrap();
        let loaded = GridConfig::load_from_file(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(loaded.token, config.token);
        assert_eq!(loaded.quote, config.quote);
        assert_eq!(loaded.grid_count, 10);
        assert_eq!(loaded.mode, TradingMode::Aggressive);
        assert_eq!(loaded.route_provider, RouteProvider::Aftermath);
        assert_eq!(loaded.call_timeout_ms, 5_000);
    }

    #[test]
    fn test_load_rejects_invalid_file() {
        let path = std::env::temp_dir().join(format!("grid_config_{}.json", uuid::Uuid::new_v4()));
        sui_config(1.0, 2.0, 10, 500.0)
            .with_call_timeout_ms(1)
            .save_to_file(&path)
            .unwrap();

        let result = GridConfig::load_from_file(&path);
        std::fs::remove_file(&path).ok();
        assert!(matches!(result, Err(GridError::InvalidConfig(_))));

        assert!(GridConfig::load_from_file("/nonexistent/grid_config.json").is_err());
    }

    #[test]
    fn test_empty_wallet_rejected() {
        let mut config = sui_config(1.0, 2.0, 10, 500.0);
        config.wallet_address = "  ".into();
        assert!(matches!(config.validate(), Err(GridError::InvalidConfig(_))));
    }

    #[test]
    fn test_capital_per_level() {
        let config = sui_config(1.0, 2.0, 10, 500.0);
        assert!((config.capital_per_level() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_grid_spacing() {
        let config = sui_config(1.0, 1.2, 3, 300.0);
        assert!((config.grid_spacing() - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_tick_interval_by_mode() {
        assert_eq!(TradingMode::Conservative.tick_interval(), Duration::from_secs(12));
        assert_eq!(TradingMode::Balanced.tick_interval(), Duration::from_secs(8));
        assert_eq!(TradingMode::Aggressive.tick_interval(), Duration::from_secs(4));
    }

    #[test]
    fn test_estimate_apr() {
        // spacing 0.1, mid 1.1 => 9.09% per grid; balanced => 3.5 trips/day
        let config = sui_config(1.0, 1.2, 3, 300.0);
        let apr = config.estimate_apr().unwrap();
        let per_grid = 0.1 / 1.1;
        assert!((apr.per_grid_pct - per_grid * 100.0).abs() < 1e-9);
        assert!((apr.apr_pct - per_grid * 3.5 * 365.0 * 100.0).abs() < 1e-6);

        let aggressive = config.clone().with_mode(TradingMode::Aggressive).estimate_apr().unwrap();
        assert!(aggressive.apr_pct > apr.apr_pct);

        assert!(sui_config(2.0, 1.0, 3, 300.0).estimate_apr().is_none());
    }

    #[test]
    fn test_route_provider_serde() {
        let provider: RouteProvider = serde_json::from_str("\"7k\"").unwrap();
        assert_eq!(provider, RouteProvider::SevenK);
        let provider: RouteProvider = serde_json::from_str("\"aftermath\"").unwrap();
        assert_eq!(provider.label(), "Aftermath");
    }

    #[test]
    fn test_json_round_trip_defaults() {
        let json = r#"{
            "token": {"symbol": "SUI", "name": "Sui", "contract": "0x2::sui::SUI", "decimals": 9},
            "price_min": 1.0,
            "price_max": 2.0,
            "grid_count": 5,
            "total_capital": 100.0,
            "slippage_pct": 0.5,
            "wallet_address": "0xwallet"
        }"#;
        let config: GridConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.quote.symbol, "USDC");
        assert_eq!(config.mode, TradingMode::Balanced);
        assert_eq!(config.call_timeout_ms, 8_000);
        assert!(config.validate().is_ok());
    }
}
