use config::{Config, File};
pub use config::ConfigError;
use serde::Deserialize;

use crate::grid::config::{GridConfig, RouteProvider, TradingMode};
use crate::grid::errors::GridResult;
use crate::grid::sources::DEFAULT_SOURCE_ORDER;
use crate::grid::tokens::token_by_symbol;

/// Main configuration struct
#[derive(Debug, Deserialize)]
pub struct Settings {
    /// Grid parameters (token, range, capital, mode, wallet)
    pub grid: GridSettings,
    /// Price source priority
    #[serde(default)]
    pub oracle: OracleConfig,
    /// Logging configuration
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize)]
pub struct GridSettings {
    /// Token symbol (e.g., "SUI", "WAL")
    pub token: String,
    pub price_min: f64,
    pub price_max: f64,
    pub grid_count: u32,
    /// Total capital in USDC
    pub total_capital: f64,
    #[serde(default = "default_slippage_pct")]
    pub slippage_pct: f64,
    /// "conservative", "balanced" or "aggressive"
    #[serde(default)]
    pub mode: TradingMode,
    /// "aftermath" or "7k"
    #[serde(default)]
    pub route_provider: RouteProvider,
    /// Address of the wallet that signs swaps
    pub wallet_address: String,
    #[serde(default = "default_call_timeout_ms")]
    pub call_timeout_ms: u64,
}

fn default_slippage_pct() -> f64 {
    0.5
}

fn default_call_timeout_ms() -> u64 {
    8_000
}

#[derive(Debug, Deserialize)]
pub struct OracleConfig {
    /// Source names in priority order: "binance", "7k", "coingecko",
    /// "aftermath_route", "7k_route"
    #[serde(default = "default_sources")]
    pub sources: Vec<String>,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            sources: default_sources(),
        }
    }
}

fn default_sources() -> Vec<String> {
    DEFAULT_SOURCE_ORDER.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Deserialize, Default)]
pub struct LogConfig {
    /// Log level: "error", "warn", "info", "debug", "trace"
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    /// Load settings from a configuration file
    pub fn new(config_path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(config_path))
            // Environment overrides the file
            // e.g. APP__GRID__WALLET_ADDRESS=0x...
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;

        s.try_deserialize()
    }

    /// Resolve the token and build a validated [`GridConfig`]
    pub fn grid_config(&self) -> GridResult<GridConfig> {
        let g = &self.grid;
        let config = GridConfig::new(
            token_by_symbol(&g.token)?,
            g.price_min,
            g.price_max,
            g.grid_count,
            g.total_capital,
            g.wallet_address.clone(),
        )
        .with_slippage_pct(g.slippage_pct)
        .with_mode(g.mode)
        .with_route_provider(g.route_provider)
        .with_call_timeout_ms(g.call_timeout_ms);

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::errors::GridError;

    fn write_config(contents: &str) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("grid_settings_{}.toml", uuid::Uuid::new_v4()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_load_with_defaults() {
        let path = write_config(
            r#"
[grid]
token = "sui"
price_min = 3.2
price_max = 4.1
grid_count = 10
total_capital = 500.0
wallet_address = "0xabc"
"#,
        );

        let settings = Settings::new(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(settings.log.level, "info");
        assert_eq!(settings.oracle.sources, vec!["binance", "7k", "coingecko"]);
        assert_eq!(settings.grid.mode, TradingMode::Balanced);
        assert_eq!(settings.grid.route_provider, RouteProvider::SevenK);

        let config = settings.grid_config().unwrap();
        assert_eq!(config.token.symbol, "SUI");
        assert_eq!(config.quote.symbol, "USDC");
        assert_eq!(config.slippage_pct, 0.5);
        assert!((config.capital_per_level() - 50.0).abs() < 1e-9);
    }

    #[test]
    fn test_load_full() {
        let path = write_config(
            r#"
[grid]
token = "WAL"
price_min = 0.3
price_max = 0.6
grid_count = 5
total_capital = 250.0
slippage_pct = 1.0
mode = "aggressive"
route_provider = "aftermath"
wallet_address = "0xabc"
call_timeout_ms = 5000

[oracle]
sources = ["coingecko"]

[log]
level = "debug"
"#,
        );

        let settings = Settings::new(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        let config = settings.grid_config().unwrap();
        assert_eq!(config.mode, TradingMode::Aggressive);
        assert_eq!(config.route_provider, RouteProvider::Aftermath);
        assert_eq!(config.call_timeout_ms, 5000);
        assert_eq!(settings.oracle.sources, vec!["coingecko"]);
        assert_eq!(settings.log.level, "debug");
    }

    #[test]
    fn test_invalid_grid_rejected() {
        let path = write_config(
            r#"
[grid]
token = "DOGE"
price_min = 1.0
price_max = 2.0
grid_count = 3
total_capital = 100.0
wallet_address = "0xabc"
"#,
        );

        let settings = Settings::new(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(matches!(settings.grid_config(), Err(GridError::UnknownToken(_))));
    }

    #[test]
    fn test_missing_file() {
        assert!(Settings::new("/nonexistent/grid_settings").is_err());
    }
}
