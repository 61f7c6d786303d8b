//! Supported Sui tokens and base-unit conversion

use std::collections::HashMap;

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use super::errors::{GridError, GridResult};

/// Identity of a tradable coin on Sui
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenInfo {
    /// Ticker symbol (e.g., "SUI")
    pub symbol: String,
    /// Display name
    pub name: String,
    /// Fully qualified coin type (`package::module::TYPE`)
    pub contract: String,
    /// On-chain decimals
    pub decimals: u32,
    /// CoinGecko id used by the CoinGecko price source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coingecko_id: Option<String>,
    /// Binance spot pair used by the Binance price source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binance_pair: Option<String>,
}

impl TokenInfo {
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        contract: impl Into<String>,
        decimals: u32,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            contract: contract.into(),
            decimals,
            coingecko_id: None,
            binance_pair: None,
        }
    }

    /// Builder: set CoinGecko id
    pub fn with_coingecko_id(mut self, id: impl Into<String>) -> Self {
        self.coingecko_id = Some(id.into());
        self
    }

    /// Builder: set Binance pair
    pub fn with_binance_pair(mut self, pair: impl Into<String>) -> Self {
        self.binance_pair = Some(pair.into());
        self
    }

    /// Convert a human amount into integer base units
    pub fn to_base_units(&self, amount: f64) -> u128 {
        to_base_units(amount, self.decimals)
    }

    /// Convert integer base units back into a human amount
    pub fn from_base_units(&self, amount: u128) -> f64 {
        from_base_units(amount, self.decimals)
    }
}

lazy_static! {
    /// Quote asset for every grid
    pub static ref USDC: TokenInfo = TokenInfo::new(
        "USDC",
        "USD Coin",
        "0xdba34672e30cb065b1f93e3ab55318768fd6fef66c15942c9f7cb846e2f900e7::usdc::USDC",
        6,
    );

    static ref TOKENS: HashMap<&'static str, TokenInfo> = {
        let mut m = HashMap::new();
        m.insert(
            "SUI",
            TokenInfo::new(
                "SUI",
                "Sui",
                "0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI",
                9,
            )
            .with_coingecko_id("sui")
            .with_binance_pair("SUIUSDT"),
        );
        m.insert(
            "WAL",
            TokenInfo::new(
                "WAL",
                "Walrus",
                "0x356a26eb9e012a68958082340d4c4116e7f55615cf27affcff209cf0ae544f59::wal::WAL",
                9,
            )
            .with_coingecko_id("walrus-2")
            .with_binance_pair("WALUSDT"),
        );
        m.insert(
            "DEEP",
            TokenInfo::new(
                "DEEP",
                "DeepBook",
                "0xdeeb7a4662eec9f2f3def03fb937a663dddaa2e215b8078a284d026b7946c270::deep::DEEP",
                6,
            )
            .with_coingecko_id("deep-book")
            .with_binance_pair("DEEPUSDT"),
        );
        m.insert(
            "IKA",
            TokenInfo::new(
                "IKA",
                "Ika",
                "0x7262fb2f7a3a14c888c438a3cd9b912469a58cf60f367352c46584262e8299aa::ika::IKA",
                9,
            )
            .with_coingecko_id("ika-network"),
        );
        m
    };
}

/// Look up a supported token by symbol (case-insensitive)
pub fn token_by_symbol(symbol: &str) -> GridResult<TokenInfo> {
    TOKENS
        .get(symbol.to_uppercase().as_str())
        .cloned()
        .ok_or_else(|| GridError::UnknownToken(symbol.to_string()))
}

/// Symbols of all supported tokens, sorted
pub fn supported_symbols() -> Vec<&'static str> {
    let mut symbols: Vec<&'static str> = TOKENS.keys().copied().collect();
    symbols.sort_unstable();
    symbols
}

/// floor(amount * 10^decimals); negative or non-finite amounts map to zero
pub fn to_base_units(amount: f64, decimals: u32) -> u128 {
    if !amount.is_finite() || amount <= 0.0 {
        return 0;
    }
    (amount * 10f64.powi(decimals as i32)).floor() as u128
}

pub fn from_base_units(amount: u128, decimals: u32) -> f64 {
    amount as f64 / 10f64.powi(decimals as i32)
}
