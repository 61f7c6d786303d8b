//! Price sources: HTTP tickers (Binance, 7K, CoinGecko) and implied prices
//! from aggregator route quotes

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde_json::Value;

use super::config::RouteProvider;
use super::errors::{GridError, GridResult};
use super::executor::{RouteBuilder, RouteRegistry};
use super::oracle::{PriceOracle, PriceSource};
use super::tokens::{TokenInfo, USDC};

pub const BINANCE_API_URL: &str = "https://api.binance.com";
pub const SEVEN_K_API_URL: &str = "https://api.7k.ag";
pub const COINGECKO_API_URL: &str = "https://api.coingecko.com/api/v3";

/// Fallback order used when none is configured
pub const DEFAULT_SOURCE_ORDER: [&str; 3] = ["binance", "7k", "coingecko"];

/// Read a price that may be encoded as a JSON number or string
fn price_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

async fn get_json(
    client: &reqwest::Client,
    url: &str,
    query: &[(&str, &str)],
    timeout: Duration,
) -> GridResult<String> {
    let response = client
        .get(url)
        .query(query)
        .header("Accept", "application/json")
        .timeout(timeout)
        .send()
        .await?;

    let status = response.status();
    if !status.is_success() {
        return Err(GridError::Http(format!("{} returned {}", url, status)));
    }

    Ok(response.text().await?)
}

// ============================================================================
// Binance
// ============================================================================

/// Binance spot ticker for tokens with a USDT pair
pub struct BinancePriceSource {
    client: reqwest::Client,
    base_url: String,
}

impl BinancePriceSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: BINANCE_API_URL.to_string(),
        }
    }

    /// `{"symbol":"SUIUSDT","price":"1.2345"}`
    pub fn parse(body: &str) -> GridResult<f64> {
        let data: Value = serde_json::from_str(body)?;
        data.get("price")
            .and_then(price_from_value)
            .ok_or_else(|| GridError::JsonParse("missing price in Binance ticker".into()))
    }
}

#[async_trait]
impl PriceSource for BinancePriceSource {
    fn name(&self) -> &str {
        "binance"
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(5)
    }

    async fn get(&self, token: &TokenInfo, timeout: Duration) -> GridResult<f64> {
        let pair = token
            .binance_pair
            .as_deref()
            .ok_or_else(|| GridError::UnknownToken(format!("{} has no Binance pair", token.symbol)))?;

        let url = format!("{}/api/v3/ticker/price", self.base_url);
        let body = get_json(&self.client, &url, &[("symbol", pair)], timeout).await?;
        Self::parse(&body)
    }
}

// ============================================================================
// 7K
// ============================================================================

/// 7K aggregator price API keyed by coin type
pub struct SevenKPriceSource {
    client: reqwest::Client,
    base_url: String,
}

impl SevenKPriceSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: SEVEN_K_API_URL.to_string(),
        }
    }

    /// `{"<coin type>": {"price": 1.2345}}`
    pub fn parse(body: &str, contract: &str) -> GridResult<f64> {
        let data: Value = serde_json::from_str(body)?;
        let entry = match data.get(contract) {
            Some(entry) => Some(entry),
            None => data.as_object().and_then(|m| m.values().next()),
        };

        entry
            .and_then(|e| e.get("price"))
            .and_then(price_from_value)
            .ok_or_else(|| GridError::JsonParse(format!("missing 7K price for {}", contract)))
    }
}

#[async_trait]
impl PriceSource for SevenKPriceSource {
    fn name(&self) -> &str {
        "7k"
    }

    async fn get(&self, token: &TokenInfo, timeout: Duration) -> GridResult<f64> {
        let url = format!("{}/prices", self.base_url);
        let body = get_json(&self.client, &url, &[("coinTypes", token.contract.as_str())], timeout).await?;
        debug!("7K response for {}: {}", token.symbol, body);
        Self::parse(&body, &token.contract)
    }
}

// ============================================================================
// CoinGecko
// ============================================================================

/// CoinGecko simple price endpoint (no API key)
pub struct CoinGeckoPriceSource {
    client: reqwest::Client,
    base_url: String,
}

impl CoinGeckoPriceSource {
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            base_url: COINGECKO_API_URL.to_string(),
        }
    }

    /// `{"sui": {"usd": 1.2345}}`
    pub fn parse(body: &str, id: &str) -> GridResult<f64> {
        let data: Value = serde_json::from_str(body)?;
        data.get(id)
            .and_then(|e| e.get("usd"))
            .and_then(price_from_value)
            .ok_or_else(|| GridError::JsonParse(format!("missing CoinGecko price for {}", id)))
    }
}

#[async_trait]
impl PriceSource for CoinGeckoPriceSource {
    fn name(&self) -> &str {
        "coingecko"
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(8)
    }

    async fn get(&self, token: &TokenInfo, timeout: Duration) -> GridResult<f64> {
        let id = token
            .coingecko_id
            .as_deref()
            .ok_or_else(|| GridError::UnknownToken(format!("{} has no CoinGecko id", token.symbol)))?;

        let url = format!("{}/simple/price", self.base_url);
        let body = get_json(&self.client, &url, &[("ids", id), ("vs_currencies", "usd")], timeout).await?;
        Self::parse(&body, id)
    }
}

// ============================================================================
// Route quote
// ============================================================================

/// Implied price from quoting one whole token into the quote asset
pub struct RouteQuotePriceSource {
    name: String,
    builder: Arc<dyn RouteBuilder>,
    quote: TokenInfo,
}

impl RouteQuotePriceSource {
    pub fn new(builder: Arc<dyn RouteBuilder>) -> Self {
        Self {
            name: format!("{}-route", builder.provider().label().to_lowercase()),
            builder,
            quote: USDC.clone(),
        }
    }
}

#[async_trait]
impl PriceSource for RouteQuotePriceSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn get(&self, token: &TokenInfo, _timeout: Duration) -> GridResult<f64> {
        let amount_in = token.to_base_units(1.0);
        let route = self
            .builder
            .quote(&token.contract, &self.quote.contract, amount_in)
            .await?;

        let amount_out = route.amount_out.ok_or_else(|| GridError::RouteBuilder {
            provider: self.builder.provider().to_string(),
            reason: "quote has no output amount".into(),
        })?;

        Ok(self.quote.from_base_units(amount_out))
    }
}

/// Build an oracle from source names, keeping their order
///
/// `aftermath_route` and `7k_route` quote through the builder registered in
/// `routes` for that provider.
pub fn build_oracle<S: AsRef<str>>(
    names: &[S],
    client: reqwest::Client,
    routes: &RouteRegistry,
) -> GridResult<PriceOracle> {
    let mut oracle = PriceOracle::default();
    for name in names {
        let source: Arc<dyn PriceSource> = match name.as_ref().to_lowercase().as_str() {
            "binance" => Arc::new(BinancePriceSource::new(client.clone())),
            "7k" | "sevenk" => Arc::new(SevenKPriceSource::new(client.clone())),
            "coingecko" => Arc::new(CoinGeckoPriceSource::new(client.clone())),
            "aftermath_route" => {
                Arc::new(RouteQuotePriceSource::new(routes.get(RouteProvider::Aftermath)?))
            }
            "7k_route" => Arc::new(RouteQuotePriceSource::new(routes.get(RouteProvider::SevenK)?)),
            other => return Err(GridError::Config(format!("unknown price source: {}", other))),
        };
        oracle = oracle.with_source(source);
    }
    Ok(oracle)
}
