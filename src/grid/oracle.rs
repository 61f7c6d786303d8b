//! Price oracle - ordered fallback across independent price sources

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};

use super::errors::{GridError, GridResult};
use super::tokens::TokenInfo;
use super::types::PriceSample;

/// A single upstream price feed
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// Name used in logs and on price samples
    fn name(&self) -> &str;

    /// How long the oracle waits for this source
    fn timeout(&self) -> Duration {
        Duration::from_secs(5)
    }

    /// Fetch the current quote-denominated price of `token`
    async fn get(&self, token: &TokenInfo, timeout: Duration) -> GridResult<f64>;
}

/// Tries each source in order; the first usable price wins
#[derive(Clone, Default)]
pub struct PriceOracle {
    sources: Vec<Arc<dyn PriceSource>>,
}

impl PriceOracle {
    pub fn new(sources: Vec<Arc<dyn PriceSource>>) -> Self {
        Self { sources }
    }

    /// Builder: append a lower-priority source
    pub fn with_source(mut self, source: Arc<dyn PriceSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn source_names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Fetch a price, or `None` when every source fails
    ///
    /// Never returns an error: failures, timeouts and unusable values are
    /// logged and the next source is tried.
    pub async fn fetch_price(&self, token: &TokenInfo) -> Option<PriceSample> {
        for source in &self.sources {
            match Self::query(source.as_ref(), token).await {
                Ok(price) => {
                    debug!("{} price from {}: {}", token.symbol, source.name(), price);
                    return Some(PriceSample::new(price, source.name()));
                }
                Err(e) => warn!("Price source {} failed for {}: {}", source.name(), token.symbol, e),
            }
        }

        warn!("{}", GridError::PriceUnavailable(token.symbol.clone()));
        None
    }

    async fn query(source: &dyn PriceSource, token: &TokenInfo) -> GridResult<f64> {
        let timeout = source.timeout();
        let price = tokio::time::timeout(timeout, source.get(token, timeout))
            .await
            .map_err(|_| GridError::Timeout {
                operation: format!("price fetch from {}", source.name()),
                after_ms: timeout.as_millis() as u64,
            })??;

        if price.is_finite() && price > 0.0 {
            Ok(price)
        } else {
            Err(GridError::JsonParse(format!("unusable price value {}", price)))
        }
    }
}
