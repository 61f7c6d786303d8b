//! Trade execution - route building and delegated signing (mockable for tests)

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::config::{GridConfig, RouteProvider};
use super::errors::{GridError, GridResult};
use super::tokens::TokenInfo;
use super::types::{OrderSide, Trade};

/// Share of the gross grid step assumed to survive fees and slippage
pub const POST_FEE_RETENTION: f64 = 0.85;

/// A priced swap path from a route provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Route {
    pub provider: RouteProvider,
    pub token_in: String,
    pub token_out: String,
    /// Input amount in base units
    pub amount_in: u128,
    /// Expected output in base units, when the provider reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount_out: Option<u128>,
    /// Provider-specific route body, passed back untouched when building
    #[serde(default)]
    pub payload: Value,
}

/// Transaction ready for the wallet; the engine never signs it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnsignedTransaction {
    pub provider: RouteProvider,
    /// Address expected to sign
    pub sender: String,
    /// Slippage tolerance baked into the transaction (fraction)
    pub slippage: f64,
    /// Serialized transaction block
    pub payload: Value,
}

/// Liquidity router that turns a token pair and amount into a swap transaction
#[async_trait]
pub trait RouteBuilder: Send + Sync {
    fn provider(&self) -> RouteProvider;

    /// Find a route for `amount_in` base units of `token_in`
    async fn quote(&self, token_in: &str, token_out: &str, amount_in: u128) -> GridResult<Route>;

    /// Build the unsigned transaction executing `route` for `wallet_address`
    async fn build_transaction(
        &self,
        route: &Route,
        wallet_address: &str,
        slippage: f64,
    ) -> GridResult<UnsignedTransaction>;
}

/// The user's connected wallet
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Sign and submit, returning the transaction digest
    ///
    /// Implementations return [`GridError::TradeRejectedByUser`] when the user
    /// declines and any other error for submission failures.
    async fn sign_and_submit(&self, tx: UnsignedTransaction) -> GridResult<String>;
}

/// Route builders keyed by provider
#[derive(Clone, Default)]
pub struct RouteRegistry {
    builders: HashMap<RouteProvider, Arc<dyn RouteBuilder>>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a builder under its own provider, replacing any previous one
    pub fn register(&mut self, builder: Arc<dyn RouteBuilder>) {
        self.builders.insert(builder.provider(), builder);
    }

    /// Builder: register and return self
    pub fn with(mut self, builder: Arc<dyn RouteBuilder>) -> Self {
        self.register(builder);
        self
    }

    pub fn get(&self, provider: RouteProvider) -> GridResult<Arc<dyn RouteBuilder>> {
        self.builders
            .get(&provider)
            .cloned()
            .ok_or_else(|| GridError::UnknownRouteProvider(provider.to_string()))
    }

    pub fn contains(&self, provider: RouteProvider) -> bool {
        self.builders.contains_key(&provider)
    }
}

/// Sizing of one grid trade
#[derive(Debug, Clone)]
pub struct SwapRequest {
    pub side: OrderSide,
    pub token_in: TokenInfo,
    pub token_out: TokenInfo,
    /// Amount of `token_in` spent, human units
    pub amount_in: f64,
    /// Amount of `token_in` spent, base units
    pub amount_in_base: u128,
    /// Base-asset amount the trade represents
    pub base_amount: f64,
}

impl SwapRequest {
    /// BUY spends exactly `capital_per_level` of the quote asset;
    /// SELL sells `capital_per_level / price` of the base asset.
    pub fn for_side(side: OrderSide, price: f64, capital_per_level: f64, config: &GridConfig) -> Self {
        let base_amount = capital_per_level / price;
        let (token_in, token_out, amount_in) = match side {
            OrderSide::Buy => (config.quote.clone(), config.token.clone(), capital_per_level),
            OrderSide::Sell => (config.token.clone(), config.quote.clone(), base_amount),
        };
        let amount_in_base = token_in.to_base_units(amount_in);

        Self {
            side,
            token_in,
            token_out,
            amount_in,
            amount_in_base,
            base_amount,
        }
    }
}

/// Estimated profit of one completed grid half-cycle, after fees
///
/// `(grid_spacing / price) * capital_per_level * POST_FEE_RETENTION`; an
/// approximation, not an on-chain reconciliation.
pub fn estimate_grid_profit(grid_spacing: f64, price: f64, capital_per_level: f64) -> f64 {
    if price <= 0.0 {
        return 0.0;
    }
    (grid_spacing / price) * capital_per_level * POST_FEE_RETENTION
}

/// Run `fut`, failing with [`GridError::Timeout`] after `after`
pub(crate) async fn with_timeout<T, F>(operation: &str, after: Duration, fut: F) -> GridResult<T>
where
    F: Future<Output = GridResult<T>>,
{
    tokio::time::timeout(after, fut)
        .await
        .map_err(|_| GridError::Timeout {
            operation: operation.to_string(),
            after_ms: after.as_millis() as u64,
        })?
}

/// Sizes trades, gets them routed and hands them to the wallet
#[derive(Clone)]
pub struct TradeExecutor {
    routes: RouteRegistry,
    wallet: Arc<dyn WalletSigner>,
}

impl TradeExecutor {
    pub fn new(routes: RouteRegistry, wallet: Arc<dyn WalletSigner>) -> Self {
        Self { routes, wallet }
    }

    pub fn routes(&self) -> &RouteRegistry {
        &self.routes
    }

    /// Execute one grid trade at `price`
    ///
    /// Errors are returned to the caller; user rejection comes back as
    /// [`GridError::TradeRejectedByUser`], everything else that fails while
    /// quoting, building or submitting as [`GridError::TradeExecution`].
    pub async fn execute_trade(
        &self,
        side: OrderSide,
        price: f64,
        capital_per_level: f64,
        config: &GridConfig,
    ) -> GridResult<Trade> {
        let request = SwapRequest::for_side(side, price, capital_per_level, config);
        if request.amount_in_base == 0 {
            return Err(GridError::TradeExecution(format!(
                "{} amount rounds to zero base units",
                request.token_in.symbol
            )));
        }

        let builder = self.routes.get(config.route_provider)?;
        let timeout = config.call_timeout();

        let route = with_timeout(
            "route quote",
            timeout,
            builder.quote(&request.token_in.contract, &request.token_out.contract, request.amount_in_base),
        )
        .await
        .map_err(Self::as_execution_error)?;

        let tx = with_timeout(
            "transaction build",
            timeout,
            builder.build_transaction(&route, &config.wallet_address, config.slippage()),
        )
        .await
        .map_err(Self::as_execution_error)?;

        let digest = with_timeout("wallet signing", timeout, self.wallet.sign_and_submit(tx))
            .await
            .map_err(|e| {
                if e.is_user_rejection() {
                    warn!("{} {} rejected in wallet", side, config.token.symbol);
                }
                Self::as_execution_error(e)
            })?;

        info!(
            "{} {:.6} {} @ {} via {} ({})",
            side, request.base_amount, config.token.symbol, price, config.route_provider, digest
        );

        Ok(Trade::new(
            side,
            price,
            request.base_amount,
            config.token.symbol.clone(),
            config.route_provider.label(),
            Some(digest),
        ))
    }

    fn as_execution_error(err: GridError) -> GridError {
        match err {
            GridError::TradeRejectedByUser | GridError::TradeExecution(_) => err,
            other => GridError::TradeExecution(other.to_string()),
        }
    }
}

// ============================================================================
// Mock Implementations for Testing
// ============================================================================

/// Mock collaborators for exercising the engine without network or wallet.
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Mutex;

    use crate::grid::oracle::PriceSource;

    enum PriceBehavior {
        Fixed(f64),
        Sequence(Mutex<VecDeque<Option<f64>>>),
        Failing,
        Hanging,
        Delayed(f64, Duration),
    }

    /// Mock price source
    pub struct MockPriceSource {
        name: String,
        behavior: PriceBehavior,
        calls: AtomicUsize,
    }

    impl MockPriceSource {
        fn with_behavior(name: &str, behavior: PriceBehavior) -> Self {
            Self {
                name: name.to_string(),
                behavior,
                calls: AtomicUsize::new(0),
            }
        }

        /// Always returns `price`
        pub fn fixed(name: &str, price: f64) -> Self {
            Self::with_behavior(name, PriceBehavior::Fixed(price))
        }

        /// Returns the prices in order; `None` entries and exhaustion fail
        pub fn sequence(name: &str, prices: Vec<Option<f64>>) -> Self {
            Self::with_behavior(name, PriceBehavior::Sequence(Mutex::new(prices.into())))
        }

        pub fn failing(name: &str) -> Self {
            Self::with_behavior(name, PriceBehavior::Failing)
        }

        /// Never resolves; only the oracle timeout ends the call
        pub fn hanging(name: &str) -> Self {
            Self::with_behavior(name, PriceBehavior::Hanging)
        }

        /// Returns `price` after sleeping for `delay`
        pub fn delayed(name: &str, price: f64, delay: Duration) -> Self {
            Self::with_behavior(name, PriceBehavior::Delayed(price, delay))
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PriceSource for MockPriceSource {
        fn name(&self) -> &str {
            &self.name
        }

        async fn get(&self, _token: &TokenInfo, _timeout: Duration) -> GridResult<f64> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behavior {
                PriceBehavior::Fixed(price) => Ok(*price),
                PriceBehavior::Sequence(prices) => prices
                    .lock()
                    .await
                    .pop_front()
                    .flatten()
                    .ok_or_else(|| GridError::Http("Mock feed gap".into())),
                PriceBehavior::Failing => Err(GridError::Http("Mock failure".into())),
                PriceBehavior::Hanging => std::future::pending().await,
                PriceBehavior::Delayed(price, delay) => {
                    tokio::time::sleep(*delay).await;
                    Ok(*price)
                }
            }
        }
    }

    /// Mock route builder recording every quote request
    pub struct MockRouteBuilder {
        provider: RouteProvider,
        pub quotes: Arc<Mutex<Vec<(String, String, u128)>>>,
        pub should_fail: Arc<Mutex<bool>>,
        pub amount_out: Arc<Mutex<Option<u128>>>,
    }

    impl MockRouteBuilder {
        pub fn new(provider: RouteProvider) -> Self {
            Self {
                provider,
                quotes: Arc::new(Mutex::new(Vec::new())),
                should_fail: Arc::new(Mutex::new(false)),
                amount_out: Arc::new(Mutex::new(None)),
            }
        }

        pub async fn set_should_fail(&self, fail: bool) {
            *self.should_fail.lock().await = fail;
        }

        /// Expected output reported on every subsequent quote
        pub async fn set_amount_out(&self, amount_out: Option<u128>) {
            *self.amount_out.lock().await = amount_out;
        }
    }

    #[async_trait]
    impl RouteBuilder for MockRouteBuilder {
        fn provider(&self) -> RouteProvider {
            self.provider
        }

        async fn quote(&self, token_in: &str, token_out: &str, amount_in: u128) -> GridResult<Route> {
            if *self.should_fail.lock().await {
                return Err(GridError::RouteBuilder {
                    provider: self.provider.to_string(),
                    reason: "Mock failure".into(),
                });
            }

            self.quotes
                .lock()
                .await
                .push((token_in.to_string(), token_out.to_string(), amount_in));

            Ok(Route {
                provider: self.provider,
                token_in: token_in.to_string(),
                token_out: token_out.to_string(),
                amount_in,
                amount_out: *self.amount_out.lock().await,
                payload: Value::Null,
            })
        }

        async fn build_transaction(
            &self,
            route: &Route,
            wallet_address: &str,
            slippage: f64,
        ) -> GridResult<UnsignedTransaction> {
            Ok(UnsignedTransaction {
                provider: route.provider,
                sender: wallet_address.to_string(),
                slippage,
                payload: serde_json::to_value(route)?,
            })
        }
    }

    /// How the mock wallet answers a signing request
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum WalletResponse {
        Approve,
        /// Approve once `Duration` has elapsed
        ApproveAfter(Duration),
        Reject,
        Fail,
    }

    /// Mock wallet
    pub struct MockWalletSigner {
        pub submitted: Arc<Mutex<Vec<UnsignedTransaction>>>,
        pub response: Arc<Mutex<WalletResponse>>,
        next_digest: AtomicUsize,
    }

    impl MockWalletSigner {
        pub fn new() -> Self {
            Self {
                submitted: Arc::new(Mutex::new(Vec::new())),
                response: Arc::new(Mutex::new(WalletResponse::Approve)),
                next_digest: AtomicUsize::new(1),
            }
        }

        pub async fn set_response(&self, response: WalletResponse) {
            *self.response.lock().await = response;
        }
    }

    impl Default for MockWalletSigner {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl WalletSigner for MockWalletSigner {
        async fn sign_and_submit(&self, tx: UnsignedTransaction) -> GridResult<String> {
            let response = *self.response.lock().await;
            match response {
                WalletResponse::Approve | WalletResponse::ApproveAfter(_) => {
                    if let WalletResponse::ApproveAfter(delay) = response {
                        tokio::time::sleep(delay).await;
                    }
                    self.submitted.lock().await.push(tx);
                    let n = self.next_digest.fetch_add(1, Ordering::SeqCst);
                    Ok(format!("mock-digest-{}", n))
                }
                WalletResponse::Reject => Err(GridError::TradeRejectedByUser),
                WalletResponse::Fail => Err(GridError::Wallet("Mock submit failure".into())),
            }
        }
    }
}
