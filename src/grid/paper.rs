//! Paper collaborators
//!
//! Fabricate routes and settlement references locally so the engine can run
//! end to end against live prices without a wallet. Nothing is sent on chain.

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use log::info;
use serde_json::json;
use uuid::Uuid;

use super::config::RouteProvider;
use super::errors::{GridError, GridResult};
use super::executor::{Route, RouteBuilder, UnsignedTransaction, WalletSigner};

/// Route builder that echoes the request back as a single-hop route
#[derive(Debug)]
pub struct PaperRouteBuilder {
    provider: RouteProvider,
}

impl PaperRouteBuilder {
    pub fn new(provider: RouteProvider) -> Self {
        Self { provider }
    }
}

#[async_trait]
impl RouteBuilder for PaperRouteBuilder {
    fn provider(&self) -> RouteProvider {
        self.provider
    }

    async fn quote(&self, token_in: &str, token_out: &str, amount_in: u128) -> GridResult<Route> {
        if amount_in == 0 {
            return Err(GridError::RouteBuilder {
                provider: self.provider.to_string(),
                reason: "zero input amount".into(),
            });
        }

        Ok(Route {
            provider: self.provider,
            token_in: token_in.to_string(),
            token_out: token_out.to_string(),
            amount_in,
            amount_out: None,
            payload: json!({ "hops": 1, "paper": true }),
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
            payload: json!({
                "kind": "paper_swap",
                "route": serde_json::to_value(route)?,
            }),
        })
    }
}

/// Wallet that approves every transaction with a random digest
#[derive(Debug, Default)]
pub struct PaperWallet {
    submitted: AtomicU64,
}

impl PaperWallet {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WalletSigner for PaperWallet {
    async fn sign_and_submit(&self, tx: UnsignedTransaction) -> GridResult<String> {
        let n = self.submitted.fetch_add(1, Ordering::SeqCst) + 1;
        let digest = format!("paper-{}", Uuid::new_v4());
        info!("[PAPER] #{} {} swap for {} -> {}", n, tx.provider, tx.sender, digest);
        Ok(digest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::grid::config::GridConfig;
    use crate::grid::executor::{RouteRegistry, TradeExecutor};
    use crate::grid::tokens::token_by_symbol;
    use crate::grid::types::OrderSide;

    #[tokio::test]
    async fn test_paper_route_round_trip() {
        let builder = PaperRouteBuilder::new(RouteProvider::Aftermath);
        let route = builder.quote("0x2::sui::SUI", "usdc", 1_000).await.unwrap();
        assert_eq!(route.provider, RouteProvider::Aftermath);
        assert_eq!(route.amount_in, 1_000);

        let tx = builder.build_transaction(&route, "0xabc", 0.005).await.unwrap();
        assert_eq!(tx.sender, "0xabc");
        assert_eq!(tx.payload["route"]["token_in"], "0x2::sui::SUI");

        assert!(builder.quote("a", "b", 0).await.is_err());
    }

    #[tokio::test]
    async fn test_paper_wallet_digests() {
        let wallet = PaperWallet::new();
        let builder = PaperRouteBuilder::new(RouteProvider::SevenK);
        let route = builder.quote("a", "b", 10).await.unwrap();
        let tx = builder.build_transaction(&route, "0xabc", 0.005).await.unwrap();

        let first = wallet.sign_and_submit(tx.clone()).await.unwrap();
        let second = wallet.sign_and_submit(tx).await.unwrap();
        assert!(first.starts_with("paper-"));
        assert_ne!(first, second);
    }

    #[tokio::test]
    async fn test_paper_executor_trade() {
        let routes = RouteRegistry::new()
            .with(Arc::new(PaperRouteBuilder::new(RouteProvider::SevenK)))
            .with(Arc::new(PaperRouteBuilder::new(RouteProvider::Aftermath)));
        let executor = TradeExecutor::new(routes, Arc::new(PaperWallet::new()));
        let config = GridConfig::new(token_by_symbol("WAL").unwrap(), 0.3, 0.6, 5, 500.0, "0xabc")
            .with_route_provider(RouteProvider::Aftermath);

        let trade = executor
            .execute_trade(OrderSide::Buy, 0.4, config.capital_per_level(), &config)
            .await
            .unwrap();
        assert_eq!(trade.via, "Aftermath");
        assert!(trade.digest.unwrap().starts_with("paper-"));
        assert!((trade.amount - 250.0).abs() < 1e-9);
    }
}
