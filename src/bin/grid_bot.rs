//! Grid Trading Bot Binary
//!
//! Runs the grid engine against live prices with paper route builders and a
//! paper wallet. Nothing is signed or submitted on chain.
//!
//! ## Setup
//!
//! 1. Create a config file (TOML, JSON or YAML):
//!    ```toml
//!    [grid]
//!    token = "SUI"
//!    price_min = 3.2
//!    price_max = 4.1
//!    grid_count = 10
//!    total_capital = 500.0
//!    mode = "balanced"
//!    route_provider = "7k"
//!    wallet_address = "0x..."
//!
//!    [oracle]
//!    sources = ["binance", "7k", "coingecko"]
//!    ```
//!
//! 2. Optionally override values in `.env`, e.g. `APP__GRID__WALLET_ADDRESS=0x...`
//!
//! 3. Run the bot:
//!    ```bash
//!    cargo run --bin grid_bot -- --config grid.toml
//!    ```

use std::env;
use std::sync::Arc;

use log::{error, info, warn};

use sui_grid_bot::{
    grid::{
        build_oracle, ChannelObserver, GridBotEngine, GridEvent, GridResult, PaperRouteBuilder,
        PaperWallet, RouteProvider, RouteRegistry, TradeExecutor,
    },
    Settings,
};

const DEFAULT_CONFIG_PATH: &str = "grid.toml";

#[tokio::main]
async fn main() {
    // Load .env before settings so APP__ overrides apply
    let dotenv = dotenvy::dotenv();

    let args: Vec<String> = env::args().collect();
    let config_path = if args.len() > 2 && args[1] == "--config" {
        args[2].clone()
    } else {
        DEFAULT_CONFIG_PATH.to_string()
    };

    let settings = match Settings::new(&config_path) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Failed to load config '{}': {}", config_path, e);
            std::process::exit(1);
        }
    };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(settings.log.level.as_str()))
        .init();

    match dotenv {
        Ok(path) => info!("Loaded environment from: {}", path.display()),
        Err(_) => info!("No .env file found, using system environment variables"),
    }

    if let Err(e) = run(settings).await {
        error!("Grid bot failed: {}", e);
        std::process::exit(1);
    }
}

async fn run(settings: Settings) -> GridResult<()> {
    let config = settings.grid_config()?;

    info!("Starting grid bot for {}/{}", config.token.symbol, config.quote.symbol);
    info!("Grid range: {} - {}", config.price_min, config.price_max);
    info!("Number of grids: {}", config.grid_count);
    info!("Total capital: ${}", config.total_capital);
    info!("USD per grid: ${:.2}", config.capital_per_level());
    info!("Mode: {:?}, every {:?}", config.mode, config.tick_interval());
    info!("Route provider: {}", config.route_provider);

    match config.estimate_apr() {
        Some(apr) => info!(
            "Projected APR: {:.1}% ({:.3}% per grid)",
            apr.apr_pct, apr.per_grid_pct
        ),
        None => warn!("No APR projection for this range"),
    }

    warn!("Paper mode: swaps are simulated locally");
    let routes = RouteRegistry::new()
        .with(Arc::new(PaperRouteBuilder::new(RouteProvider::Aftermath)))
        .with(Arc::new(PaperRouteBuilder::new(RouteProvider::SevenK)));

    let client = reqwest::Client::new();
    let oracle = build_oracle(settings.oracle.sources.as_slice(), client, &routes)?;
    info!("Price sources: {:?}", oracle.source_names());

    let executor = TradeExecutor::new(routes, Arc::new(PaperWallet::new()));

    let (observer, mut events) = ChannelObserver::new();
    let mut engine = GridBotEngine::new(config, oracle, executor, Arc::new(observer))?;
    engine.start().await?;
    info!("Grid bot is now RUNNING (Ctrl-C to stop)");

    loop {
        tokio::select! {
            Some(event) = events.recv() => log_event(event),
            _ = tokio::signal::ctrl_c() => {
                info!("Shutdown signal received");
                break;
            }
        }
    }

    engine.stop();
    let stats = engine.stats().await;
    info!(
        "Session summary: {} trades, volume ${:.2}, est. PnL ${:.4}, uptime {}s",
        stats.trades.len(),
        stats.volume,
        stats.pnl,
        stats.uptime_secs
    );

    Ok(())
}

fn log_event(event: GridEvent) {
    match event {
        GridEvent::PriceUpdate(price) => info!("Price: {}", price),
        GridEvent::Trade { trade, pnl, volume, .. } => info!(
            "{} {:.6} {} @ {} via {} | PnL ${:.4}, volume ${:.2}",
            trade.side, trade.amount, trade.token, trade.price, trade.via, pnl, volume
        ),
        GridEvent::Rebalance {
            price_min,
            price_max,
            price,
            ..
        } => warn!(
            "Price {} left the range, grid moved to [{:.6}, {:.6}]",
            price, price_min, price_max
        ),
        GridEvent::Error(message) => error!("{}", message),
    }
}
