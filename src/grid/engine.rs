//! Grid bot engine - tick-driven state machine
//!
//! One timer per engine fires a tick every [`TradingMode::tick_interval`]
//! (and once immediately on start). A tick fetches a price, recenters the
//! grid if price left the range, otherwise looks for a crossed level and
//! trades it through the [`TradeExecutor`].
//!
//! [`TradingMode::tick_interval`]: super::config::TradingMode::tick_interval

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use log::{debug, error, info, warn};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use super::config::GridConfig;
use super::errors::{GridError, GridResult};
use super::events::GridObserver;
use super::executor::TradeExecutor;
use super::oracle::PriceOracle;
use super::rebalance::{rebalance, should_rebalance};
use super::state::EngineState;
use super::strategy::detect_crossing;
use super::types::{BotStatus, EngineStats, OrderSide, TickOutcome};

/// State shared between the engine handle, its timer and in-flight ticks
struct Shared {
    config: GridConfig,
    oracle: PriceOracle,
    executor: TradeExecutor,
    observer: Arc<dyn GridObserver>,
    state: Mutex<EngineState>,
    running: AtomicBool,
    /// Bumped on every start so ticks from a replaced run cannot commit
    generation: AtomicU64,
}

/// One armed run of the engine
///
/// The tick lock belongs to the run, so a tick left over from a replaced run
/// never blocks the ticks of its successor.
#[derive(Clone)]
struct Run {
    generation: u64,
    /// Held for the whole tick; a tick that cannot take it is skipped
    tick_lock: Arc<Mutex<()>>,
}

impl Run {
    fn new(generation: u64) -> Self {
        Self {
            generation,
            tick_lock: Arc::new(Mutex::new(())),
        }
    }
}

impl Shared {
    fn is_current(&self, generation: u64) -> bool {
        self.running.load(Ordering::SeqCst) && self.generation.load(Ordering::SeqCst) == generation
    }

    async fn tick(&self, run: &Run) -> TickOutcome {
        let generation = run.generation;
        let _guard = match run.tick_lock.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                debug!("Previous tick still in flight, skipping");
                return TickOutcome::Skipped;
            }
        };

        if !self.is_current(generation) {
            return TickOutcome::Skipped;
        }

        let sample = match self.oracle.fetch_price(&self.config.token).await {
            Some(sample) => sample,
            None => {
                debug!("No price for {} this tick", self.config.token.symbol);
                return TickOutcome::PriceUnavailable;
            }
        };

        if !self.is_current(generation) {
            debug!("Engine stopped during price fetch, dropping sample");
            return TickOutcome::Skipped;
        }

        let price = sample.price;
        let mut state = self.state.lock().await;

        // stop() or start() may have won the race for the state lock
        if !self.is_current(generation) {
            debug!("Engine stopped while waiting for state, dropping sample");
            return TickOutcome::Skipped;
        }
        self.observer.on_price_update(price);

        if should_rebalance(price, state.bounds.price_min, state.bounds.price_max) {
            let bounds = rebalance(
                price,
                state.bounds.price_min,
                state.bounds.price_max,
                self.config.grid_count,
            );
            info!(
                "Price {} left [{}, {}], rebalanced grid to [{:.6}, {:.6}]",
                price, state.bounds.price_min, state.bounds.price_max, bounds.price_min, bounds.price_max
            );
            state.apply_rebalance(bounds);
            self.observer
                .on_rebalance(state.bounds.price_min, state.bounds.price_max, &state.bounds.levels, price);

            return TickOutcome::Rebalanced {
                price,
                price_min: state.bounds.price_min,
                price_max: state.bounds.price_max,
            };
        }

        let crossed = detect_crossing(
            state.last_price,
            price,
            &state.bounds.levels,
            state.last_crossed_level,
        );

        let (level, last_price) = match (crossed, state.last_price) {
            (Some(level), Some(last_price)) => (level, last_price),
            _ => {
                state.last_price = Some(price);
                return TickOutcome::NoCrossing { price };
            }
        };

        let side = OrderSide::from_move(last_price, price);
        info!("Price {} crossed level {} -> {}", price, level, side);
        drop(state);

        let capital = self.config.capital_per_level();
        let result = self.executor.execute_trade(side, price, capital, &self.config).await;

        // Checked under the state guard so a restart cannot interleave
        let mut state = self.state.lock().await;
        if !self.is_current(generation) {
            match &result {
                Ok(trade) => warn!(
                    "Engine stopped while trading; {} settled as {:?} but is not recorded",
                    trade.side, trade.digest
                ),
                Err(e) => debug!("Engine stopped while trading: {}", e),
            }
            return TickOutcome::Skipped;
        }
        state.mark_crossed(level, price);

        match result {
            Ok(trade) => {
                state.record_trade(trade.clone(), capital);
                info!(
                    "Trade recorded: pnl={:.4}, volume={:.2}, trades={}",
                    state.pnl,
                    state.volume,
                    state.ledger.len()
                );
                self.observer
                    .on_trade(&trade, state.pnl, state.volume, state.ledger.as_slice());
                TickOutcome::Traded { level, side }
            }
            Err(e) => {
                let message = if e.is_user_rejection() {
                    "Trade rejected in wallet".to_string()
                } else {
                    format!("Trade failed: {}", e)
                };
                error!("{} at level {}: {}", side, level, message);
                self.observer.on_error(&message);
                TickOutcome::TradeFailed {
                    level,
                    side,
                    reason: e.to_string(),
                }
            }
        }
    }
}

/// Grid trading engine for a single token pair
pub struct GridBotEngine {
    shared: Arc<Shared>,
    run: Run,
    status: BotStatus,
    timer: Option<JoinHandle<()>>,
}

impl GridBotEngine {
    /// Validate the configuration and build an idle engine
    pub fn new(
        config: GridConfig,
        oracle: PriceOracle,
        executor: TradeExecutor,
        observer: Arc<dyn GridObserver>,
    ) -> GridResult<Self> {
        config.validate()?;

        if oracle.is_empty() {
            return Err(GridError::InvalidConfig("no price sources configured".into()));
        }

        if !executor.routes().contains(config.route_provider) {
            return Err(GridError::InvalidConfig(format!(
                "no route builder for provider {}",
                config.route_provider
            )));
        }

        let state = EngineState::new(&config);
        Ok(Self {
            shared: Arc::new(Shared {
                config,
                oracle,
                executor,
                observer,
                state: Mutex::new(state),
                running: AtomicBool::new(false),
                generation: AtomicU64::new(0),
            }),
            run: Run::new(0),
            status: BotStatus::Idle,
            timer: None,
        })
    }

    pub fn config(&self) -> &GridConfig {
        &self.shared.config
    }

    pub fn status(&self) -> BotStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status.is_running()
    }

    /// Arm the tick timer; the first tick fires immediately
    ///
    /// Starting a running engine replaces its timer and live state. A stopped
    /// engine cannot be restarted.
    pub async fn start(&mut self) -> GridResult<()> {
        if self.status == BotStatus::Stopped {
            return Err(GridError::InvalidState {
                current_state: self.status.to_string(),
            });
        }

        if let Some(timer) = self.timer.take() {
            info!("Restarting grid engine, replacing previous timer");
            timer.abort();
        }

        let generation = self.shared.generation.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut state = self.shared.state.lock().await;
            *state = EngineState::new(&self.shared.config);
            state.started_at = Some(Utc::now());
            info!(
                "Starting grid engine for {}/{}: levels {:?}",
                self.shared.config.token.symbol, self.shared.config.quote.symbol, state.bounds.levels
            );
        }
        self.shared.running.store(true, Ordering::SeqCst);
        self.run = Run::new(generation);

        let shared = self.shared.clone();
        let run = self.run.clone();
        let period = shared.config.tick_interval();
        self.timer = Some(tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if !shared.is_current(generation) {
                    break;
                }
                let shared = shared.clone();
                let run = run.clone();
                tokio::spawn(async move {
                    let outcome = shared.tick(&run).await;
                    debug!("Tick outcome: {:?}", outcome);
                });
            }
        }));

        self.status = BotStatus::Running;
        Ok(())
    }

    /// Disarm the timer; in-flight ticks finish without committing
    ///
    /// No-op unless the engine is running.
    pub fn stop(&mut self) {
        if self.status != BotStatus::Running {
            return;
        }

        self.shared.running.store(false, Ordering::SeqCst);
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
        self.status = BotStatus::Stopped;
        info!("Grid engine stopped");
    }

    /// Stop and discard all live state
    pub async fn reset(&mut self) {
        self.stop();
        *self.shared.state.lock().await = EngineState::new(&self.shared.config);
    }

    /// Run one tick now, outside the timer
    ///
    /// Returns [`TickOutcome::Skipped`] unless the engine is running.
    pub async fn tick(&self) -> TickOutcome {
        self.shared.tick(&self.run).await
    }

    /// Snapshot of accounting and grid state
    pub async fn stats(&self) -> EngineStats {
        let state = self.shared.state.lock().await;
        EngineStats {
            pnl: state.pnl,
            volume: state.volume,
            trades: state.ledger.to_vec(),
            levels: state.bounds.levels.clone(),
            price_min: state.bounds.price_min,
            price_max: state.bounds.price_max,
            last_price: state.last_price,
            running: self.is_running(),
            uptime_secs: state.uptime_secs(),
        }
    }
}

impl Drop for GridBotEngine {
    fn drop(&mut self) {
        self.shared.running.store(false, Ordering::SeqCst);
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}
