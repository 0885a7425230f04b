use crate::batch::BatchCoordinator;
use crate::commands::{BotCommand, BotState, BotStatus};
use crate::runner::ContinuousRunner;
use bulk_bot_core::{AppConfig, RunControl, TradeLedger};
use bulk_bot_deriv::TradeExecutor;
use chrono::Utc;
use secrecy::SecretString;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Owns the run lifecycle and processes commands from the channel.
pub struct BotActor {
    config: AppConfig,
    executor: Arc<TradeExecutor>,
    ledger: Arc<TradeLedger>,
    control: Arc<RunControl>,
    rx: mpsc::Receiver<BotCommand>,
    runner: Option<JoinHandle<()>>,
}

impl BotActor {
    #[must_use]
    pub fn new(
        config: AppConfig,
        token: SecretString,
        ledger: Arc<TradeLedger>,
        control: Arc<RunControl>,
        rx: mpsc::Receiver<BotCommand>,
    ) -> Self {
        let executor = Arc::new(TradeExecutor::new(config.deriv.clone(), token));
        Self {
            config,
            executor,
            ledger,
            control,
            rx,
            runner: None,
        }
    }

    fn state(&self) -> BotState {
        if self.control.is_running() {
            BotState::Running
        } else {
            BotState::Idle
        }
    }

    /// Whether the previous run's loop is still winding down. A stop lowers
    /// the flag before the in-flight batch finishes, so the flag alone is
    /// not enough to decide whether a new run may begin.
    fn runner_active(&self) -> bool {
        self.runner.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Runs the actor's command loop until shutdown.
    pub async fn run(mut self) {
        while let Some(command) = self.rx.recv().await {
            match command {
                BotCommand::Start(spec) => {
                    if self.control.is_running() || self.runner_active() {
                        tracing::warn!("run already in progress, ignoring start");
                        continue;
                    }
                    if let Err(err) = spec.validate(self.config.runner.max_batch_size) {
                        tracing::error!(%err, "rejecting run request");
                        continue;
                    }
                    tracing::info!(
                        symbol = %spec.request.symbol,
                        contract_type = %spec.request.contract_type,
                        batch_size = spec.batch_size,
                        repeat = spec.repeat,
                        "starting run"
                    );
                    // New run session: fresh log and totals.
                    self.ledger.reset();
                    self.control.start();
                    let coordinator = BatchCoordinator::new(
                        Arc::clone(&self.executor),
                        Arc::clone(&self.ledger),
                        &self.config.runner,
                    );
                    let runner = ContinuousRunner::new(
                        coordinator,
                        Arc::clone(&self.ledger),
                        Arc::clone(&self.control),
                        self.config.runner.batch_pause(),
                    );
                    self.runner = Some(tokio::spawn(runner.run(
                        spec.request,
                        spec.batch_size,
                        spec.repeat,
                    )));
                }
                BotCommand::Stop => {
                    if !self.control.is_running() {
                        tracing::warn!("no run in progress, ignoring stop");
                        continue;
                    }
                    tracing::info!("stop requested, the in-flight batch will finish");
                    self.control.stop();
                }
                BotCommand::GetStatus(tx) => {
                    let status = BotStatus {
                        state: self.state(),
                        stats: self.ledger.stats(),
                        records: self.ledger.len(),
                        last_heartbeat: Utc::now(),
                    };
                    let _ = tx.send(status);
                }
                BotCommand::Shutdown => {
                    self.control.stop();
                    if let Some(runner) = self.runner.take() {
                        // Let the in-flight batch finish and emit its marker.
                        let _ = runner.await;
                    }
                    break;
                }
            }
        }
        tracing::info!("bot actor stopped");
    }
}
