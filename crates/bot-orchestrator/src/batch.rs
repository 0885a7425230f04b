//! One batch: N concurrent trades launched together and awaited as a unit.

use bulk_bot_core::{
    OutcomeStatus, RunnerConfig, TradeLedger, TradeOutcome, TradeRecord, TradeRequest,
};
use bulk_bot_deriv::TradeExecutor;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// Runs one batch of concurrent trades and waits them out.
///
/// Launches are staggered so the broker never sees a connection burst, and
/// each trade task owns its session end-to-end and records its own outcome.
pub struct BatchCoordinator {
    executor: Arc<TradeExecutor>,
    ledger: Arc<TradeLedger>,
    stagger: Duration,
    join_timeout: Duration,
}

impl BatchCoordinator {
    #[must_use]
    pub fn new(executor: Arc<TradeExecutor>, ledger: Arc<TradeLedger>, config: &RunnerConfig) -> Self {
        Self {
            executor,
            ledger,
            stagger: config.stagger(),
            join_timeout: config.join_timeout(),
        }
    }

    /// Fires `size` trades and waits for each under the join timeout.
    ///
    /// A trade that outlives the join timeout is abandoned, not killed: it
    /// still owns its internal timeouts and records its outcome when they
    /// fire. A panicked task never recorded anything, so it is converted to
    /// an Exception outcome here to keep the one-outcome-per-trade invariant.
    pub async fn run_batch(&self, request: &TradeRequest, size: u32, batch_no: u64) {
        tracing::info!(batch_no, size, symbol = %request.symbol, "starting batch");
        self.ledger.record(TradeRecord::BatchStarted {
            batch_no,
            at: Utc::now(),
        });

        let mut tasks = Vec::with_capacity(size as usize);
        for sequence in 1..=size {
            let executor = Arc::clone(&self.executor);
            let ledger = Arc::clone(&self.ledger);
            let request = request.clone();
            let task = tokio::spawn(async move {
                let outcome = executor.execute(&request, sequence).await;
                ledger.record(TradeRecord::Outcome(outcome));
            });
            tasks.push((sequence, task));
            tokio::time::sleep(self.stagger).await;
        }

        for (sequence, task) in tasks {
            match tokio::time::timeout(self.join_timeout, task).await {
                Ok(Ok(())) => {}
                Ok(Err(err)) => {
                    tracing::error!(sequence, %err, "trade task died");
                    self.ledger.record(TradeRecord::Outcome(TradeOutcome::failed(
                        sequence,
                        request.stake,
                        OutcomeStatus::Exception,
                        format!("trade task died: {err}"),
                    )));
                }
                Err(_) => {
                    tracing::warn!(sequence, "trade exceeded the join timeout, abandoning");
                }
            }
        }

        self.ledger.record(TradeRecord::BatchCompleted {
            batch_no,
            at: Utc::now(),
        });
        tracing::info!(batch_no, "batch complete");
    }
}
