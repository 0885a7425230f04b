//! The loop that repeats batches until told to stop.

use crate::batch::BatchCoordinator;
use bulk_bot_core::{RunControl, TradeLedger, TradeRecord, TradeRequest};
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

pub struct ContinuousRunner {
    coordinator: BatchCoordinator,
    ledger: Arc<TradeLedger>,
    control: Arc<RunControl>,
    pause: Duration,
}

impl ContinuousRunner {
    #[must_use]
    pub fn new(
        coordinator: BatchCoordinator,
        ledger: Arc<TradeLedger>,
        control: Arc<RunControl>,
        pause: Duration,
    ) -> Self {
        Self {
            coordinator,
            ledger,
            control,
            pause,
        }
    }

    /// Runs batches until the flag is lowered, then emits the terminal
    /// stopped marker. The flag is read only between batches, so an
    /// in-flight batch always completes before a stop takes effect.
    pub async fn run(self, request: TradeRequest, batch_size: u32, repeat: bool) {
        let mut batch_no = 0;
        while self.control.is_running() {
            batch_no += 1;
            self.coordinator.run_batch(&request, batch_size, batch_no).await;
            if !repeat {
                break;
            }
            tokio::time::sleep(self.pause).await;
        }
        self.control.stop();
        self.ledger.record(TradeRecord::RunnerStopped { at: Utc::now() });
        tracing::info!(batches = batch_no, "runner stopped");
    }
}
