use crate::commands::{BotCommand, BotStatus, RunSpec};
use anyhow::{Context, Result};
use bulk_bot_core::{AggregateStats, RunControl, TradeLedger, TradeRecord};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Cloneable front end to a bot actor.
///
/// This is the presentation boundary: start/stop commands go in, and the
/// live record stream, the aggregate snapshot, and the running indicator
/// come out.
#[derive(Clone)]
pub struct BotHandle {
    tx: mpsc::Sender<BotCommand>,
    ledger: Arc<TradeLedger>,
    control: Arc<RunControl>,
    max_batch_size: u32,
}

impl BotHandle {
    #[must_use]
    pub(crate) fn new(
        tx: mpsc::Sender<BotCommand>,
        ledger: Arc<TradeLedger>,
        control: Arc<RunControl>,
        max_batch_size: u32,
    ) -> Self {
        Self {
            tx,
            ledger,
            control,
            max_batch_size,
        }
    }

    /// Validates and submits a run request.
    ///
    /// # Errors
    /// Returns an error if the spec violates an invariant or the actor is gone.
    pub async fn start(&self, spec: RunSpec) -> Result<()> {
        spec.validate(self.max_batch_size)?;
        self.tx
            .send(BotCommand::Start(Box::new(spec)))
            .await
            .context("bot actor is gone")
    }

    /// Requests a cooperative stop; the in-flight batch finishes first.
    ///
    /// # Errors
    /// Returns an error if the actor is gone.
    pub async fn stop(&self) -> Result<()> {
        self.tx.send(BotCommand::Stop).await.context("bot actor is gone")
    }

    /// Shuts the actor down after the in-flight batch finishes.
    ///
    /// # Errors
    /// Returns an error if the actor is gone.
    pub async fn shutdown(&self) -> Result<()> {
        self.tx
            .send(BotCommand::Shutdown)
            .await
            .context("bot actor is gone")
    }

    /// Queries the actor for a status snapshot.
    ///
    /// # Errors
    /// Returns an error if the actor is gone.
    pub async fn status(&self) -> Result<BotStatus> {
        let (tx, rx) = oneshot::channel();
        self.tx
            .send(BotCommand::GetStatus(tx))
            .await
            .context("bot actor is gone")?;
        rx.await.context("bot actor dropped the status query")
    }

    /// Subscribes to records as they are appended to the session log.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TradeRecord> {
        self.ledger.subscribe()
    }

    #[must_use]
    pub fn stats(&self) -> AggregateStats {
        self.ledger.stats()
    }

    #[must_use]
    pub fn records(&self) -> Vec<TradeRecord> {
        self.ledger.records()
    }

    /// Whether a batch run is currently in progress.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.control.is_running()
    }
}
