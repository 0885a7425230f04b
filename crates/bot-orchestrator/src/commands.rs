use bulk_bot_core::{AggregateStats, TradeRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::oneshot;

#[derive(Debug)]
pub enum BotCommand {
    Start(Box<RunSpec>),
    Stop,
    GetStatus(oneshot::Sender<BotStatus>),
    Shutdown,
}

/// One run request from the presentation side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSpec {
    pub request: TradeRequest,
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,
    /// Keep firing batches until stopped, rather than a single batch.
    #[serde(default)]
    pub repeat: bool,
}

const fn default_batch_size() -> u32 {
    10
}

impl RunSpec {
    /// Checks the trade request invariants and the batch size bound.
    ///
    /// # Errors
    /// Returns an error naming the violated constraint.
    pub fn validate(&self, max_batch_size: u32) -> anyhow::Result<()> {
        self.request.validate()?;
        if self.batch_size > max_batch_size {
            anyhow::bail!(
                "batch size {} exceeds the configured maximum {max_batch_size}",
                self.batch_size
            );
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotStatus {
    pub state: BotState,
    pub stats: AggregateStats,
    /// Records in the session log, markers included.
    pub records: usize,
    pub last_heartbeat: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BotState {
    Idle,
    Running,
}
