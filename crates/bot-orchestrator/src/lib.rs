//! Orchestration for bulk trading runs.
//!
//! A [`BotActor`] owns the run lifecycle and is driven over a command
//! channel; its [`BotHandle`] is the presentation boundary: commands in,
//! records and counters out. Underneath, the [`BatchCoordinator`] fires one
//! staggered batch of concurrent trades and the [`ContinuousRunner`] repeats
//! batches until the run flag is lowered.

pub mod batch;
pub mod bot_actor;
pub mod bot_handle;
pub mod commands;
pub mod runner;

pub use batch::BatchCoordinator;
pub use bot_actor::BotActor;
pub use bot_handle::BotHandle;
pub use commands::{BotCommand, BotState, BotStatus, RunSpec};
pub use runner::ContinuousRunner;

use bulk_bot_core::{AppConfig, RunControl, TradeLedger};
use secrecy::SecretString;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Spawns a bot actor onto the runtime and returns its handle.
#[must_use]
pub fn spawn_bot(config: AppConfig, token: SecretString) -> BotHandle {
    let (tx, rx) = mpsc::channel(32);
    let ledger = Arc::new(TradeLedger::new());
    let control = Arc::new(RunControl::new());
    let max_batch_size = config.runner.max_batch_size;
    let actor = BotActor::new(config, token, Arc::clone(&ledger), Arc::clone(&control), rx);
    tokio::spawn(actor.run());
    BotHandle::new(tx, ledger, control, max_batch_size)
}
