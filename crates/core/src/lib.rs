pub mod config;
pub mod config_loader;
pub mod ledger;
pub mod markets;
pub mod records;

pub use config::{AppConfig, DerivConfig, RunnerConfig};
pub use config_loader::ConfigLoader;
pub use ledger::{AggregateStats, RunControl, TradeLedger};
pub use records::{ContractType, OutcomeStatus, TradeOutcome, TradeRecord, TradeRequest};
