//! Deriv WebSocket integration for the bulk trading bot.
//!
//! One connection per trade: the [`TradeExecutor`] opens a [`DerivSession`],
//! drives the [`Negotiator`] through authorize → quote → purchase, hands the
//! purchased contract to the [`SettlementWatcher`], and always produces
//! exactly one outcome record, whatever happens on the wire.
//!
//! # Example
//!
//! ```ignore
//! use bulk_bot_core::{ContractType, DerivConfig, TradeRequest};
//! use bulk_bot_deriv::TradeExecutor;
//! use rust_decimal_macros::dec;
//! use secrecy::SecretString;
//!
//! # async fn run() {
//! let executor = TradeExecutor::new(DerivConfig::default(), SecretString::from("token".to_string()));
//! let request = TradeRequest {
//!     symbol: "R_10".to_string(),
//!     contract_type: ContractType::DigitMatch,
//!     stake: dec!(1.0),
//!     barrier_digit: Some(5),
//!     currency: "USD".to_string(),
//! };
//! let outcome = executor.execute(&request, 1).await;
//! println!("{}: {}", outcome.sequence, outcome.status);
//! # }
//! ```

pub mod error;
pub mod executor;
pub mod negotiator;
pub mod protocol;
pub mod session;
pub mod settlement;

pub use error::{DerivError, Result};
pub use executor::TradeExecutor;
pub use negotiator::{ContractHandle, Negotiator};
pub use protocol::Settlement;
pub use session::DerivSession;
pub use settlement::SettlementWatcher;
