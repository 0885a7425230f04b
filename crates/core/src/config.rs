use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub deriv: DerivConfig,
    #[serde(default)]
    pub runner: RunnerConfig,
}

/// Connection and per-call timing for the Deriv WebSocket endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DerivConfig {
    #[serde(default = "default_ws_url")]
    pub ws_url: String,
    #[serde(default = "default_app_id")]
    pub app_id: u32,
    /// Bound on connect, send, and single-message receive calls.
    #[serde(default = "default_call_timeout")]
    pub call_timeout_secs: u64,
    /// Bound on the wait for a quote after requesting one.
    #[serde(default = "default_exchange_timeout")]
    pub proposal_timeout_secs: u64,
    /// Bound on the wait for a purchase confirmation.
    #[serde(default = "default_exchange_timeout")]
    pub buy_timeout_secs: u64,
    /// Overall bound on the wait for a contract to settle.
    #[serde(default = "default_settlement_timeout")]
    pub settlement_timeout_secs: u64,
}

fn default_ws_url() -> String {
    "wss://ws.derivws.com/websockets/v3".to_string()
}

const fn default_app_id() -> u32 {
    1089
}

const fn default_call_timeout() -> u64 {
    8
}

const fn default_exchange_timeout() -> u64 {
    6
}

const fn default_settlement_timeout() -> u64 {
    20
}

impl Default for DerivConfig {
    fn default() -> Self {
        Self {
            ws_url: default_ws_url(),
            app_id: default_app_id(),
            call_timeout_secs: default_call_timeout(),
            proposal_timeout_secs: default_exchange_timeout(),
            buy_timeout_secs: default_exchange_timeout(),
            settlement_timeout_secs: default_settlement_timeout(),
        }
    }
}

impl DerivConfig {
    /// Full endpoint URL with the application identifier attached.
    #[must_use]
    pub fn endpoint_url(&self) -> String {
        format!("{}?app_id={}", self.ws_url, self.app_id)
    }

    #[must_use]
    pub const fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }

    #[must_use]
    pub const fn proposal_timeout(&self) -> Duration {
        Duration::from_secs(self.proposal_timeout_secs)
    }

    #[must_use]
    pub const fn buy_timeout(&self) -> Duration {
        Duration::from_secs(self.buy_timeout_secs)
    }

    #[must_use]
    pub const fn settlement_timeout(&self) -> Duration {
        Duration::from_secs(self.settlement_timeout_secs)
    }
}

/// Batch and loop pacing for the runner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Delay between launching consecutive trades of a batch.
    #[serde(default = "default_stagger_ms")]
    pub stagger_ms: u64,
    /// Bound on waiting out a single trade before abandoning it.
    #[serde(default = "default_join_timeout")]
    pub join_timeout_secs: u64,
    /// Pause between consecutive batches.
    #[serde(default = "default_batch_pause_ms")]
    pub batch_pause_ms: u64,
    /// Upper bound on operator-chosen batch sizes.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: u32,
}

const fn default_stagger_ms() -> u64 {
    20
}

const fn default_join_timeout() -> u64 {
    40
}

const fn default_batch_pause_ms() -> u64 {
    800
}

const fn default_max_batch_size() -> u32 {
    50
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            stagger_ms: default_stagger_ms(),
            join_timeout_secs: default_join_timeout(),
            batch_pause_ms: default_batch_pause_ms(),
            max_batch_size: default_max_batch_size(),
        }
    }
}

impl RunnerConfig {
    #[must_use]
    pub const fn stagger(&self) -> Duration {
        Duration::from_millis(self.stagger_ms)
    }

    #[must_use]
    pub const fn join_timeout(&self) -> Duration {
        Duration::from_secs(self.join_timeout_secs)
    }

    #[must_use]
    pub const fn batch_pause(&self) -> Duration {
        Duration::from_millis(self.batch_pause_ms)
    }
}
