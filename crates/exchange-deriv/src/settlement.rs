//! Settlement detection for a purchased contract.

use crate::error::{DerivError, Result};
use crate::negotiator::ContractHandle;
use crate::protocol::{self, Settlement};
use crate::session::DerivSession;
use std::time::Duration;
use tokio::time::Instant;

/// Watches a trade's channel until its contract settles or the window closes.
pub struct SettlementWatcher<'s> {
    session: &'s mut DerivSession,
    timeout: Duration,
}

impl<'s> SettlementWatcher<'s> {
    #[must_use]
    pub fn new(session: &'s mut DerivSession, timeout: Duration) -> Self {
        Self { session, timeout }
    }

    /// Subscribes to the contract's status stream, then polls the channel
    /// for the first of the three equivalent settlement signals: an
    /// open-contract update with matching id and sold flag, a contract
    /// update with matching id, or a channel-level sell confirmation.
    ///
    /// # Errors
    /// Returns `DerivError::NoSettlement` when the window closes without a
    /// signal, or `DerivError::Buy` if the handle carries no contract id.
    pub async fn await_settlement(&mut self, handle: &ContractHandle) -> Result<Settlement> {
        let contract_id = handle
            .contract_id
            .as_deref()
            .ok_or_else(|| DerivError::buy("contract id missing before settlement"))?;
        self.session
            .send(&protocol::open_contract_subscription(contract_id))
            .await?;

        let deadline = Instant::now() + self.timeout;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }
            let message = match self.session.recv_within(remaining).await {
                Ok(message) => message,
                Err(DerivError::Timeout(_)) => break,
                // A dropped channel means the signal can no longer arrive;
                // that is a no-settlement report, not a crash.
                Err(DerivError::ConnectionClosed) => {
                    tracing::debug!(%contract_id, "channel closed while awaiting settlement");
                    break;
                }
                Err(err) => return Err(err),
            };
            let settlement = protocol::settlement_from_open_contract(&message, contract_id)
                .or_else(|| protocol::settlement_from_contract(&message, contract_id))
                .or_else(|| protocol::settlement_from_sell(&message));
            if let Some(settlement) = settlement {
                tracing::debug!(
                    %contract_id,
                    profit = %settlement.profit_loss(),
                    "contract settled"
                );
                return Ok(settlement);
            }
        }
        Err(DerivError::no_settlement(contract_id, self.timeout))
    }
}
