//! Contract negotiation: the authorize → quote → purchase half of a trade.
//!
//! Each step sends one request and then polls the channel for the first
//! recognized reply. Whichever recognized message arrives first wins;
//! unrelated message types are skipped while waiting, since the connection
//! carries nothing but this trade.

use crate::error::{DerivError, Result};
use crate::protocol;
use crate::session::DerivSession;
use bulk_bot_core::TradeRequest;
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::Value;
use std::time::Duration;
use tokio::time::Instant;

/// Handle to a contract as it moves from quote to purchase. The contract id
/// and broker buy price are filled in by a successful purchase.
#[derive(Debug, Clone)]
pub struct ContractHandle {
    pub proposal_id: String,
    pub contract_id: Option<String>,
    pub buy_price: Option<Decimal>,
}

pub struct Negotiator<'s> {
    session: &'s mut DerivSession,
    quote_wait: Duration,
    buy_wait: Duration,
}

impl<'s> Negotiator<'s> {
    #[must_use]
    pub fn new(session: &'s mut DerivSession, quote_wait: Duration, buy_wait: Duration) -> Self {
        Self {
            session,
            quote_wait,
            buy_wait,
        }
    }

    /// Sends the credential and waits for the broker's verdict.
    ///
    /// # Errors
    /// Returns `DerivError::Auth` if the broker rejects the credential.
    pub async fn authorize(&mut self, token: &SecretString) -> Result<()> {
        self.session.send(&protocol::authorize(token)).await?;
        let wait = self.session.call_timeout();
        let reply = self.await_tagged("authorize", wait).await?;
        if let Some(error) = protocol::remote_error(&reply) {
            return Err(DerivError::auth(error));
        }
        tracing::debug!("authorized");
        Ok(())
    }

    /// Requests a priced quote for the trade.
    ///
    /// # Errors
    /// Returns `DerivError::Proposal` if the broker rejects the request or
    /// never answers within the quote wait.
    pub async fn request_quote(&mut self, request: &TradeRequest) -> Result<ContractHandle> {
        self.session.send(&protocol::proposal(request)).await?;
        let wait = self.quote_wait;
        let reply = match self.await_tagged("proposal", wait).await {
            Ok(reply) => reply,
            Err(DerivError::Timeout(_)) => {
                return Err(DerivError::proposal("no quote response"));
            }
            Err(err) => return Err(err),
        };
        if let Some(error) = protocol::remote_error(&reply) {
            return Err(DerivError::proposal(error));
        }
        let payload = reply
            .get("proposal")
            .ok_or_else(|| DerivError::proposal("malformed quote response"))?;
        let proposal_id = protocol::proposal_id(payload)
            .ok_or_else(|| DerivError::proposal("quote response carried no id"))?;
        tracing::debug!(%proposal_id, "quote received");
        Ok(ContractHandle {
            proposal_id,
            contract_id: None,
            buy_price: None,
        })
    }

    /// Purchases a quoted contract by reference to its id.
    ///
    /// # Errors
    /// Returns `DerivError::Buy` if the broker rejects the purchase or never
    /// confirms it within the buy wait.
    pub async fn purchase(&mut self, handle: ContractHandle) -> Result<ContractHandle> {
        self.session.send(&protocol::buy(&handle.proposal_id)).await?;
        let wait = self.buy_wait;
        let reply = match self.await_tagged("buy", wait).await {
            Ok(reply) => reply,
            Err(DerivError::Timeout(_)) => {
                return Err(DerivError::buy("no purchase confirmation"));
            }
            Err(err) => return Err(err),
        };
        if let Some(error) = protocol::remote_error(&reply) {
            return Err(DerivError::buy(error));
        }
        let payload = reply
            .get("buy")
            .ok_or_else(|| DerivError::buy("malformed purchase confirmation"))?;
        let contract_id = protocol::contract_id(payload)
            .ok_or_else(|| DerivError::buy("purchase confirmation carried no contract id"))?;
        let buy_price = protocol::optional_decimal(payload, "buy_price");
        tracing::debug!(%contract_id, "contract purchased");
        Ok(ContractHandle {
            contract_id: Some(contract_id),
            buy_price,
            ..handle
        })
    }

    /// Polls the channel until a message tagged `key`, or an error message,
    /// arrives. The first recognized message wins.
    async fn await_tagged(&mut self, key: &str, wait: Duration) -> Result<Value> {
        let deadline = Instant::now() + wait;
        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Err(DerivError::Timeout(wait));
            }
            let message = self.session.recv_within(remaining).await?;
            if message.get(key).is_some() || message.get("error").is_some() {
                return Ok(message);
            }
            tracing::trace!(%key, "skipping unrelated message");
        }
    }
}
