//! One complete trade lifecycle: session → negotiation → settlement → outcome.

use crate::error::Result;
use crate::negotiator::Negotiator;
use crate::session::DerivSession;
use crate::settlement::SettlementWatcher;
use bulk_bot_core::{DerivConfig, TradeOutcome, TradeRequest};
use rust_decimal::Decimal;
use secrecy::SecretString;

/// Executes single trades end-to-end.
///
/// One instance per bot, shared across trade tasks; each call opens its own
/// connection, so executions never contend with each other. A failure in one
/// trade is fully contained in that trade's outcome and can never abort a
/// sibling.
pub struct TradeExecutor {
    config: DerivConfig,
    token: SecretString,
}

impl std::fmt::Debug for TradeExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TradeExecutor")
            .field("config", &self.config)
            .field("token", &"[REDACTED]")
            .finish()
    }
}

impl TradeExecutor {
    #[must_use]
    pub fn new(config: DerivConfig, token: SecretString) -> Self {
        Self { config, token }
    }

    /// Runs one trade and always produces exactly one outcome. Every failure
    /// along the way is converted into a status rather than propagated.
    pub async fn execute(&self, request: &TradeRequest, sequence: u32) -> TradeOutcome {
        match self.try_execute(request, sequence).await {
            Ok(outcome) => outcome,
            Err(err) => {
                tracing::warn!(sequence, status = %err.outcome_status(), %err, "trade failed");
                TradeOutcome::failed(sequence, request.stake, err.outcome_status(), err.to_string())
            }
        }
    }

    async fn try_execute(&self, request: &TradeRequest, sequence: u32) -> Result<TradeOutcome> {
        let url = self.config.endpoint_url();
        let mut session = DerivSession::connect(&url, self.config.call_timeout()).await?;
        let result = self.drive(&mut session, request, sequence).await;
        // The channel is released on every branch, settled or not.
        session.close().await;
        result
    }

    async fn drive(
        &self,
        session: &mut DerivSession,
        request: &TradeRequest,
        sequence: u32,
    ) -> Result<TradeOutcome> {
        let mut negotiator = Negotiator::new(
            session,
            self.config.proposal_timeout(),
            self.config.buy_timeout(),
        );
        negotiator.authorize(&self.token).await?;
        let quoted = negotiator.request_quote(request).await?;
        let purchased = negotiator.purchase(quoted).await?;

        let mut watcher = SettlementWatcher::new(session, self.config.settlement_timeout());
        let settlement = watcher.await_settlement(&purchased).await?;

        // Broker-confirmed buy price where available: the settlement payload
        // first, the purchase confirmation second, the requested stake last.
        let stake = if settlement.buy_price > Decimal::ZERO {
            settlement.buy_price
        } else {
            purchased
                .buy_price
                .filter(|price| *price > Decimal::ZERO)
                .unwrap_or(request.stake)
        };
        let profit_loss = settlement.profit_loss();
        tracing::info!(sequence, %profit_loss, "trade settled");
        Ok(TradeOutcome::settled(
            sequence,
            stake,
            settlement.sell_price,
            profit_loss,
            settlement.entry_tick,
            settlement.exit_tick,
        ))
    }
}
