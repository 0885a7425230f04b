//! Domain records for the trade lifecycle: what the operator asks for, what
//! the broker settles, and the append-only stream the presentation side reads.

use anyhow::Result;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Binary-option contract families offered on the volatility markets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContractType {
    DigitMatch,
    DigitDiff,
    DigitOver,
    DigitUnder,
    DigitEven,
    DigitOdd,
    Rise,
    Fall,
}

impl ContractType {
    /// Contract code as the broker API expects it.
    #[must_use]
    pub const fn as_api_str(self) -> &'static str {
        match self {
            Self::DigitMatch => "DIGITMATCH",
            Self::DigitDiff => "DIGITDIFF",
            Self::DigitOver => "DIGITOVER",
            Self::DigitUnder => "DIGITUNDER",
            Self::DigitEven => "DIGITEVEN",
            Self::DigitOdd => "DIGITODD",
            Self::Rise => "CALL",
            Self::Fall => "PUT",
        }
    }

    /// Whether this contract family takes a target digit barrier.
    #[must_use]
    pub const fn requires_barrier(self) -> bool {
        matches!(
            self,
            Self::DigitMatch | Self::DigitDiff | Self::DigitOver | Self::DigitUnder
        )
    }
}

impl std::fmt::Display for ContractType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_api_str())
    }
}

impl std::str::FromStr for ContractType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "digitmatch" => Ok(Self::DigitMatch),
            "digitdiff" => Ok(Self::DigitDiff),
            "digitover" => Ok(Self::DigitOver),
            "digitunder" => Ok(Self::DigitUnder),
            "digiteven" => Ok(Self::DigitEven),
            "digitodd" => Ok(Self::DigitOdd),
            "rise" | "call" => Ok(Self::Rise),
            "fall" | "put" => Ok(Self::Fall),
            _ => Err(format!("unknown contract type: {s}")),
        }
    }
}

/// Operator-fixed parameters for one trade. Immutable once a trade starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeRequest {
    pub symbol: String,
    pub contract_type: ContractType,
    pub stake: Decimal,
    /// Target digit, required for the digit-threshold contract families.
    pub barrier_digit: Option<u8>,
    pub currency: String,
}

impl TradeRequest {
    /// Checks the stake and barrier invariants before any trade starts.
    ///
    /// # Errors
    /// Returns an error naming the violated invariant.
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            anyhow::bail!("symbol must not be empty");
        }
        if self.stake <= Decimal::ZERO {
            anyhow::bail!("stake must be positive, got {}", self.stake);
        }
        if self.contract_type.requires_barrier() {
            match self.barrier_digit {
                Some(digit) if digit <= 9 => {}
                Some(digit) => anyhow::bail!("barrier digit {digit} out of range 0-9"),
                None => anyhow::bail!("{} requires a barrier digit", self.contract_type),
            }
        }
        Ok(())
    }
}

/// Terminal classification of one trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutcomeStatus {
    Win,
    Loss,
    Even,
    AuthError,
    ProposalError,
    BuyError,
    NoSettlement,
    Exception,
}

impl OutcomeStatus {
    /// Classification from a realized net result.
    #[must_use]
    pub fn from_profit(profit: Decimal) -> Self {
        if profit > Decimal::ZERO {
            Self::Win
        } else if profit < Decimal::ZERO {
            Self::Loss
        } else {
            Self::Even
        }
    }

    /// Whether the contract reached settlement (as opposed to failing earlier).
    #[must_use]
    pub const fn is_settled(self) -> bool {
        matches!(self, Self::Win | Self::Loss | Self::Even)
    }
}

impl std::fmt::Display for OutcomeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Self::Win => "Win",
            Self::Loss => "Loss",
            Self::Even => "Even",
            Self::AuthError => "AuthError",
            Self::ProposalError => "ProposalError",
            Self::BuyError => "BuyError",
            Self::NoSettlement => "NoSettlement",
            Self::Exception => "Exception",
        };
        f.write_str(label)
    }
}

/// One finished trade. Appended to the record stream exactly once,
/// never mutated afterwards.
///
/// Money convention: `payout` is the sell price, `profit_loss` is
/// `payout - buy_price`, and `stake` is the broker-confirmed buy price once
/// known (the requested stake on failure paths).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TradeOutcome {
    pub sequence: u32,
    pub entry_tick: Option<String>,
    pub exit_tick: Option<String>,
    pub stake: Decimal,
    pub payout: Decimal,
    pub profit_loss: Decimal,
    pub status: OutcomeStatus,
    /// Remote error payload for the failure statuses.
    pub error: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

impl TradeOutcome {
    /// Outcome for a contract that settled.
    #[must_use]
    pub fn settled(
        sequence: u32,
        stake: Decimal,
        payout: Decimal,
        profit_loss: Decimal,
        entry_tick: Option<String>,
        exit_tick: Option<String>,
    ) -> Self {
        Self {
            sequence,
            entry_tick,
            exit_tick,
            stake,
            payout,
            profit_loss,
            status: OutcomeStatus::from_profit(profit_loss),
            error: None,
            recorded_at: Utc::now(),
        }
    }

    /// Outcome for a trade that failed before settling. Carries the requested
    /// stake and a zero payout.
    #[must_use]
    pub fn failed(
        sequence: u32,
        stake: Decimal,
        status: OutcomeStatus,
        error: impl Into<String>,
    ) -> Self {
        Self {
            sequence,
            entry_tick: None,
            exit_tick: None,
            stake,
            payout: Decimal::ZERO,
            profit_loss: Decimal::ZERO,
            status,
            error: Some(error.into()),
            recorded_at: Utc::now(),
        }
    }
}

/// One entry in the append-only session stream: a trade outcome or a
/// bookkeeping marker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TradeRecord {
    Outcome(TradeOutcome),
    BatchStarted {
        batch_no: u64,
        at: DateTime<Utc>,
    },
    BatchCompleted {
        batch_no: u64,
        at: DateTime<Utc>,
    },
    /// Terminal marker: the runner honored the stop flag and exited.
    RunnerStopped {
        at: DateTime<Utc>,
    },
}

impl TradeRecord {
    #[must_use]
    pub const fn outcome(&self) -> Option<&TradeOutcome> {
        match self {
            Self::Outcome(outcome) => Some(outcome),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_marker(&self) -> bool {
        self.outcome().is_none()
    }
}
