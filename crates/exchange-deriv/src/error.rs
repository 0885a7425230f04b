//! Error types for the Deriv integration.
//!
//! Every variant maps onto an outcome status, because a trade's failure is
//! reported in the result stream rather than propagated as a crash.

use bulk_bot_core::OutcomeStatus;
use std::time::Duration;
use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Errors that can occur while driving one trade over the wire.
#[derive(Debug, Error)]
pub enum DerivError {
    /// Opening the connection failed.
    #[error("connect error: {0}")]
    Connect(String),

    /// The broker rejected the credential.
    #[error("authorization rejected: {0}")]
    Auth(String),

    /// The broker rejected the quote request, or never answered it.
    #[error("quote rejected: {0}")]
    Proposal(String),

    /// The broker rejected the purchase, or never confirmed it.
    #[error("purchase rejected: {0}")]
    Buy(String),

    /// No settlement signal arrived within the watch window.
    #[error("no settlement for contract {contract_id} within {timeout:?}")]
    NoSettlement {
        contract_id: String,
        timeout: Duration,
    },

    /// A bounded receive elapsed without any message.
    #[error("receive timed out after {0:?}")]
    Timeout(Duration),

    /// The remote closed the channel.
    #[error("connection closed by remote")]
    ConnectionClosed,

    /// Any other transport fault.
    #[error("transport error: {0}")]
    Transport(String),

    /// A payload that could not be produced or understood.
    #[error("malformed payload: {0}")]
    Payload(String),
}

impl DerivError {
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    pub fn proposal(message: impl Into<String>) -> Self {
        Self::Proposal(message.into())
    }

    pub fn buy(message: impl Into<String>) -> Self {
        Self::Buy(message.into())
    }

    pub fn no_settlement(contract_id: impl Into<String>, timeout: Duration) -> Self {
        Self::NoSettlement {
            contract_id: contract_id.into(),
            timeout,
        }
    }

    /// The outcome status this failure surfaces as in the result stream.
    #[must_use]
    pub const fn outcome_status(&self) -> OutcomeStatus {
        match self {
            Self::Auth(_) => OutcomeStatus::AuthError,
            Self::Proposal(_) => OutcomeStatus::ProposalError,
            Self::Buy(_) => OutcomeStatus::BuyError,
            Self::NoSettlement { .. } => OutcomeStatus::NoSettlement,
            Self::Connect(_)
            | Self::Timeout(_)
            | Self::ConnectionClosed
            | Self::Transport(_)
            | Self::Payload(_) => OutcomeStatus::Exception,
        }
    }
}

impl From<tungstenite::Error> for DerivError {
    fn from(err: tungstenite::Error) -> Self {
        match err {
            tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed => {
                Self::ConnectionClosed
            }
            other => Self::Transport(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for DerivError {
    fn from(err: serde_json::Error) -> Self {
        Self::Payload(err.to_string())
    }
}

/// Result type alias for Deriv operations.
pub type Result<T> = std::result::Result<T, DerivError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_failures_map_to_their_statuses() {
        assert_eq!(
            DerivError::auth("bad token").outcome_status(),
            OutcomeStatus::AuthError
        );
        assert_eq!(
            DerivError::proposal("stake too low").outcome_status(),
            OutcomeStatus::ProposalError
        );
        assert_eq!(
            DerivError::buy("offer expired").outcome_status(),
            OutcomeStatus::BuyError
        );
        assert_eq!(
            DerivError::no_settlement("123", Duration::from_secs(20)).outcome_status(),
            OutcomeStatus::NoSettlement
        );
    }

    #[test]
    fn transport_failures_surface_as_exceptions() {
        assert_eq!(
            DerivError::Connect("refused".to_string()).outcome_status(),
            OutcomeStatus::Exception
        );
        assert_eq!(
            DerivError::Timeout(Duration::from_secs(8)).outcome_status(),
            OutcomeStatus::Exception
        );
        assert_eq!(
            DerivError::ConnectionClosed.outcome_status(),
            OutcomeStatus::Exception
        );
    }

    #[test]
    fn display_carries_the_remote_payload() {
        let err = DerivError::proposal("ContractBuyValidationError: stake too low");
        assert!(err.to_string().contains("stake too low"));
    }

    #[test]
    fn closed_transport_errors_collapse_to_connection_closed() {
        let err: DerivError = tungstenite::Error::ConnectionClosed.into();
        assert!(matches!(err, DerivError::ConnectionClosed));
    }
}
