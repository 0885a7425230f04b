//! Wire-level requests and response classification for the broker API.
//!
//! The broker's response shapes vary between message types and API versions,
//! so identifier extraction is defined once here as an ordered-fallback rule:
//! the first present field wins, and both string and integer forms are
//! accepted and normalized to strings.

use bulk_bot_core::TradeRequest;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};

/// Field names observed carrying the quote identifier, in the order tried.
pub const PROPOSAL_ID_FIELDS: &[&str] = &["id", "proposal", "proposal_id"];

/// Field names observed carrying the purchased-contract identifier, in the
/// order tried.
pub const CONTRACT_ID_FIELDS: &[&str] = &["contract_id", "contract"];

// =============================================================================
// Requests
// =============================================================================

pub fn authorize(token: &SecretString) -> Value {
    json!({ "authorize": token.expose_secret() })
}

/// Quote request for a 1-tick contract. The barrier is attached only for the
/// digit-threshold contract families.
pub fn proposal(request: &TradeRequest) -> Value {
    let mut message = json!({
        "proposal": 1,
        "amount": request.stake.to_f64().unwrap_or_default(),
        "basis": "stake",
        "symbol": request.symbol,
        "contract_type": request.contract_type.as_api_str(),
        "currency": request.currency,
        "duration": 1,
        "duration_unit": "t",
    });
    if request.contract_type.requires_barrier() {
        if let Some(digit) = request.barrier_digit {
            message["barrier"] = Value::String(digit.to_string());
        }
    }
    message
}

pub fn buy(proposal_id: &str) -> Value {
    json!({ "buy": proposal_id })
}

/// Subscription to status updates for a purchased contract, so the
/// settlement push arrives on this channel.
pub fn open_contract_subscription(contract_id: &str) -> Value {
    json!({
        "proposal_open_contract": 1,
        "contract_id": contract_id,
        "subscribe": 1,
    })
}

// =============================================================================
// Response classification
// =============================================================================

/// Extracts the remote error payload from a message, if present.
#[must_use]
pub fn remote_error(message: &Value) -> Option<String> {
    let error = message.get("error")?;
    let code = error.get("code").and_then(Value::as_str);
    let detail = error.get("message").and_then(Value::as_str);
    let text = match (code, detail) {
        (Some(code), Some(detail)) => format!("{code}: {detail}"),
        (None, Some(detail)) => detail.to_string(),
        _ => error.to_string(),
    };
    Some(text)
}

/// Ordered-fallback identifier extraction. Returns the first present field,
/// normalized to a string.
#[must_use]
pub fn extract_id(payload: &Value, fields: &[&str]) -> Option<String> {
    fields.iter().find_map(|field| match payload.get(*field) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

#[must_use]
pub fn proposal_id(payload: &Value) -> Option<String> {
    extract_id(payload, PROPOSAL_ID_FIELDS)
}

#[must_use]
pub fn contract_id(payload: &Value) -> Option<String> {
    extract_id(payload, CONTRACT_ID_FIELDS)
}

// =============================================================================
// Settlement signals
// =============================================================================

/// What a settlement signal carries, whichever of the three shapes it came in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    /// Net result when the broker pre-computes it.
    pub profit: Option<Decimal>,
    pub entry_tick: Option<String>,
    pub exit_tick: Option<String>,
}

impl Settlement {
    /// Net result, preferring the broker's own figure over the difference.
    #[must_use]
    pub fn profit_loss(&self) -> Decimal {
        self.profit.unwrap_or(self.sell_price - self.buy_price)
    }
}

/// Settlement from an open-contract status update: the id must match and the
/// sold flag must be set.
#[must_use]
pub fn settlement_from_open_contract(message: &Value, contract: &str) -> Option<Settlement> {
    let poc = message.get("proposal_open_contract")?;
    if contract_id(poc)? != contract {
        return None;
    }
    let sold = poc.get("is_sold").is_some_and(truthy)
        || poc.get("status").and_then(Value::as_str) == Some("sold");
    if !sold {
        return None;
    }
    Some(settlement_fields(poc))
}

/// Settlement from a contract update whose id, under either name, matches.
#[must_use]
pub fn settlement_from_contract(message: &Value, contract: &str) -> Option<Settlement> {
    let update = message.get("contract")?;
    if extract_id(update, &["contract_id", "id"])? != contract {
        return None;
    }
    Some(settlement_fields(update))
}

/// Settlement from a sell confirmation. Channel-level rather than id-matched:
/// at most one purchase is outstanding per connection. The sell payload
/// carries no buy price, so its figure is taken as the pre-computed result.
#[must_use]
pub fn settlement_from_sell(message: &Value) -> Option<Settlement> {
    let sell = message.get("sell")?;
    let amount = if sell.get("sell_price").is_some() {
        decimal_field(sell, "sell_price")
    } else {
        decimal_field(sell, "profit")
    };
    Some(Settlement {
        buy_price: Decimal::ZERO,
        sell_price: amount,
        profit: Some(amount),
        entry_tick: None,
        exit_tick: None,
    })
}

fn settlement_fields(payload: &Value) -> Settlement {
    Settlement {
        buy_price: decimal_field(payload, "buy_price"),
        sell_price: decimal_field(payload, "sell_price"),
        profit: optional_decimal(payload, "profit"),
        entry_tick: tick_field(payload, "entry_tick"),
        exit_tick: tick_field(payload, "exit_tick"),
    }
}

/// Money fields arrive as numbers or strings depending on the message type;
/// absent or malformed values read as zero, matching how partial settlement
/// payloads are reported.
pub(crate) fn decimal_field(payload: &Value, field: &str) -> Decimal {
    match payload.get(field) {
        Some(Value::String(s)) => s.parse().unwrap_or_default(),
        Some(Value::Number(n)) => n
            .as_f64()
            .and_then(|f| Decimal::try_from(f).ok())
            .unwrap_or_default(),
        _ => Decimal::ZERO,
    }
}

pub(crate) fn optional_decimal(payload: &Value, field: &str) -> Option<Decimal> {
    payload.get(field).map(|_| decimal_field(payload, field))
}

fn tick_field(payload: &Value, field: &str) -> Option<String> {
    match payload.get(field) {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        _ => false,
    }
}
