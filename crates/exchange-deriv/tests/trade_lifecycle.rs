//! Full lifecycle tests against a scripted in-process broker.

mod support;

use bulk_bot_core::{ContractType, DerivConfig, OutcomeStatus, TradeRequest};
use bulk_bot_deriv::TradeExecutor;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use secrecy::SecretString;
use support::{spawn_broker, Script};

fn config(ws_url: String) -> DerivConfig {
    DerivConfig {
        ws_url,
        app_id: 1089,
        call_timeout_secs: 2,
        proposal_timeout_secs: 2,
        buy_timeout_secs: 2,
        settlement_timeout_secs: 1,
    }
}

fn token() -> SecretString {
    SecretString::from("test-token".to_string())
}

fn request() -> TradeRequest {
    TradeRequest {
        symbol: "R_10".to_string(),
        contract_type: ContractType::DigitMatch,
        stake: dec!(1.0),
        barrier_digit: Some(5),
        currency: "USD".to_string(),
    }
}

#[tokio::test]
async fn winning_trade_settles_with_profit() {
    let url = spawn_broker(Script::SettleWin).await;
    let executor = TradeExecutor::new(config(url), token());

    let outcome = executor.execute(&request(), 1).await;

    assert_eq!(outcome.status, OutcomeStatus::Win);
    assert_eq!(outcome.sequence, 1);
    assert_eq!(outcome.stake, dec!(1.0));
    assert_eq!(outcome.payout, dec!(1.95));
    assert_eq!(outcome.profit_loss, dec!(0.95));
    assert_eq!(outcome.entry_tick.as_deref(), Some("8123.45"));
    assert_eq!(outcome.exit_tick.as_deref(), Some("8123.99"));
    assert!(outcome.error.is_none());
}

#[tokio::test]
async fn losing_trade_settles_with_negative_result() {
    let url = spawn_broker(Script::SettleLoss).await;
    let executor = TradeExecutor::new(config(url), token());

    let outcome = executor.execute(&request(), 2).await;

    assert_eq!(outcome.status, OutcomeStatus::Loss);
    assert_eq!(outcome.payout, Decimal::ZERO);
    assert_eq!(outcome.profit_loss, dec!(-1.0));
}

#[tokio::test]
async fn contract_update_settlement_classifies_even() {
    let url = spawn_broker(Script::SettleEvenViaContract).await;
    let executor = TradeExecutor::new(config(url), token());

    let outcome = executor.execute(&request(), 3).await;

    assert_eq!(outcome.status, OutcomeStatus::Even);
    assert_eq!(outcome.profit_loss, Decimal::ZERO);
    assert_eq!(outcome.stake, dec!(1.0));
}

#[tokio::test]
async fn sell_confirmation_settles_the_trade() {
    let url = spawn_broker(Script::SettleViaSell).await;
    let executor = TradeExecutor::new(config(url), token());

    let outcome = executor.execute(&request(), 4).await;

    assert_eq!(outcome.status, OutcomeStatus::Win);
    assert_eq!(outcome.payout, dec!(1.95));
    // The sell payload carries no buy price; the purchase confirmation's is used.
    assert_eq!(outcome.stake, dec!(1.0));
}

#[tokio::test]
async fn rejected_token_reports_auth_error() {
    let url = spawn_broker(Script::RejectAuth).await;
    let executor = TradeExecutor::new(config(url), token());

    let outcome = executor.execute(&request(), 1).await;

    assert_eq!(outcome.status, OutcomeStatus::AuthError);
    assert_eq!(outcome.payout, Decimal::ZERO);
    assert_eq!(outcome.profit_loss, Decimal::ZERO);
    assert!(outcome.error.as_deref().unwrap_or_default().contains("InvalidToken"));
}

#[tokio::test]
async fn rejected_quote_reports_proposal_error() {
    let url = spawn_broker(Script::RejectProposal).await;
    let executor = TradeExecutor::new(config(url), token());

    let outcome = executor.execute(&request(), 1).await;

    assert_eq!(outcome.status, OutcomeStatus::ProposalError);
    assert!(outcome.error.as_deref().unwrap_or_default().contains("stake too low"));
}

#[tokio::test]
async fn rejected_purchase_reports_buy_error() {
    let url = spawn_broker(Script::RejectBuy).await;
    let executor = TradeExecutor::new(config(url), token());

    let outcome = executor.execute(&request(), 1).await;

    assert_eq!(outcome.status, OutcomeStatus::BuyError);
    assert!(outcome.error.as_deref().unwrap_or_default().contains("offer expired"));
}

#[tokio::test]
async fn silent_broker_reports_no_settlement() {
    let url = spawn_broker(Script::NeverSettles).await;
    let executor = TradeExecutor::new(config(url), token());

    let outcome = executor.execute(&request(), 1).await;

    assert_eq!(outcome.status, OutcomeStatus::NoSettlement);
    assert_eq!(outcome.payout, Decimal::ZERO);
    assert_eq!(outcome.profit_loss, Decimal::ZERO);
    // The requested stake is reported when no broker price was confirmed as final.
    assert_eq!(outcome.stake, dec!(1.0));
}

#[tokio::test]
async fn unreachable_endpoint_reports_exception() {
    // Nothing listens on this port.
    let executor = TradeExecutor::new(config("ws://127.0.0.1:1".to_string()), token());

    let outcome = executor.execute(&request(), 1).await;

    assert_eq!(outcome.status, OutcomeStatus::Exception);
    assert_eq!(outcome.payout, Decimal::ZERO);
}
