//! Scripted in-process broker for lifecycle tests.
//!
//! Listens on an ephemeral local port, accepts any number of connections,
//! and answers each request according to a fixed script.

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;

/// How the scripted broker answers each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// Full happy path: the contract settles above its buy price.
    SettleWin,
    /// Full happy path: the contract settles worthless.
    SettleLoss,
    /// Settlement arrives as a contract update at exactly the buy price.
    SettleEvenViaContract,
    /// Settlement arrives as a channel-level sell confirmation.
    SettleViaSell,
    RejectAuth,
    RejectProposal,
    RejectBuy,
    /// Accepts the purchase but never reports settlement.
    NeverSettles,
}

/// Binds a broker on an ephemeral port and returns its ws:// URL.
pub async fn spawn_broker(script: Script) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind broker");
    let addr = listener.local_addr().expect("broker addr");
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            tokio::spawn(serve(stream, script));
        }
    });
    format!("ws://{addr}/")
}

async fn serve(stream: TcpStream, script: Script) {
    let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
        return;
    };
    while let Some(Ok(frame)) = ws.next().await {
        let Message::Text(text) = frame else { continue };
        let Ok(request) = serde_json::from_str::<Value>(&text) else {
            continue;
        };
        for reply in replies(&request, script) {
            if ws.send(Message::Text(reply.to_string())).await.is_err() {
                return;
            }
        }
    }
}

fn replies(request: &Value, script: Script) -> Vec<Value> {
    if request.get("authorize").is_some() {
        return match script {
            Script::RejectAuth => vec![
                json!({ "error": { "code": "InvalidToken", "message": "the token is invalid" } }),
            ],
            _ => vec![json!({ "authorize": { "loginid": "CR900001" } })],
        };
    }
    if request.get("proposal_open_contract").is_some() {
        return match script {
            Script::SettleWin => vec![json!({ "proposal_open_contract": {
                "contract_id": 4501,
                "is_sold": 1,
                "status": "sold",
                "buy_price": 1.0,
                "sell_price": 1.95,
                "profit": 0.95,
                "entry_tick": "8123.45",
                "exit_tick": "8123.99",
            }})],
            Script::SettleLoss => vec![json!({ "proposal_open_contract": {
                "contract_id": 4501,
                "is_sold": 1,
                "status": "sold",
                "buy_price": 1.0,
                "sell_price": 0.0,
                "profit": -1.0,
                "entry_tick": "8123.45",
                "exit_tick": "8122.01",
            }})],
            Script::SettleEvenViaContract => vec![json!({ "contract": {
                "contract_id": 4501,
                "buy_price": 1.0,
                "sell_price": 1.0,
                "entry_tick": "8123.45",
                "exit_tick": "8123.45",
            }})],
            Script::SettleViaSell => vec![json!({ "sell": {
                "contract_id": 4501,
                "sell_price": 1.95,
            }})],
            _ => Vec::new(),
        };
    }
    if request.get("proposal").is_some() {
        return match script {
            Script::RejectProposal => vec![
                json!({ "error": { "code": "ContractBuyValidationError", "message": "stake too low" } }),
            ],
            // An unrelated tick precedes the quote; clients must skip it.
            _ => vec![
                json!({ "tick": { "symbol": "R_10", "quote": 8123.45 } }),
                json!({ "proposal": { "id": "prop-001", "ask_price": 1.0, "payout": 1.95 } }),
            ],
        };
    }
    if request.get("buy").is_some() {
        return match script {
            Script::RejectBuy => vec![
                json!({ "error": { "code": "InvalidOfferings", "message": "offer expired" } }),
            ],
            _ => vec![json!({ "buy": { "contract_id": 4501, "buy_price": 1.0 } })],
        };
    }
    Vec::new()
}
