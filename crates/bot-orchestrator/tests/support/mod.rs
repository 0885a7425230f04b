//! Scripted in-process broker, enough of it for batch and runner tests.
//! Accepts any number of concurrent connections on an ephemeral port.

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    /// Every trade settles above its buy price.
    SettleWin,
    /// Every quote request is rejected.
    RejectProposal,
}

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
        if let Some(reply) = reply_for(&request, script) {
            if ws.send(Message::Text(reply.to_string())).await.is_err() {
                return;
            }
        }
    }
}

fn reply_for(request: &Value, script: Script) -> Option<Value> {
    if request.get("authorize").is_some() {
        return Some(json!({ "authorize": { "loginid": "CR900001" } }));
    }
    if request.get("proposal_open_contract").is_some() {
        return Some(json!({ "proposal_open_contract": {
            "contract_id": 4501,
            "is_sold": 1,
            "status": "sold",
            "buy_price": 1.0,
            "sell_price": 1.95,
            "profit": 0.95,
            "entry_tick": "8123.45",
            "exit_tick": "8123.99",
        }}));
    }
    if request.get("proposal").is_some() {
        return Some(match script {
            Script::RejectProposal => {
                json!({ "error": { "code": "ContractBuyValidationError", "message": "stake too low" } })
            }
            Script::SettleWin => {
                json!({ "proposal": { "id": "prop-001", "ask_price": 1.0, "payout": 1.95 } })
            }
        });
    }
    if request.get("buy").is_some() {
        return Some(json!({ "buy": { "contract_id": 4501, "buy_price": 1.0 } }));
    }
    None
}
