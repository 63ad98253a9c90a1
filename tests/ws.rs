//! WebSocket tests: subscriptions, event forwarding, and `get_launch`.

#![allow(clippy::panic)]

use std::net::SocketAddr;

use futures_util::{SinkExt, StreamExt};
use launchpad_gateway::config::MarketConfig;
use launchpad_gateway::{build_app, build_state};
use serde_json::{Value, json};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

async fn spawn_server() -> SocketAddr {
    let Ok(config) = MarketConfig::default().ledger_config() else {
        panic!("default market is valid");
    };
    let app = build_app(build_state(config, 1_024));
    let Ok(listener) = tokio::net::TcpListener::bind("127.0.0.1:0").await else {
        panic!("bind ephemeral port");
    };
    let Ok(addr) = listener.local_addr() else {
        panic!("listener has an address");
    };
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

fn command(id: &str, payload: Value) -> Message {
    let envelope = json!({
        "id": id,
        "type": "command",
        "timestamp": chrono::Utc::now(),
        "payload": payload,
    });
    Message::text(envelope.to_string())
}

async fn next_json<S>(stream: &mut S) -> Value
where
    S: StreamExt<Item = Result<Message, tokio_tungstenite::tungstenite::Error>> + Unpin,
{
    loop {
        let Some(Ok(msg)) = stream.next().await else {
            panic!("socket closed");
        };
        if let Message::Text(text) = msg {
            let Ok(value) = serde_json::from_str::<Value>(text.as_str()) else {
                panic!("server sent JSON");
            };
            return value;
        }
    }
}

#[tokio::test]
async fn subscriber_receives_trade_events() {
    let addr = spawn_server().await;
    let Ok((mut socket, _)) = connect_async(format!("ws://{addr}/ws")).await else {
        panic!("ws connects");
    };

    let sent = socket
        .send(command("sub-1", json!({"command": "subscribe", "launch_ids": ["*"]})))
        .await;
    assert!(sent.is_ok());
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["id"], "sub-1");
    assert_eq!(reply["type"], "response");
    assert_eq!(reply["payload"]["wildcard"], true);

    let client = reqwest::Client::new();
    let created = client
        .post(format!("http://{addr}/api/v1/launches"))
        .json(&json!({"id": "ws-mint", "name": "Ws", "symbol": "WS", "creator": "c"}))
        .send()
        .await;
    assert!(created.is_ok());

    let event = next_json(&mut socket).await;
    assert_eq!(event["type"], "event");
    assert_eq!(event["payload"]["event_type"], "launch_created");
    assert_eq!(event["payload"]["launch_id"], "ws-mint");

    let bought = client
        .post(format!("http://{addr}/api/v1/launches/ws-mint/buy"))
        .json(&json!({"value": "1", "reference_rate": "150"}))
        .send()
        .await;
    assert!(bought.is_ok());

    let event = next_json(&mut socket).await;
    assert_eq!(event["payload"]["event_type"], "trade_executed");
    assert_eq!(event["payload"]["amount_traded"], "30000000");
}

#[tokio::test]
async fn get_launch_and_unknown_command() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();
    let created = client
        .post(format!("http://{addr}/api/v1/launches"))
        .json(&json!({"id": "state-mint", "name": "State", "symbol": "ST", "creator": "c"}))
        .send()
        .await;
    assert!(created.is_ok());

    let Ok((mut socket, _)) = connect_async(format!("ws://{addr}/ws")).await else {
        panic!("ws connects");
    };

    let sent = socket
        .send(command("get-1", json!({"command": "get_launch", "launch_id": "state-mint"})))
        .await;
    assert!(sent.is_ok());
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "response");
    assert_eq!(reply["payload"]["symbol"], "ST");

    let sent = socket
        .send(command("get-2", json!({"command": "get_launch", "launch_id": "nope"})))
        .await;
    assert!(sent.is_ok());
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["payload"]["code"], 2001);

    let sent = socket
        .send(command("bad-1", json!({"command": "teleport"})))
        .await;
    assert!(sent.is_ok());
    let reply = next_json(&mut socket).await;
    assert_eq!(reply["type"], "error");
    assert_eq!(reply["payload"]["code"], 404);
}
