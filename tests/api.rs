//! End-to-end REST tests against a server bound to an ephemeral port.

#![allow(clippy::panic)]

use std::net::SocketAddr;

use launchpad_gateway::config::MarketConfig;
use launchpad_gateway::{build_app, build_state};
use serde_json::{Value, json};

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

async fn post(client: &reqwest::Client, url: String, body: Value) -> (u16, Value) {
    let Ok(resp) = client.post(url).json(&body).send().await else {
        panic!("request sent");
    };
    let status = resp.status().as_u16();
    let Ok(body) = resp.json::<Value>().await else {
        panic!("json body");
    };
    (status, body)
}

async fn get(client: &reqwest::Client, url: String) -> (u16, Value) {
    let Ok(resp) = client.get(url).send().await else {
        panic!("request sent");
    };
    let status = resp.status().as_u16();
    let Ok(body) = resp.json::<Value>().await else {
        panic!("json body");
    };
    (status, body)
}

#[tokio::test]
async fn health_and_market_config() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();

    let (status, body) = get(&client, format!("http://{addr}/health")).await;
    assert_eq!(status, 200);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["launch_count"], 0);

    let (status, body) = get(&client, format!("http://{addr}/config/market")).await;
    assert_eq!(status, 200);
    assert_eq!(body["curve_shape"], "linear");
    assert_eq!(body["base_price"], "0.000005");
    assert_eq!(body["curve_supply"], "800000000");
    assert_eq!(body["max_valuation"], "100000");
    assert_eq!(body["migration_threshold"], "69000");
}

#[tokio::test]
async fn launch_lifecycle() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();
    let base = format!("http://{addr}/api/v1");

    let (status, body) = post(
        &client,
        format!("{base}/launches"),
        json!({"id": "grok-mint", "name": "Grok", "symbol": "GROK", "creator": "wallet1"}),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(body["launch"]["id"], "grok-mint");
    assert_eq!(body["launch"]["cumulative_sold"], "0");
    assert_eq!(body["launch"]["pool_token_reserve"], "800000000");

    let (status, body) = post(
        &client,
        format!("{base}/launches/grok-mint/quote/buy"),
        json!({"value": "1", "reference_rate": "150"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["token_amount"], "30000000");

    let (status, body) = post(
        &client,
        format!("{base}/launches/grok-mint/buy"),
        json!({"value": "1", "reference_rate": "150"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["side"], "buy");
    assert_eq!(body["amount_traded"], "30000000");
    assert_eq!(body["launch"]["pool_value_reserve"], "1");
    assert_eq!(body["launch"]["trade_count"], 1);

    let (status, body) = post(
        &client,
        format!("{base}/launches/grok-mint/sell"),
        json!({"amount": "30000000", "reference_rate": "150"}),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["counter_amount"], "1");
    assert_eq!(body["launch"]["cumulative_sold"], "0");

    let (status, body) = get(&client, format!("{base}/launches?page=1&per_page=10")).await;
    assert_eq!(status, 200);
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(body["data"][0]["symbol"], "GROK");
}

#[tokio::test]
async fn errors_map_to_statuses() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();
    let base = format!("http://{addr}/api/v1");

    let (status, body) = get(&client, format!("{base}/launches/missing")).await;
    assert_eq!(status, 404);
    assert_eq!(body["error"]["code"], 2001);

    let create = json!({"id": "dup", "name": "Dup", "symbol": "DUP", "creator": "c"});
    let (status, _) = post(&client, format!("{base}/launches"), create.clone()).await;
    assert_eq!(status, 201);
    let (status, body) = post(&client, format!("{base}/launches"), create).await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], 2002);

    let (status, body) = post(
        &client,
        format!("{base}/launches/dup/buy"),
        json!({"value": "0", "reference_rate": "150"}),
    )
    .await;
    assert_eq!(status, 400);
    assert_eq!(body["error"]["code"], 1002);

    let (status, body) = post(
        &client,
        format!("{base}/launches/dup/buy"),
        json!({"value": "30", "reference_rate": "150"}),
    )
    .await;
    assert_eq!(status, 422);
    assert_eq!(body["error"]["code"], 4001);

    let (status, body) = post(
        &client,
        format!("{base}/launches/dup/sell"),
        json!({"amount": "1", "reference_rate": "150"}),
    )
    .await;
    assert_eq!(status, 422);
    assert_eq!(body["error"]["code"], 4003);
}

#[tokio::test]
async fn initial_buy_and_migration() {
    let addr = spawn_server().await;
    let client = reqwest::Client::new();
    let base = format!("http://{addr}/api/v1");

    let (status, body) = post(
        &client,
        format!("{base}/launches"),
        json!({
            "name": "Moon",
            "symbol": "MOON",
            "creator": "wallet2",
            "initial_buy": {"value": "18", "reference_rate": "150"},
        }),
    )
    .await;
    assert_eq!(status, 201);
    assert_eq!(body["initial_buy"]["amount_traded"], "540000000");
    assert_eq!(body["initial_buy"]["crossed_migration_threshold"], true);
    let Some(id) = body["launch"]["id"].as_str().map(str::to_string) else {
        panic!("generated id");
    };

    let (status, body) = get(&client, format!("{base}/launches/{id}/migration")).await;
    assert_eq!(status, 200);
    assert_eq!(body["eligible"], true);
    assert_eq!(body["market_valuation"], "69125");

    let (status, body) = post(&client, format!("{base}/launches/{id}/migrate"), json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body["migrated"], true);

    let (status, body) = post(
        &client,
        format!("{base}/launches/{id}/buy"),
        json!({"value": "1", "reference_rate": "150"}),
    )
    .await;
    assert_eq!(status, 409);
    assert_eq!(body["error"]["code"], 2003);
}
