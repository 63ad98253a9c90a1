//! WebSocket connection state machine.
//!
//! Handles the read/write loop for a single WebSocket connection,
//! dispatching incoming commands and forwarding filtered events.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::broadcast;

use super::messages::{WsCommand, WsMessage};
use super::subscription::SubscriptionManager;
use crate::api::dto::LaunchResponse;
use crate::domain::{LaunchEvent, LaunchId};
use crate::error::GatewayError;
use crate::service::LaunchService;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Reads commands from the client and dispatches them.
/// - Forwards matching events from the [`broadcast::Receiver`] to the client.
pub async fn run_connection(
    socket: WebSocket,
    mut event_rx: broadcast::Receiver<LaunchEvent>,
    launch_service: Arc<LaunchService>,
) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let mut subs = SubscriptionManager::new();

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let response = handle_text_message(&text, &mut subs, &launch_service).await;
                        if let Some(resp_json) = response.to_json()
                            && ws_tx.send(Message::text(resp_json)).await.is_err() {
                                break;
                            }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
            // Event from EventBus
            event = event_rx.recv() => {
                match event {
                    Ok(launch_event) => {
                        if subs.matches(&launch_event)
                            && let Some(json) = WsMessage::event(&launch_event).to_json()
                            && ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                    }
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(lagged = n, "ws client lagged behind event bus");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    tracing::debug!("ws connection closed");
}

/// Handles a text message from the client and builds the reply.
async fn handle_text_message(
    text: &str,
    subs: &mut SubscriptionManager,
    launch_service: &LaunchService,
) -> WsMessage {
    let Ok(msg) = serde_json::from_str::<WsMessage>(text) else {
        return WsMessage::error(String::new(), 400, "malformed JSON");
    };
    let Ok(command) = serde_json::from_value::<WsCommand>(msg.payload) else {
        return WsMessage::error(msg.id, 404, "unknown command");
    };

    match command {
        WsCommand::Subscribe { launch_ids } => {
            let change = subs.subscribe(&launch_ids);
            WsMessage::response(msg.id, serde_json::to_value(change).unwrap_or_default())
        }
        WsCommand::Unsubscribe { launch_ids } => {
            let change = subs.unsubscribe(&launch_ids);
            WsMessage::response(msg.id, serde_json::to_value(change).unwrap_or_default())
        }
        WsCommand::GetLaunch { launch_id } => {
            match get_launch(launch_service, launch_id).await {
                Ok(launch) => WsMessage::response(
                    msg.id,
                    serde_json::to_value(launch).unwrap_or_default(),
                ),
                Err(e) => WsMessage::error(msg.id, e.error_code(), e.to_string()),
            }
        }
    }
}

async fn get_launch(
    launch_service: &LaunchService,
    launch_id: String,
) -> Result<LaunchResponse, GatewayError> {
    let id = LaunchId::parse(launch_id)?;
    Ok(launch_service.get_launch(&id).await?.into())
}
