//! WebSocket message types: envelope, commands, and events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::LaunchEvent;

/// Top-level WebSocket message envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WsMessage {
    /// Client-provided ID for requests; server-generated for events.
    pub id: String,
    /// Message type discriminator.
    #[serde(rename = "type")]
    pub msg_type: WsMessageType,
    /// ISO-8601 timestamp.
    pub timestamp: DateTime<Utc>,
    /// Variant-specific payload.
    pub payload: serde_json::Value,
}

impl WsMessage {
    /// Response to the command with the given `id`.
    #[must_use]
    pub fn response(id: String, payload: serde_json::Value) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Response,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Error reply to the command with the given `id`.
    #[must_use]
    pub fn error(id: String, code: u32, message: impl Into<String>) -> Self {
        Self {
            id,
            msg_type: WsMessageType::Error,
            timestamp: Utc::now(),
            payload: serde_json::json!({
                "code": code,
                "message": message.into(),
            }),
        }
    }

    /// Broadcast envelope for a domain event.
    #[must_use]
    pub fn event(event: &LaunchEvent) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            msg_type: WsMessageType::Event,
            timestamp: Utc::now(),
            payload: serde_json::to_value(event).unwrap_or_default(),
        }
    }

    /// Serializes the envelope to a JSON string.
    #[must_use]
    pub fn to_json(&self) -> Option<String> {
        serde_json::to_string(self).ok()
    }
}

/// Discriminator for WebSocket message types.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum WsMessageType {
    /// Client → Server command.
    Command,
    /// Server → Client response to a command.
    Response,
    /// Server → Client broadcast event.
    Event,
    /// Server → Client error.
    Error,
}

/// Commands that a client can send over WebSocket, carried in the
/// envelope payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum WsCommand {
    /// Subscribe to events for specific launches.
    Subscribe {
        /// Launch IDs to subscribe to. Use `["*"]` for all launches.
        launch_ids: Vec<String>,
    },
    /// Unsubscribe from events for specific launches.
    Unsubscribe {
        /// Launch IDs to unsubscribe from. `"*"` clears the wildcard.
        launch_ids: Vec<String>,
    },
    /// Get the current state of one launch.
    GetLaunch {
        /// Target launch ID.
        launch_id: String,
    },
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn subscribe_command_parses() {
        let payload = serde_json::json!({"command": "subscribe", "launch_ids": ["*"]});
        let Ok(WsCommand::Subscribe { launch_ids }) = serde_json::from_value(payload) else {
            panic!("subscribe parses");
        };
        assert_eq!(launch_ids, vec!["*".to_string()]);
    }

    #[test]
    fn envelope_round_trips_type_field() {
        let msg = WsMessage::error("abc".to_string(), 404, "unknown command");
        let Some(json) = msg.to_json() else {
            panic!("serializes");
        };
        assert!(json.contains("\"type\":\"error\""));
        assert!(json.contains("\"code\":404"));
    }
}
