//! WebSocket message types: client commands and server frames.
//!
//! Both directions share the `{"event": ..., "data": ...}` envelope. Client
//! commands manage channel membership and relay typing indicators; server
//! frames carry domain events to subscribed clients.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::DomainEvent;

/// Commands a client can send over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum ClientCommand {
    /// Join the personal channel of the given user id.
    #[serde(rename = "join")]
    Join(String),
    /// Join the shared admin channel.
    #[serde(rename = "join:admin")]
    JoinAdmin,
    /// Leave the shared admin channel.
    #[serde(rename = "leave:admin")]
    LeaveAdmin,
    /// Typing indicator to relay to every other client.
    #[serde(rename = "typing")]
    Typing(Value),
}

/// Server → client frame.
#[derive(Debug, Clone, Serialize)]
pub struct ServerFrame {
    /// Wire event name (e.g. `"order:new"`).
    pub event: String,
    /// Event payload.
    pub data: Value,
}

impl ServerFrame {
    /// Builds the frame for a domain event.
    #[must_use]
    pub fn from_event(event: &DomainEvent) -> Self {
        Self {
            event: event.event_name().to_string(),
            data: event.payload_json(),
        }
    }

    /// Builds a relayed typing-indicator frame.
    #[must_use]
    pub fn typing(data: Value) -> Self {
        Self {
            event: "user:typing".to_string(),
            data,
        }
    }

    /// Builds an error frame for a rejected client message.
    #[must_use]
    pub fn error(message: &str) -> Self {
        Self {
            event: "error".to_string(),
            data: serde_json::json!({ "message": message }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn join_command_parses() {
        let cmd: Result<ClientCommand, _> =
            serde_json::from_str(r#"{"event":"join","data":"8a1e9d1c-9a6b-4a2e-b0a5-54c0a1e9d1c0"}"#);
        let Ok(ClientCommand::Join(user)) = cmd else {
            panic!("expected join command");
        };
        assert_eq!(user, "8a1e9d1c-9a6b-4a2e-b0a5-54c0a1e9d1c0");
    }

    #[test]
    fn admin_commands_parse_without_data() {
        let join: Result<ClientCommand, _> = serde_json::from_str(r#"{"event":"join:admin"}"#);
        assert!(matches!(join, Ok(ClientCommand::JoinAdmin)));

        let leave: Result<ClientCommand, _> = serde_json::from_str(r#"{"event":"leave:admin"}"#);
        assert!(matches!(leave, Ok(ClientCommand::LeaveAdmin)));
    }

    #[test]
    fn typing_carries_payload() {
        let cmd: Result<ClientCommand, _> =
            serde_json::from_str(r#"{"event":"typing","data":{"name":"Dana"}}"#);
        let Ok(ClientCommand::Typing(data)) = cmd else {
            panic!("expected typing command");
        };
        assert_eq!(data.get("name").and_then(Value::as_str), Some("Dana"));
    }

    #[test]
    fn unknown_event_is_rejected() {
        let cmd: Result<ClientCommand, _> = serde_json::from_str(r#"{"event":"subscribe"}"#);
        assert!(cmd.is_err());
    }

    #[test]
    fn error_frame_shape() {
        let frame = ServerFrame::error("malformed message");
        let json = serde_json::to_string(&frame).unwrap_or_default();
        assert!(json.contains(r#""event":"error""#));
        assert!(json.contains("malformed message"));
    }
}
