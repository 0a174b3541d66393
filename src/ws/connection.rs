//! WebSocket connection state machine.
//!
//! Runs the read/write loop for a single connection: dispatches incoming
//! client commands, forwards domain events published to the connection's
//! channels, and relays typing indicators from other clients.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use super::messages::{ClientCommand, ServerFrame};
use super::typing::{TypingChannel, TypingSignal};
use crate::domain::{ChannelAddress, ChannelRegistry, ConnectionId};

/// Runs the read/write loop for a single WebSocket connection.
///
/// The connection starts joined to nothing. Membership changes only through
/// explicit `join` / `join:admin` / `leave:admin` commands, and teardown on
/// disconnect removes every membership exactly once.
pub async fn run_connection(
    socket: WebSocket,
    registry: Arc<ChannelRegistry>,
    typing: TypingChannel,
) {
    let id = ConnectionId::new();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    registry.register(id, event_tx);
    let mut typing_rx = typing.subscribe();

    let (mut ws_tx, mut ws_rx) = socket.split();
    tracing::info!(%id, "ws client connected");

    loop {
        tokio::select! {
            // Incoming message from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = handle_text_message(id, &text, &registry, &typing);
                        if let Some(frame) = reply {
                            let json = serde_json::to_string(&frame).unwrap_or_default();
                            if ws_tx.send(Message::text(json)).await.is_err() {
                                break;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | Some(Err(_)) | None => break,
                    _ => {}
                }
            }
            // Domain event routed to one of this connection's channels
            event = event_rx.recv() => {
                match event {
                    Some(event) => {
                        let frame = ServerFrame::from_event(&event);
                        let json = serde_json::to_string(&frame).unwrap_or_default();
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
            // Typing indicator from another client
            signal = typing_rx.recv() => {
                match signal {
                    Ok(signal) if signal.from != id => {
                        let frame = ServerFrame::typing(signal.data);
                        let json = serde_json::to_string(&frame).unwrap_or_default();
                        if ws_tx.send(Message::text(json)).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        tracing::warn!(%id, lagged = n, "typing relay lagged, signals dropped");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }
    }

    // Runs once whether the loop ended by close frame, transport error, or
    // channel closure; deregister itself tolerates repeats.
    registry.deregister(id);
    tracing::info!(%id, "ws client disconnected");
}

/// Handles a text message from the client, returning an optional reply frame.
fn handle_text_message(
    id: ConnectionId,
    text: &str,
    registry: &Arc<ChannelRegistry>,
    typing: &TypingChannel,
) -> Option<ServerFrame> {
    let Ok(command) = serde_json::from_str::<ClientCommand>(text) else {
        return Some(ServerFrame::error("malformed message"));
    };

    match command {
        ClientCommand::Join(user) => {
            let Ok(user_id) = user.parse::<Uuid>() else {
                return Some(ServerFrame::error("invalid user id"));
            };
            // The declared id is trusted as-is; deployments that need it
            // must verify it against the session before routing.
            registry.join(id, ChannelAddress::User(user_id));
            None
        }
        ClientCommand::JoinAdmin => {
            registry.join(id, ChannelAddress::Admin);
            None
        }
        ClientCommand::LeaveAdmin => {
            registry.leave(id, ChannelAddress::Admin);
            None
        }
        ClientCommand::Typing(data) => {
            typing.relay(TypingSignal { from: id, data });
            None
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn join_with_valid_uuid_registers_membership() {
        let registry = Arc::new(ChannelRegistry::new());
        let typing = TypingChannel::new(16);
        let id = ConnectionId::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        registry.register(id, tx);

        let user = Uuid::new_v4();
        let text = format!(r#"{{"event":"join","data":"{user}"}}"#);
        let reply = handle_text_message(id, &text, &registry, &typing);

        assert!(reply.is_none());
        assert_eq!(registry.member_count(ChannelAddress::User(user)), 1);
    }

    #[test]
    fn join_with_bad_uuid_returns_error_frame() {
        let registry = Arc::new(ChannelRegistry::new());
        let typing = TypingChannel::new(16);
        let id = ConnectionId::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        registry.register(id, tx);

        let reply =
            handle_text_message(id, r#"{"event":"join","data":"not-a-uuid"}"#, &registry, &typing);
        let Some(frame) = reply else {
            panic!("expected error frame");
        };
        assert_eq!(frame.event, "error");
    }

    #[test]
    fn malformed_json_returns_error_frame() {
        let registry = Arc::new(ChannelRegistry::new());
        let typing = TypingChannel::new(16);
        let id = ConnectionId::new();

        let reply = handle_text_message(id, "{nope", &registry, &typing);
        let Some(frame) = reply else {
            panic!("expected error frame");
        };
        assert_eq!(frame.event, "error");
    }

    #[test]
    fn admin_join_and_leave_toggle_membership() {
        let registry = Arc::new(ChannelRegistry::new());
        let typing = TypingChannel::new(16);
        let id = ConnectionId::new();
        let (tx, _rx) = mpsc::unbounded_channel();
        registry.register(id, tx);

        handle_text_message(id, r#"{"event":"join:admin"}"#, &registry, &typing);
        assert_eq!(registry.member_count(ChannelAddress::Admin), 1);

        handle_text_message(id, r#"{"event":"leave:admin"}"#, &registry, &typing);
        assert_eq!(registry.member_count(ChannelAddress::Admin), 0);
    }

    #[tokio::test]
    async fn typing_command_relays_with_sender_tag() {
        let registry = Arc::new(ChannelRegistry::new());
        let typing = TypingChannel::new(16);
        let mut rx = typing.subscribe();
        let id = ConnectionId::new();

        handle_text_message(
            id,
            r#"{"event":"typing","data":{"name":"Dana"}}"#,
            &registry,
            &typing,
        );

        let Ok(signal) = rx.recv().await else {
            panic!("expected relayed signal");
        };
        assert_eq!(signal.from, id);
    }
}
