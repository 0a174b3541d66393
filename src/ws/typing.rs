//! Broadcast channel for typing indicators.
//!
//! Typing signals bypass the channel registry: they go to every other
//! connected client, with no per-address targeting. [`TypingChannel`] wraps a
//! [`tokio::sync::broadcast`] channel; every connection subscribes on connect
//! and filters out its own signals by sender id.

use serde_json::Value;
use tokio::sync::broadcast;

use crate::domain::ConnectionId;

/// A typing indicator tagged with its originating connection.
#[derive(Debug, Clone)]
pub struct TypingSignal {
    /// Connection that sent the indicator.
    pub from: ConnectionId,
    /// Client-supplied payload, relayed verbatim.
    pub data: Value,
}

/// Broadcast bus for [`TypingSignal`]s.
///
/// When the ring buffer is full, the oldest signals are dropped for lagging
/// receivers; typing indicators are cosmetic and tolerate loss.
#[derive(Debug, Clone)]
pub struct TypingChannel {
    sender: broadcast::Sender<TypingSignal>,
}

impl TypingChannel {
    /// Creates a new `TypingChannel` with the given ring-buffer capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Relays a signal to all subscribers.
    ///
    /// Returns the number of receivers; zero when nobody is connected.
    pub fn relay(&self, signal: TypingSignal) -> usize {
        self.sender.send(signal).unwrap_or(0)
    }

    /// Creates a new receiver for future signals.
    ///
    /// Each WebSocket connection calls this once on connect.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<TypingSignal> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    fn make_signal(from: ConnectionId) -> TypingSignal {
        TypingSignal {
            from,
            data: serde_json::json!({"name": "Dana"}),
        }
    }

    #[test]
    fn relay_without_receivers_returns_zero() {
        let channel = TypingChannel::new(16);
        assert_eq!(channel.relay(make_signal(ConnectionId::new())), 0);
    }

    #[tokio::test]
    async fn subscriber_receives_signal() {
        let channel = TypingChannel::new(16);
        let mut rx = channel.subscribe();

        let from = ConnectionId::new();
        assert_eq!(channel.relay(make_signal(from)), 1);

        let Ok(signal) = rx.recv().await else {
            panic!("expected to receive signal");
        };
        assert_eq!(signal.from, from);
    }

    #[test]
    fn receiver_count_tracks_subscribers() {
        let channel = TypingChannel::new(16);
        assert_eq!(channel.receiver_count(), 0);
        let _rx1 = channel.subscribe();
        let _rx2 = channel.subscribe();
        assert_eq!(channel.receiver_count(), 2);
        drop(_rx1);
        assert_eq!(channel.receiver_count(), 1);
    }
}
