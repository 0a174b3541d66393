//! Channel registry mapping routing addresses to live connections.
//!
//! [`ChannelRegistry`] stores, per [`ChannelAddress`], the set of connections
//! currently joined, plus one outbound handle per connection. Delivery is
//! best-effort with no replay: connections not joined at publish time receive
//! nothing.
//!
//! # Concurrency
//!
//! All operations take a short [`std::sync::Mutex`] critical section and
//! never suspend while holding it, so two publishes to the same address are
//! delivered in call order. The registry holds only the send half of each
//! connection's channel; the connection task owns the socket, and a send to
//! a torn-down connection fails without affecting other recipients.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

use tokio::sync::mpsc::UnboundedSender;

use super::{ChannelAddress, ConnectionId, DomainEvent};

/// Per-connection bookkeeping: outbound handle plus joined addresses.
#[derive(Debug)]
struct ConnectionEntry {
    sender: UnboundedSender<DomainEvent>,
    joined: HashSet<ChannelAddress>,
}

#[derive(Debug, Default)]
struct RegistryInner {
    channels: HashMap<ChannelAddress, HashSet<ConnectionId>>,
    connections: HashMap<ConnectionId, ConnectionEntry>,
}

/// Process-wide routing table for live event delivery.
///
/// Constructed once at startup and injected wherever events are emitted or
/// connections are managed; tests instantiate isolated registries.
#[derive(Debug, Default)]
pub struct ChannelRegistry {
    inner: Mutex<RegistryInner>,
}

impl ChannelRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, RegistryInner> {
        // A poisoned lock only means another task panicked mid-operation;
        // the map itself is still structurally sound.
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    /// Registers a freshly connected transport with its outbound handle.
    ///
    /// The connection starts with no channel memberships.
    pub fn register(&self, id: ConnectionId, sender: UnboundedSender<DomainEvent>) {
        let mut inner = self.lock();
        inner.connections.insert(
            id,
            ConnectionEntry {
                sender,
                joined: HashSet::new(),
            },
        );
        tracing::debug!(%id, total = inner.connections.len(), "connection registered");
    }

    /// Adds a connection to an address. Idempotent; unknown connections are
    /// ignored.
    ///
    /// Joining is additive: a connection keeps every address it has joined
    /// until it leaves or disconnects.
    pub fn join(&self, id: ConnectionId, address: ChannelAddress) {
        let mut guard = self.lock();
        let inner = &mut *guard;
        let Some(entry) = inner.connections.get_mut(&id) else {
            tracing::debug!(%id, %address, "join for unregistered connection ignored");
            return;
        };
        if entry.joined.insert(address) {
            inner.channels.entry(address).or_default().insert(id);
            tracing::info!(%id, %address, "connection joined channel");
        }
    }

    /// Removes a connection from an address. Idempotent; no error if absent.
    pub fn leave(&self, id: ConnectionId, address: ChannelAddress) {
        let mut inner = self.lock();
        if let Some(entry) = inner.connections.get_mut(&id) {
            entry.joined.remove(&address);
        }
        if let Some(members) = inner.channels.get_mut(&address) {
            if members.remove(&id) {
                tracing::info!(%id, %address, "connection left channel");
            }
            if members.is_empty() {
                inner.channels.remove(&address);
            }
        }
    }

    /// Delivers an event to every connection joined to `address`.
    ///
    /// Returns the number of connections the event was handed to; zero
    /// recipients is a normal outcome, not an error. A failed hand-off to
    /// one recipient (connection torn down concurrently) is logged and does
    /// not affect the others.
    pub fn publish(&self, address: ChannelAddress, event: &DomainEvent) -> usize {
        let inner = self.lock();
        let Some(members) = inner.channels.get(&address) else {
            return 0;
        };
        let mut delivered = 0;
        for id in members {
            let Some(entry) = inner.connections.get(id) else {
                continue;
            };
            if entry.sender.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                tracing::warn!(
                    connection = %id,
                    %address,
                    event = event.event_name(),
                    "recipient unreachable, skipping"
                );
            }
        }
        tracing::debug!(%address, event = event.event_name(), delivered, "event published");
        delivered
    }

    /// Delivers an event to every registered connection regardless of
    /// channel membership.
    ///
    /// Returns the number of connections reached.
    pub fn broadcast(&self, event: &DomainEvent) -> usize {
        let inner = self.lock();
        let mut delivered = 0;
        for (id, entry) in &inner.connections {
            if entry.sender.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                tracing::warn!(connection = %id, event = event.event_name(), "recipient unreachable, skipping");
            }
        }
        delivered
    }

    /// Removes a connection from every channel and drops its handle.
    ///
    /// Idempotent: tearing down an already-removed connection is a no-op,
    /// so concurrent disconnect and error signals cannot double-remove.
    pub fn deregister(&self, id: ConnectionId) {
        let mut inner = self.lock();
        let Some(entry) = inner.connections.remove(&id) else {
            return;
        };
        for address in entry.joined {
            if let Some(members) = inner.channels.get_mut(&address) {
                members.remove(&id);
                if members.is_empty() {
                    inner.channels.remove(&address);
                }
            }
        }
        tracing::debug!(%id, total = inner.connections.len(), "connection deregistered");
    }

    /// Returns the number of connections currently joined to `address`.
    #[must_use]
    pub fn member_count(&self, address: ChannelAddress) -> usize {
        self.lock()
            .channels
            .get(&address)
            .map_or(0, HashSet::len)
    }

    /// Returns the number of registered connections.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.lock().connections.len()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::models::{Order, OrderStatus, OrderType};
    use chrono::Utc;
    use tokio::sync::mpsc;
    use uuid::Uuid;

    fn make_order_event(user_id: Uuid) -> DomainEvent {
        DomainEvent::OrderCreated(Order {
            id: Uuid::new_v4(),
            user_id,
            items: vec![],
            total_amount: 12.0,
            status: OrderStatus::Pending,
            order_type: OrderType::Pickup,
            delivery_address: None,
            phone: "555-0101".to_string(),
            special_instructions: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        })
    }

    fn connect(
        registry: &ChannelRegistry,
    ) -> (ConnectionId, mpsc::UnboundedReceiver<DomainEvent>) {
        let id = ConnectionId::new();
        let (tx, rx) = mpsc::unbounded_channel();
        registry.register(id, tx);
        (id, rx)
    }

    #[test]
    fn publish_reaches_exactly_joined_connections() {
        let registry = ChannelRegistry::new();
        let user = Uuid::new_v4();
        let (a, mut rx_a) = connect(&registry);
        let (b, mut rx_b) = connect(&registry);

        registry.join(a, ChannelAddress::User(user));
        registry.join(b, ChannelAddress::Admin);

        let count = registry.publish(ChannelAddress::User(user), &make_order_event(user));
        assert_eq!(count, 1);
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_err());
    }

    #[test]
    fn publish_to_empty_address_returns_zero() {
        let registry = ChannelRegistry::new();
        let count = registry.publish(ChannelAddress::Admin, &make_order_event(Uuid::new_v4()));
        assert_eq!(count, 0);
    }

    #[test]
    fn join_is_idempotent() {
        let registry = ChannelRegistry::new();
        let (id, mut rx) = connect(&registry);
        registry.join(id, ChannelAddress::Admin);
        registry.join(id, ChannelAddress::Admin);

        let count = registry.publish(ChannelAddress::Admin, &make_order_event(Uuid::new_v4()));
        assert_eq!(count, 1);
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_err()); // no duplicate delivery
    }

    #[test]
    fn join_is_additive_across_addresses() {
        let registry = ChannelRegistry::new();
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();
        let (id, mut rx) = connect(&registry);

        registry.join(id, ChannelAddress::User(user_a));
        registry.join(id, ChannelAddress::User(user_b));

        assert_eq!(
            registry.publish(ChannelAddress::User(user_a), &make_order_event(user_a)),
            1
        );
        assert_eq!(
            registry.publish(ChannelAddress::User(user_b), &make_order_event(user_b)),
            1
        );
        assert!(rx.try_recv().is_ok());
        assert!(rx.try_recv().is_ok());
    }

    #[test]
    fn leave_removes_membership() {
        let registry = ChannelRegistry::new();
        let (id, _rx) = connect(&registry);
        registry.join(id, ChannelAddress::Admin);
        assert_eq!(registry.member_count(ChannelAddress::Admin), 1);

        registry.leave(id, ChannelAddress::Admin);
        assert_eq!(registry.member_count(ChannelAddress::Admin), 0);

        // Leaving again is fine.
        registry.leave(id, ChannelAddress::Admin);
        assert_eq!(
            registry.publish(ChannelAddress::Admin, &make_order_event(Uuid::new_v4())),
            0
        );
    }

    #[test]
    fn admin_membership_is_orthogonal_to_user_membership() {
        let registry = ChannelRegistry::new();
        let user = Uuid::new_v4();
        let (id, _rx) = connect(&registry);

        registry.join(id, ChannelAddress::User(user));
        registry.join(id, ChannelAddress::Admin);
        registry.leave(id, ChannelAddress::Admin);

        assert_eq!(registry.member_count(ChannelAddress::User(user)), 1);
        assert_eq!(registry.member_count(ChannelAddress::Admin), 0);
    }

    #[test]
    fn deregister_is_idempotent_and_complete() {
        let registry = ChannelRegistry::new();
        let user = Uuid::new_v4();
        let (id, _rx) = connect(&registry);
        registry.join(id, ChannelAddress::User(user));
        registry.join(id, ChannelAddress::Admin);

        registry.deregister(id);
        registry.deregister(id);

        assert_eq!(registry.connection_count(), 0);
        assert_eq!(registry.member_count(ChannelAddress::User(user)), 0);
        assert_eq!(registry.member_count(ChannelAddress::Admin), 0);
    }

    #[test]
    fn dead_recipient_does_not_block_others() {
        let registry = ChannelRegistry::new();
        let (a, rx_a) = connect(&registry);
        let (b, mut rx_b) = connect(&registry);
        registry.join(a, ChannelAddress::Admin);
        registry.join(b, ChannelAddress::Admin);

        drop(rx_a); // a's task died without deregistering yet

        let count = registry.publish(ChannelAddress::Admin, &make_order_event(Uuid::new_v4()));
        assert_eq!(count, 1);
        assert!(rx_b.try_recv().is_ok());
    }

    #[test]
    fn new_order_fanout_reaches_admin_not_unrelated_user() {
        let registry = ChannelRegistry::new();
        let user_a = Uuid::new_v4();
        let user_b = Uuid::new_v4();
        let (a, mut rx_a) = connect(&registry);
        let (b, mut rx_b) = connect(&registry);

        registry.join(a, ChannelAddress::User(user_a));
        registry.join(b, ChannelAddress::Admin);

        // Order placed by a third user always lands on the admin channel.
        let event = make_order_event(user_b);
        let Some(target) = event.target() else {
            panic!("order events are targeted");
        };
        registry.publish(target, &event);

        assert!(rx_b.try_recv().is_ok());
        assert!(rx_a.try_recv().is_err());
    }

    #[test]
    fn broadcast_reaches_every_connection() {
        let registry = ChannelRegistry::new();
        let (_a, mut rx_a) = connect(&registry);
        let (_b, mut rx_b) = connect(&registry);

        let event = DomainEvent::Broadcast {
            event: "system:maintenance".to_string(),
            data: serde_json::json!({"at": "23:00"}),
        };
        assert_eq!(registry.broadcast(&event), 2);
        assert!(rx_a.try_recv().is_ok());
        assert!(rx_b.try_recv().is_ok());
    }
}
