//! Logical routing keys for event delivery.
//!
//! A [`ChannelAddress`] identifies *who* an event is for without knowing
//! anything about transports: either a single user's personal channel or the
//! shared admin channel. Addresses are runtime routing keys only and are
//! never persisted.

use std::fmt;

use uuid::Uuid;

/// Logical delivery target for a domain event.
///
/// A connection may be joined to at most one `User` address per user id and
/// may additionally be joined to `Admin`; the two axes are independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChannelAddress {
    /// Personal channel of a single user.
    User(Uuid),
    /// Shared channel for all connected administrators.
    Admin,
}

impl fmt::Display for ChannelAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User(id) => write!(f, "user:{id}"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn display_formats_routing_key() {
        let id = Uuid::new_v4();
        assert_eq!(format!("{}", ChannelAddress::User(id)), format!("user:{id}"));
        assert_eq!(format!("{}", ChannelAddress::Admin), "admin");
    }

    #[test]
    fn user_addresses_compare_by_id() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(ChannelAddress::User(a), ChannelAddress::User(a));
        assert_ne!(ChannelAddress::User(a), ChannelAddress::User(b));
        assert_ne!(ChannelAddress::User(a), ChannelAddress::Admin);
    }
}
