//! Cross-session broadcast bus.
//!
//! The bus converges login/logout state across every session instance
//! attached to it, the way a browser origin's broadcast channel converges
//! tabs. It is an explicitly constructed value, not a global: hosts build
//! one and hand clones to each coordinator, and tests can run several
//! coordinators against one bus in-process.
//!
//! Delivery is best-effort and at-most-once per receiver, ordered per
//! sender. A receiver that falls behind drops the missed messages and
//! keeps going; transient divergence resolves at the next action in the
//! stale instance.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::broadcast;
use tracing::warn;

/// Queue depth per receiver. Login/logout traffic is a handful of
/// messages per session lifetime, so a small queue is plenty.
const BUS_CAPACITY: usize = 16;

/// Signal sent to every other session instance on the same bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthMessage {
    /// Someone logged in; adopt this token.
    Login { token: String },
    /// Someone logged out; clear local state, do not re-broadcast.
    Logout,
}

/// Tag identifying which registration published a message, so a receiver
/// can skip its own broadcasts.
pub type SenderId = u64;

#[derive(Debug, Clone)]
struct Envelope {
    sender: SenderId,
    message: AuthMessage,
}

#[derive(Clone)]
pub struct AuthBus {
    tx: broadcast::Sender<Envelope>,
    next_id: Arc<AtomicU64>,
}

impl AuthBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self {
            tx,
            next_id: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Attach a participant: a unique sender tag plus a receiver that
    /// filters out that tag's own messages.
    pub fn register(&self) -> (SenderId, BusReceiver) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let rx = BusReceiver {
            own_id: id,
            rx: self.tx.subscribe(),
        };
        (id, rx)
    }

    /// Publish to every other participant. Best-effort: with no receivers
    /// attached the message is simply dropped.
    pub fn publish(&self, sender: SenderId, message: AuthMessage) {
        let _ = self.tx.send(Envelope { sender, message });
    }
}

impl Default for AuthBus {
    fn default() -> Self {
        Self::new()
    }
}

pub struct BusReceiver {
    own_id: SenderId,
    rx: broadcast::Receiver<Envelope>,
}

impl BusReceiver {
    /// Take the next pending message without waiting. Returns `None` once
    /// the queue is drained or the bus is gone.
    pub fn try_next(&mut self) -> Option<AuthMessage> {
        loop {
            match self.rx.try_recv() {
                Ok(env) if env.sender == self.own_id => continue,
                Ok(env) => return Some(env.message),
                Err(broadcast::error::TryRecvError::Lagged(missed)) => {
                    warn!(missed, "auth bus receiver lagged, dropping missed messages");
                    continue;
                }
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn receivers_skip_their_own_messages() {
        let bus = AuthBus::new();
        let (id_a, mut rx_a) = bus.register();
        let (_id_b, mut rx_b) = bus.register();

        bus.publish(id_a, AuthMessage::Logout);

        assert_eq!(rx_a.try_next(), None);
        assert_eq!(rx_b.try_next(), Some(AuthMessage::Logout));
        assert_eq!(rx_b.try_next(), None);
    }

    #[test]
    fn messages_are_ordered_per_sender() {
        let bus = AuthBus::new();
        let (id_a, _rx_a) = bus.register();
        let (_id_b, mut rx_b) = bus.register();

        bus.publish(id_a, AuthMessage::Login { token: "t1".into() });
        bus.publish(id_a, AuthMessage::Logout);

        assert_eq!(rx_b.try_next(), Some(AuthMessage::Login { token: "t1".into() }));
        assert_eq!(rx_b.try_next(), Some(AuthMessage::Logout));
    }

    #[test]
    fn publish_without_receivers_is_silent() {
        let bus = AuthBus::new();
        let (id, rx) = bus.register();
        drop(rx);
        bus.publish(id, AuthMessage::Logout);
    }
}
