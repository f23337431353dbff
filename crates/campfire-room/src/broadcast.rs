//! Per-room fan-out to subscribed connections.

use std::collections::HashMap;

use campfire_protocol::ChatEnvelope;
use campfire_transport::ConnectionId;
use tokio::sync::mpsc;
use tracing::debug;

/// The set of connections subscribed to one room, with their outbound
/// queues.
///
/// Senders whose receiving side has gone away are pruned on the next
/// delivery attempt; a dead peer never blocks delivery to the rest of
/// the room.
#[derive(Debug, Default)]
pub struct Broadcaster {
    peers: HashMap<ConnectionId, mpsc::UnboundedSender<ChatEnvelope>>,
}

impl Broadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection. Re-subscribing replaces the previous sender.
    pub fn subscribe(
        &mut self,
        conn: ConnectionId,
        sender: mpsc::UnboundedSender<ChatEnvelope>,
    ) {
        self.peers.insert(conn, sender);
    }

    /// Removes a connection. Returns whether it was subscribed.
    pub fn unsubscribe(&mut self, conn: ConnectionId) -> bool {
        self.peers.remove(&conn).is_some()
    }

    pub fn contains(&self, conn: ConnectionId) -> bool {
        self.peers.contains_key(&conn)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Delivers to every subscriber, the author included.
    pub fn send_to_all(&mut self, envelope: &ChatEnvelope) {
        self.fan_out(None, envelope);
    }

    /// Delivers to every subscriber except `author`.
    pub fn send_to_others(
        &mut self,
        author: ConnectionId,
        envelope: &ChatEnvelope,
    ) {
        self.fan_out(Some(author), envelope);
    }

    fn fan_out(
        &mut self,
        skip: Option<ConnectionId>,
        envelope: &ChatEnvelope,
    ) {
        self.peers.retain(|conn, sender| {
            if skip == Some(*conn) {
                return true;
            }
            if sender.send(envelope.clone()).is_ok() {
                true
            } else {
                debug!(conn = %conn, "pruning dead subscriber");
                false
            }
        });
    }
}
