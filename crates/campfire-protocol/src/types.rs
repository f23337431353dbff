//! Core wire types for Campfire.
//!
//! There is exactly one message shape on the wire: the [`ChatEnvelope`].
//! Clients send it to post into a room; the server sends it back out to
//! every connection subscribed to that room. Keeping the envelope
//! symmetric means a client can render inbound and outbound traffic with
//! the same code path.

use serde::{Deserialize, Serialize};

use std::fmt;

/// A unique identifier for a chat room.
///
/// Newtype over `u64` so a room id can't be confused with a timestamp
/// or a connection id in a signature. `#[serde(transparent)]` keeps the
/// JSON representation a plain number: `RoomId(7)` serializes as `7`,
/// not `{"0":7}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomId(pub u64);

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "room-{}", self.0)
    }
}

/// The bidirectional real-time message envelope.
///
/// JSON shape (camelCase, matching the browser client):
///
/// ```json
/// { "roomId": 3, "username": "alice", "text": "hi", "roomState": false }
/// ```
///
/// Inbound, only `roomId` and `text` matter: the server overwrites
/// `username` with the identity captured at admission and ignores any
/// client-supplied `roomState`. Outbound, `roomState` always reflects
/// the room's adventure flag *after* the message was processed, so
/// receivers can drive their UI without a separate state fetch.
///
/// An inbound envelope whose `text` is empty after trimming is a
/// presence frame: it subscribes the connection to the room without
/// posting anything. This is how a client opens a room for listening.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatEnvelope {
    /// The room this message belongs to.
    pub room_id: RoomId,

    /// The author. Server-assigned on the way in, authoritative on the
    /// way out.
    #[serde(default)]
    pub username: String,

    /// The message body.
    #[serde(default)]
    pub text: String,

    /// The room's adventure flag after processing this message.
    #[serde(default)]
    pub room_state: bool,
}
