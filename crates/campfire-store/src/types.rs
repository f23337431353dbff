//! Persisted domain types: rooms, messages, history pages, users.

use campfire_protocol::RoomId;
use serde::{Deserialize, Serialize};

use std::fmt;

/// Returns the current wall-clock time as epoch milliseconds.
///
/// Message and page timestamps are wall-clock (they are compared across
/// process restarts and stored durably), unlike session expiry which
/// uses the monotonic clock.
pub fn now_millis() -> u64 {
    chrono::Utc::now().timestamp_millis() as u64
}

/// Opaque handle into the narrative collaborator's conversation context.
///
/// Campfire never looks inside this value; it only stores it against a
/// room while an adventure is active and hands it back to the narrator
/// with each numbered reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ThreadId(pub String);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A chat room as the repository knows it.
///
/// The repository's copy is authoritative. In-memory mirrors of
/// `adventure_active` may lag, but any decision that depends on the
/// adventure state re-reads this record first.
///
/// Invariant: `adventure_active` is `true` if and only if `thread` is
/// `Some`. The two are persisted by separate repository calls, so the
/// reference store derives the flag from the handle to keep the pair
/// from ever diverging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Room {
    /// The room's unique ID.
    pub id: RoomId,
    /// Human-readable room name.
    pub name: String,
    /// Whether an adventure is currently running.
    pub adventure_active: bool,
    /// The narrative collaborator's thread handle, present exactly
    /// while an adventure is active.
    pub thread: Option<ThreadId>,
}

/// One chat message. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    /// Who wrote it: an admitted identity, or the system author for
    /// narrator output.
    pub username: String,
    /// The (already sanitized) message body.
    pub text: String,
    /// When the server accepted it, epoch milliseconds.
    pub timestamp: u64,
}

/// One persisted, time-bounded batch of historical messages for a room.
///
/// The page's `timestamp` is the flush time, which is at or after the
/// timestamp of its newest contained message. Pages are immutable once
/// written; the pager walks them newest-first by requesting strictly
/// older timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationPage {
    /// The room this page belongs to.
    pub room_id: RoomId,
    /// The flush timestamp identifying this page.
    pub timestamp: u64,
    /// The page's messages, in chronological order.
    pub messages: Vec<Message>,
}

/// A registered user, as stored by the repository.
///
/// `password_hash` is opaque to Campfire: the login collaborator owns
/// the hashing scheme and only it ever interprets this field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub password_hash: String,
}
