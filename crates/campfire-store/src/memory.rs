//! In-memory reference implementation of [`Repository`].
//!
//! Used by the demo binary and throughout the test suites. Not a
//! durability story: everything lives in one mutex-guarded struct and
//! dies with the process. The value of this type is that it implements
//! the repository contract exactly, including the Active ⇔ thread
//! invariant, so the core can be exercised without a database.

use std::collections::HashMap;
use std::sync::Mutex;

use campfire_protocol::RoomId;

use crate::{
    ConversationPage, Message, Repository, Room, StoreError, ThreadId, User,
};

#[derive(Default)]
struct Inner {
    rooms: HashMap<RoomId, Room>,
    /// All persisted pages, unordered; reads scan and pick by timestamp.
    conversations: Vec<ConversationPage>,
    users: HashMap<String, User>,
    next_room_id: u64,
}

/// An in-process [`Repository`].
///
/// Cheap to share behind an `Arc`; the interior mutex is never held
/// across an await point.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a room in plain-chat mode and returns its record.
    pub fn add_room(&self, name: &str) -> Room {
        let mut inner = self.inner.lock().expect("store lock");
        inner.next_room_id += 1;
        let room = Room {
            id: RoomId(inner.next_room_id),
            name: name.to_owned(),
            adventure_active: false,
            thread: None,
        };
        inner.rooms.insert(room.id, room.clone());
        room
    }

    /// Registers a user. The hash is opaque to the store.
    pub fn add_user(&self, username: &str, password_hash: &str) {
        let mut inner = self.inner.lock().expect("store lock");
        inner.users.insert(
            username.to_owned(),
            User {
                username: username.to_owned(),
                password_hash: password_hash.to_owned(),
            },
        );
    }

    /// Returns how many conversation pages have been persisted for a
    /// room. Test helper.
    pub fn page_count(&self, room_id: RoomId) -> usize {
        self.inner
            .lock()
            .expect("store lock")
            .conversations
            .iter()
            .filter(|p| p.room_id == room_id)
            .count()
    }
}

impl Repository for MemoryStore {
    async fn room(&self, id: RoomId) -> Result<Room, StoreError> {
        self.inner
            .lock()
            .expect("store lock")
            .rooms
            .get(&id)
            .cloned()
            .ok_or(StoreError::RoomNotFound(id))
    }

    async fn set_adventure(
        &self,
        id: RoomId,
        active: bool,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store lock");
        let room = inner
            .rooms
            .get_mut(&id)
            .ok_or(StoreError::RoomNotFound(id))?;
        room.adventure_active = active;
        Ok(())
    }

    async fn set_thread(
        &self,
        id: RoomId,
        thread: Option<ThreadId>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store lock");
        let room = inner
            .rooms
            .get_mut(&id)
            .ok_or(StoreError::RoomNotFound(id))?;
        // Derive the flag from the handle so the Active ⇔ thread
        // invariant holds even between the caller's two update calls.
        room.adventure_active = thread.is_some();
        room.thread = thread;
        Ok(())
    }

    async fn append_conversation(
        &self,
        room_id: RoomId,
        timestamp: u64,
        messages: Vec<Message>,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().expect("store lock");
        if !inner.rooms.contains_key(&room_id) {
            return Err(StoreError::RoomNotFound(room_id));
        }
        inner.conversations.push(ConversationPage {
            room_id,
            timestamp,
            messages,
        });
        Ok(())
    }

    async fn conversation_before(
        &self,
        room_id: RoomId,
        before: u64,
    ) -> Result<Option<ConversationPage>, StoreError> {
        let inner = self.inner.lock().expect("store lock");
        Ok(inner
            .conversations
            .iter()
            .filter(|p| p.room_id == room_id && p.timestamp < before)
            .max_by_key(|p| p.timestamp)
            .cloned())
    }

    async fn user(
        &self,
        username: &str,
    ) -> Result<Option<User>, StoreError> {
        Ok(self
            .inner
            .lock()
            .expect("store lock")
            .users
            .get(username)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg(username: &str, text: &str, timestamp: u64) -> Message {
        Message {
            username: username.into(),
            text: text.into(),
            timestamp,
        }
    }

    #[tokio::test]
    async fn test_room_returns_not_found_for_unknown_id() {
        let store = MemoryStore::new();

        let result = store.room(RoomId(99)).await;

        assert!(matches!(result, Err(StoreError::RoomNotFound(_))));
    }

    #[tokio::test]
    async fn test_add_room_starts_in_plain_chat_mode() {
        let store = MemoryStore::new();

        let room = store.add_room("lobby");

        assert_eq!(room.name, "lobby");
        assert!(!room.adventure_active);
        assert!(room.thread.is_none());
    }

    #[tokio::test]
    async fn test_set_thread_keeps_adventure_flag_consistent() {
        // Active ⇔ thread non-null, at every observable point.
        let store = MemoryStore::new();
        let room = store.add_room("lobby");

        store
            .set_thread(room.id, Some(ThreadId("t-1".into())))
            .await
            .unwrap();
        let active = store.room(room.id).await.unwrap();
        assert!(active.adventure_active);
        assert_eq!(active.thread, Some(ThreadId("t-1".into())));

        store.set_thread(room.id, None).await.unwrap();
        let idle = store.room(room.id).await.unwrap();
        assert!(!idle.adventure_active);
        assert!(idle.thread.is_none());
    }

    #[tokio::test]
    async fn test_conversation_before_picks_newest_qualifying_page() {
        let store = MemoryStore::new();
        let room = store.add_room("lobby");
        store
            .append_conversation(room.id, 100, vec![msg("a", "one", 90)])
            .await
            .unwrap();
        store
            .append_conversation(room.id, 200, vec![msg("a", "two", 190)])
            .await
            .unwrap();
        store
            .append_conversation(room.id, 300, vec![msg("a", "three", 290)])
            .await
            .unwrap();

        let page = store
            .conversation_before(room.id, 300)
            .await
            .unwrap()
            .expect("page should exist");

        // Strictly less than: the page at 300 itself is excluded.
        assert_eq!(page.timestamp, 200);
    }

    #[tokio::test]
    async fn test_conversation_before_returns_none_when_exhausted() {
        let store = MemoryStore::new();
        let room = store.add_room("lobby");
        store
            .append_conversation(room.id, 100, vec![msg("a", "one", 90)])
            .await
            .unwrap();

        let page =
            store.conversation_before(room.id, 100).await.unwrap();

        assert!(page.is_none());
    }

    #[tokio::test]
    async fn test_tied_page_timestamps_collapse_under_the_cursor() {
        // Two flushes landing in the same millisecond share a cursor
        // value; walking strictly below it skips the tied sibling.
        let store = MemoryStore::new();
        let room = store.add_room("lobby");
        store
            .append_conversation(room.id, 100, vec![msg("a", "one", 90)])
            .await
            .unwrap();
        store
            .append_conversation(room.id, 100, vec![msg("a", "two", 95)])
            .await
            .unwrap();

        let first = store
            .conversation_before(room.id, 101)
            .await
            .unwrap()
            .expect("one of the tied pages");
        assert_eq!(first.timestamp, 100);

        // Advancing the cursor to the tie ends the walk.
        let rest =
            store.conversation_before(room.id, 100).await.unwrap();
        assert!(rest.is_none());
    }

    #[tokio::test]
    async fn test_conversation_before_scoped_to_room() {
        let store = MemoryStore::new();
        let lobby = store.add_room("lobby");
        let den = store.add_room("den");
        store
            .append_conversation(lobby.id, 100, vec![msg("a", "hi", 90)])
            .await
            .unwrap();

        let page =
            store.conversation_before(den.id, 1000).await.unwrap();

        assert!(page.is_none(), "pages must not leak across rooms");
    }

    #[tokio::test]
    async fn test_user_lookup() {
        let store = MemoryStore::new();
        store.add_user("alice", "salted-opaque-hash");

        let found = store.user("alice").await.unwrap();
        assert_eq!(found.unwrap().password_hash, "salted-opaque-hash");

        let missing = store.user("mallory").await.unwrap();
        assert!(missing.is_none());
    }
}
