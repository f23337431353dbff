//! The abstract repository trait.

use std::future::Future;

use campfire_protocol::RoomId;

use crate::{ConversationPage, Message, Room, StoreError, ThreadId, User};

/// The persistent store, seen from the core.
///
/// Implementations wrap a real database in production and
/// [`MemoryStore`](crate::MemoryStore) in tests and the demo. Methods
/// return `impl Future + Send` rather than plain `async fn` so the
/// futures can cross task boundaries; implementors still just write
/// `async fn`.
///
/// Every method may fail with a transient [`StoreError`]; callers must
/// treat these as fallible remote calls, never as infallible local
/// state.
pub trait Repository: Send + Sync + 'static {
    /// Fetches the authoritative record for a room.
    fn room(
        &self,
        id: RoomId,
    ) -> impl Future<Output = Result<Room, StoreError>> + Send;

    /// Persists the room's adventure flag.
    fn set_adventure(
        &self,
        id: RoomId,
        active: bool,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Persists (or clears) the room's narrative thread handle.
    ///
    /// Implementations must derive `adventure_active` from the handle
    /// in the same write (`Some` ⇒ active, `None` ⇒ idle), so the room
    /// record never shows a live adventure without a thread to drive it
    /// even between a caller's separate `set_thread`/`set_adventure`
    /// calls. [`MemoryStore`](crate::MemoryStore) is the reference for
    /// this behavior.
    fn set_thread(
        &self,
        id: RoomId,
        thread: Option<ThreadId>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Appends one conversation record: the given messages as a single
    /// page tagged with `timestamp`.
    ///
    /// Page timestamps double as the pagination cursor, and
    /// [`conversation_before`](Self::conversation_before) walks them
    /// with a strict `<`. Two pages for one room flushed in the same
    /// millisecond therefore share a cursor value, and once the walk
    /// advances past one of them the tied sibling is skipped. Flushes
    /// are paced well above millisecond resolution in practice, so the
    /// collision is accepted rather than disambiguated.
    fn append_conversation(
        &self,
        room_id: RoomId,
        timestamp: u64,
        messages: Vec<Message>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    /// Returns the most recent conversation page for `room_id` whose
    /// timestamp is strictly less than `before`, or `None` when no
    /// qualifying page exists (history exhausted).
    fn conversation_before(
        &self,
        room_id: RoomId,
        before: u64,
    ) -> impl Future<Output = Result<Option<ConversationPage>, StoreError>> + Send;

    /// Looks up a registered user for the login collaborator.
    fn user(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<User>, StoreError>> + Send;
}
