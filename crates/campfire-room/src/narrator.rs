//! The narrative-generation collaborator.

use std::future::Future;

use campfire_store::ThreadId;
use thiserror::Error;

/// Errors from the narrator collaborator.
///
/// All variants are treated the same way by the room: the adventure
/// state is left untouched and a fallback notice is broadcast, so
/// players can simply retry.
#[derive(Debug, Error)]
pub enum NarratorError {
    /// The backing service rejected or failed the call.
    #[error("narrator unavailable: {0}")]
    Unavailable(String),

    /// The call exceeded the room's configured deadline.
    #[error("narrator call timed out")]
    Timeout,
}

/// An external service that produces adventure narrative.
///
/// One narrative thread exists per room while an adventure is active;
/// the thread handle is persisted on the room record so the story
/// survives the actor. Calls are slow remote work and the room actor
/// bounds each one with [`RoomConfig::narrator_timeout`](crate::RoomConfig).
pub trait Narrator: Send + Sync + 'static {
    /// Opens a fresh narrative thread for a room.
    fn begin_story(
        &self,
    ) -> impl Future<Output = Result<ThreadId, NarratorError>> + Send;

    /// Feeds the player's chosen option into an existing thread and
    /// returns the next piece of narrative.
    fn continue_story(
        &self,
        thread: &ThreadId,
        choice: u8,
    ) -> impl Future<Output = Result<String, NarratorError>> + Send;
}
