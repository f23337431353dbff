//! Error types for the storage layer.

use campfire_protocol::RoomId;

/// Errors returned by [`Repository`](crate::Repository) implementations.
///
/// The core treats every repository call as a fallible remote call.
/// `Unavailable` is the transient case: callers log it and keep going
/// (retained flush buffer, demoted transition, retryable pull) rather
/// than crashing the process.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No room exists with this id.
    #[error("room {0} not found")]
    RoomNotFound(RoomId),

    /// The backing store failed transiently (connection dropped, write
    /// timed out, ...). Retrying later may succeed.
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
