use campfire_protocol::RoomId;
use campfire_store::StoreError;
use thiserror::Error;

/// Errors surfaced by the room layer.
#[derive(Debug, Error)]
pub enum RoomError {
    /// The room does not exist in the repository.
    #[error("unknown room: {0}")]
    NotFound(RoomId),

    /// The room's actor has stopped and can no longer take commands.
    #[error("room {0} is not accepting commands")]
    Unavailable(RoomId),

    /// A repository call failed.
    #[error(transparent)]
    Storage(StoreError),
}

impl From<StoreError> for RoomError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::RoomNotFound(id) => RoomError::NotFound(id),
            other => RoomError::Storage(other),
        }
    }
}
