//! Spawns and tracks one actor per live room.

use std::collections::HashMap;
use std::sync::Arc;

use campfire_protocol::RoomId;
use campfire_store::Repository;
use tracing::info;

use crate::config::RoomConfig;
use crate::error::RoomError;
use crate::narrator::Narrator;
use crate::room::{spawn_room, RoomHandle};

/// The set of running room actors.
///
/// Actors are spawned lazily: the first command addressed to a room
/// verifies the room exists in the repository, then starts its task.
/// Subsequent lookups return the cached handle.
pub struct RoomRegistry<R, N> {
    repo: Arc<R>,
    narrator: Arc<N>,
    config: RoomConfig,
    rooms: HashMap<RoomId, RoomHandle>,
}

impl<R, N> RoomRegistry<R, N>
where
    R: Repository,
    N: Narrator,
{
    pub fn new(repo: Arc<R>, narrator: Arc<N>, config: RoomConfig) -> Self {
        Self {
            repo,
            narrator,
            config,
            rooms: HashMap::new(),
        }
    }

    /// Returns the handle for a room, spawning its actor on first use.
    ///
    /// Fails with [`RoomError::NotFound`] when the repository has no
    /// such room; an actor is never spawned for a nonexistent room.
    pub async fn room(&mut self, room_id: RoomId) -> Result<RoomHandle, RoomError> {
        if let Some(handle) = self.rooms.get(&room_id) {
            return Ok(handle.clone());
        }
        self.repo.room(room_id).await?;
        let handle = spawn_room(
            room_id,
            Arc::clone(&self.repo),
            Arc::clone(&self.narrator),
            self.config.clone(),
        );
        info!(room = %room_id, "spawned room actor");
        self.rooms.insert(room_id, handle.clone());
        Ok(handle)
    }

    /// Reads the room's current adventure flag straight from the
    /// repository. Used by callers that need room state without
    /// posting a message, such as a history view deciding how to
    /// render.
    pub async fn adventure_state(&self, room_id: RoomId) -> Result<bool, RoomError> {
        Ok(self.repo.room(room_id).await?.adventure_active)
    }

    /// Number of actors currently running.
    pub fn live_rooms(&self) -> usize {
        self.rooms.len()
    }

    /// Stops a room's actor and forgets its handle. Queued commands
    /// are drained and the buffer is flushed before the task exits.
    pub async fn retire(&mut self, room_id: RoomId) {
        if let Some(handle) = self.rooms.remove(&room_id) {
            let _ = handle.shutdown().await;
            info!(room = %room_id, "retired room actor");
        }
    }
}
