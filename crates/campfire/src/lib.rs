//! # Campfire
//!
//! Session-gated real-time chat server with adventure rooms.
//!
//! Campfire is a WebSocket chat backend where every room doubles as a
//! chat room and an interactive adventure: typing `begin adventure`
//! switches the room into story mode, players steer with numbered
//! options, and an external narrator produces the narrative. The
//! framework handles transport, session admission, per-room ordering,
//! and batched conversation persistence; callers plug in a
//! [`Repository`](campfire_store::Repository) for storage and a
//! [`Narrator`](campfire_room::Narrator) for story generation.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use campfire::prelude::*;
//!
//! # struct MyNarrator;
//! # impl Narrator for MyNarrator {
//! #     async fn begin_story(&self) -> Result<ThreadId, NarratorError> { todo!() }
//! #     async fn continue_story(&self, _: &ThreadId, _: u8) -> Result<String, NarratorError> { todo!() }
//! # }
//! # async fn run() -> Result<(), CampfireError> {
//! let repo = Arc::new(MemoryStore::new());
//! repo.add_room("lobby");
//!
//! let server = CampfireServerBuilder::new()
//!     .bind("0.0.0.0:8080")
//!     .build(repo, Arc::new(MyNarrator))
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod server;

pub use error::CampfireError;
pub use server::{CampfireServer, CampfireServerBuilder};

/// Everything needed to stand up a server.
pub mod prelude {
    pub use crate::{CampfireError, CampfireServer, CampfireServerBuilder};
    pub use campfire_protocol::{ChatEnvelope, RoomId};
    pub use campfire_room::{Narrator, NarratorError, RoomConfig};
    pub use campfire_session::{SessionConfig, SessionStore};
    pub use campfire_store::{MemoryStore, Repository, ThreadId};
}
