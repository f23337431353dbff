//! Room layer for Campfire.
//!
//! Each live room runs as an isolated Tokio task (actor model) that
//! owns the room's unsaved-message buffer, its broadcast fan-out set,
//! and the adventure state machine. Commands reach the actor through a
//! bounded mpsc channel, which is what gives the system its two core
//! ordering guarantees: messages for one room are processed in arrival
//! order, and a slow narrator call stalls only its own room.
//!
//! # Key types
//!
//! - [`RoomRegistry`] — spawns and tracks one actor per live room
//! - [`RoomHandle`] — sends commands to a running actor
//! - [`Narrator`] — the external narrative-generation collaborator
//! - [`MessageBuffer`] — not-yet-persisted messages, flushed in batches
//! - [`Broadcaster`] — per-room fan-out to subscribed connections
//! - [`classify`] / [`Trigger`] — text classification for the
//!   adventure state machine

#![allow(async_fn_in_trait)]

mod broadcast;
mod buffer;
mod config;
mod error;
mod logic;
mod narrator;
mod registry;
mod room;

pub use broadcast::Broadcaster;
pub use buffer::MessageBuffer;
pub use config::RoomConfig;
pub use error::RoomError;
pub use logic::{
    classify, end_message, fallback_message, options_message, Trigger,
    SYSTEM_AUTHOR,
};
pub use narrator::{Narrator, NarratorError};
pub use registry::RoomRegistry;
pub use room::{spawn_room, RoomHandle};
