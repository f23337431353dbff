//! The per-room actor.
//!
//! One Tokio task owns everything a room needs: the message buffer,
//! the broadcast set, and a mirror of the adventure flag. Commands
//! arrive on a bounded mpsc channel, so messages for a room are
//! processed strictly in arrival order and a narrator call in one room
//! never delays another.
//!
//! The repository is the single source of truth for adventure state.
//! The actor re-reads the room record before evaluating any trigger,
//! so the decision always reflects what is persisted, not a cached
//! flag. The local `active` field is only a mirror used to tag
//! outgoing envelopes when the repository cannot be reached.

use std::sync::Arc;

use campfire_protocol::{ChatEnvelope, RoomId};
use campfire_store::{now_millis, Message, Repository, ThreadId};
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::broadcast::Broadcaster;
use crate::buffer::MessageBuffer;
use crate::config::RoomConfig;
use crate::error::RoomError;
use crate::logic::{
    classify, end_message, fallback_message, options_message, Trigger,
    SYSTEM_AUTHOR,
};
use crate::narrator::{Narrator, NarratorError};

use campfire_transport::ConnectionId;

enum RoomCommand {
    Subscribe {
        conn: ConnectionId,
        sender: mpsc::UnboundedSender<ChatEnvelope>,
        ack: oneshot::Sender<()>,
    },
    Unsubscribe {
        conn: ConnectionId,
    },
    Inbound {
        conn: ConnectionId,
        username: String,
        text: String,
    },
    Shutdown,
}

/// Cheap-to-clone handle to a running room actor.
#[derive(Clone)]
pub struct RoomHandle {
    room_id: RoomId,
    sender: mpsc::Sender<RoomCommand>,
}

impl RoomHandle {
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// Adds a connection to the room's broadcast set. Resolves once
    /// the actor has registered the subscriber, so a message sent
    /// afterwards is guaranteed to reach it.
    pub async fn subscribe(
        &self,
        conn: ConnectionId,
        sender: mpsc::UnboundedSender<ChatEnvelope>,
    ) -> Result<(), RoomError> {
        let (ack, done) = oneshot::channel();
        self.send(RoomCommand::Subscribe { conn, sender, ack }).await?;
        done.await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }

    /// Removes a connection from the broadcast set.
    pub async fn unsubscribe(
        &self,
        conn: ConnectionId,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Unsubscribe { conn }).await
    }

    /// Submits a chat line for processing.
    pub async fn post(
        &self,
        conn: ConnectionId,
        username: String,
        text: String,
    ) -> Result<(), RoomError> {
        self.send(RoomCommand::Inbound {
            conn,
            username,
            text,
        })
        .await
    }

    /// Asks the actor to stop after draining queued commands.
    pub async fn shutdown(&self) -> Result<(), RoomError> {
        self.send(RoomCommand::Shutdown).await
    }

    async fn send(&self, command: RoomCommand) -> Result<(), RoomError> {
        self.sender
            .send(command)
            .await
            .map_err(|_| RoomError::Unavailable(self.room_id))
    }
}

/// Spawns the actor task for one room and returns its handle.
///
/// The caller is expected to have verified the room exists; the actor
/// itself trusts the repository on every message.
pub fn spawn_room<R, N>(
    room_id: RoomId,
    repo: Arc<R>,
    narrator: Arc<N>,
    config: RoomConfig,
) -> RoomHandle
where
    R: Repository,
    N: Narrator,
{
    let (sender, receiver) = mpsc::channel(config.mailbox_capacity);
    let actor = RoomActor {
        room_id,
        repo,
        narrator,
        buffer: MessageBuffer::new(config.flush_threshold),
        broadcaster: Broadcaster::new(),
        active: false,
        config,
        receiver,
    };
    tokio::spawn(actor.run());
    RoomHandle { room_id, sender }
}

struct RoomActor<R, N> {
    room_id: RoomId,
    repo: Arc<R>,
    narrator: Arc<N>,
    buffer: MessageBuffer,
    broadcaster: Broadcaster,
    /// Mirror of the persisted adventure flag, used to tag envelopes
    /// when a repository read fails mid-message.
    active: bool,
    config: RoomConfig,
    receiver: mpsc::Receiver<RoomCommand>,
}

impl<R, N> RoomActor<R, N>
where
    R: Repository,
    N: Narrator,
{
    async fn run(mut self) {
        debug!(room = %self.room_id, "room actor started");
        while let Some(command) = self.receiver.recv().await {
            match command {
                RoomCommand::Subscribe { conn, sender, ack } => {
                    self.broadcaster.subscribe(conn, sender);
                    debug!(room = %self.room_id, conn = %conn, "subscribed");
                    let _ = ack.send(());
                }
                RoomCommand::Unsubscribe { conn } => {
                    if self.broadcaster.unsubscribe(conn) {
                        debug!(room = %self.room_id, conn = %conn, "unsubscribed");
                    }
                }
                RoomCommand::Inbound {
                    conn,
                    username,
                    text,
                } => {
                    self.handle_inbound(conn, username, text).await;
                }
                RoomCommand::Shutdown => break,
            }
        }
        // Last chance to persist whatever the threshold left behind.
        if !self.buffer.is_empty() {
            self.flush().await;
        }
        debug!(room = %self.room_id, "room actor stopped");
    }

    async fn handle_inbound(
        &mut self,
        conn: ConnectionId,
        username: String,
        text: String,
    ) {
        // Authoritative state first. Another path (an admin tool, a
        // different node) may have changed the room since the last
        // message.
        let room = match self.repo.room(self.room_id).await {
            Ok(room) => {
                self.active = room.adventure_active;
                Some(room)
            }
            Err(err) => {
                warn!(room = %self.room_id, error = %err,
                    "room lookup failed, treating message as plain chat");
                None
            }
        };

        let trigger = match &room {
            Some(_) => classify(&text),
            // No trustworthy state, no transitions.
            None => Trigger::Plain,
        };

        match (trigger, room) {
            (Trigger::Begin, Some(room)) if room.thread.is_none() => {
                self.begin_adventure(conn, &username, &text).await;
            }
            (Trigger::End, Some(room)) if room.thread.is_some() => {
                self.end_adventure(conn, &username, &text).await;
            }
            (Trigger::Reply(choice), Some(room)) => {
                match room.thread {
                    Some(thread) => {
                        self.story_reply(conn, &username, &text, &thread, choice)
                            .await;
                    }
                    // Bare numbers outside an adventure are just chat.
                    None => self.chat(conn, &username, &text),
                }
            }
            _ => self.chat(conn, &username, &text),
        }

        if self.buffer.ready() {
            self.flush().await;
        }
    }

    async fn begin_adventure(
        &mut self,
        conn: ConnectionId,
        username: &str,
        text: &str,
    ) {
        let thread = match self.call_narrator_begin().await {
            Ok(thread) => thread,
            Err(err) => {
                warn!(room = %self.room_id, error = %err, "could not begin adventure");
                self.chat(conn, username, text);
                self.system(fallback_message());
                return;
            }
        };

        // Persist the thread handle before announcing anything. The
        // store derives the active flag from it, so a crash between
        // the two writes still leaves the record consistent.
        if let Err(err) =
            self.repo.set_thread(self.room_id, Some(thread)).await
        {
            warn!(room = %self.room_id, error = %err,
                "failed to persist adventure thread");
            self.chat(conn, username, text);
            self.system(fallback_message());
            return;
        }
        if let Err(err) = self.repo.set_adventure(self.room_id, true).await {
            warn!(room = %self.room_id, error = %err,
                "failed to persist adventure flag");
        }

        self.active = true;
        info!(room = %self.room_id, "adventure started");
        self.chat(conn, username, text);
        self.system(options_message());
    }

    async fn end_adventure(
        &mut self,
        conn: ConnectionId,
        username: &str,
        text: &str,
    ) {
        if let Err(err) = self.repo.set_thread(self.room_id, None).await {
            warn!(room = %self.room_id, error = %err,
                "failed to clear adventure thread, staying active");
            self.chat(conn, username, text);
            return;
        }
        if let Err(err) = self.repo.set_adventure(self.room_id, false).await {
            warn!(room = %self.room_id, error = %err,
                "failed to persist adventure flag");
        }

        self.active = false;
        info!(room = %self.room_id, "adventure ended");
        self.chat(conn, username, text);
        self.system(end_message());
    }

    async fn story_reply(
        &mut self,
        conn: ConnectionId,
        username: &str,
        text: &str,
        thread: &ThreadId,
        choice: u8,
    ) {
        self.chat(conn, username, text);
        match self.call_narrator_continue(thread, choice).await {
            Ok(narrative) => self.system(narrative),
            Err(err) => {
                warn!(room = %self.room_id, error = %err, "narrator call failed");
                self.system(fallback_message());
            }
        }
    }

    async fn call_narrator_begin(&self) -> Result<ThreadId, NarratorError> {
        timeout(self.config.narrator_timeout, self.narrator.begin_story())
            .await
            .unwrap_or(Err(NarratorError::Timeout))
    }

    async fn call_narrator_continue(
        &self,
        thread: &ThreadId,
        choice: u8,
    ) -> Result<String, NarratorError> {
        timeout(
            self.config.narrator_timeout,
            self.narrator.continue_story(thread, choice),
        )
        .await
        .unwrap_or(Err(NarratorError::Timeout))
    }

    /// Buffers a user message and fans it out to everyone but the
    /// author, who already has it rendered locally.
    fn chat(&mut self, author: ConnectionId, username: &str, text: &str) {
        let envelope = ChatEnvelope {
            room_id: self.room_id,
            username: username.to_owned(),
            text: text.to_owned(),
            room_state: self.active,
        };
        self.buffer.push(Message {
            username: username.to_owned(),
            text: text.to_owned(),
            timestamp: now_millis(),
        });
        self.broadcaster.send_to_others(author, &envelope);
    }

    /// Buffers a storyteller message and fans it out to everyone,
    /// author included.
    fn system(&mut self, text: String) {
        let envelope = ChatEnvelope {
            room_id: self.room_id,
            username: SYSTEM_AUTHOR.to_owned(),
            text: text.clone(),
            room_state: self.active,
        };
        self.buffer.push(Message {
            username: SYSTEM_AUTHOR.to_owned(),
            text,
            timestamp: now_millis(),
        });
        self.broadcaster.send_to_all(&envelope);
    }

    /// Writes the buffered batch as one conversation page. On failure
    /// the buffer is kept intact so the next threshold crossing
    /// retries with the same messages plus the new ones.
    async fn flush(&mut self) {
        let batch = self.buffer.messages().to_vec();
        let count = batch.len();
        match self
            .repo
            .append_conversation(self.room_id, now_millis(), batch)
            .await
        {
            Ok(()) => {
                self.buffer.clear();
                debug!(room = %self.room_id, count, "flushed conversation page");
            }
            Err(err) => {
                warn!(room = %self.room_id, count, error = %err,
                    "flush failed, retaining buffer");
            }
        }
    }
}
