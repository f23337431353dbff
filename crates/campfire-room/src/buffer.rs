//! The room's unsaved-message buffer.

use campfire_store::Message;

/// Messages accumulated since the last successful flush.
///
/// The buffer never discards on failure: the actor persists a snapshot
/// and calls [`clear`](Self::clear) only once the repository confirms
/// the write, so a failed flush simply retries with more messages at
/// the next threshold crossing.
#[derive(Debug)]
pub struct MessageBuffer {
    messages: Vec<Message>,
    threshold: usize,
}

impl MessageBuffer {
    pub fn new(threshold: usize) -> Self {
        Self {
            messages: Vec::new(),
            threshold: threshold.max(1),
        }
    }

    pub fn push(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// True once the buffer holds at least the flush threshold.
    pub fn ready(&self) -> bool {
        self.messages.len() >= self.threshold
    }

    /// Current contents, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Drops everything. Call only after the repository has accepted
    /// the batch.
    pub fn clear(&mut self) {
        self.messages.clear();
    }
}
