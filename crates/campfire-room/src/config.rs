//! Room tuning knobs.

use std::time::Duration;

/// Configuration shared by every room actor a registry spawns.
#[derive(Debug, Clone)]
pub struct RoomConfig {
    /// Buffer size at which unsaved messages are flushed to the
    /// repository. A threshold of 1 persists after every message.
    pub flush_threshold: usize,
    /// Upper bound on a single narrator call. When exceeded the room
    /// falls back to a system notice instead of stalling its mailbox
    /// forever.
    pub narrator_timeout: Duration,
    /// Capacity of each actor's command mailbox.
    pub mailbox_capacity: usize,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            flush_threshold: 1,
            narrator_timeout: Duration::from_secs(30),
            mailbox_capacity: 64,
        }
    }
}

impl RoomConfig {
    pub fn flush_threshold(mut self, threshold: usize) -> Self {
        self.flush_threshold = threshold.max(1);
        self
    }

    pub fn narrator_timeout(mut self, timeout: Duration) -> Self {
        self.narrator_timeout = timeout;
        self
    }

    pub fn mailbox_capacity(mut self, capacity: usize) -> Self {
        self.mailbox_capacity = capacity.max(1);
        self
    }
}
