//! The conversation pager: pull-based backfill of older history.
//!
//! A viewing client opens a pager per room and calls [`pull`] whenever
//! the user scrolls to the top. Each pull fetches the newest page
//! strictly older than everything already loaded, so successive pulls
//! walk backwards through history without overlap or duplication.
//!
//! The concurrency story is deliberately small: pulls are user-triggered
//! and infrequent, so a three-state gate ([`PagerState`]) is the only
//! primitive needed. While a pull is in flight the pager is `Loading`
//! and further pulls are no-ops; once the repository reports no older
//! page the pager is `Exhausted` until the room is reopened with a
//! fresh pager.
//!
//! [`pull`]: ConversationPager::pull

use std::sync::Arc;

use campfire_protocol::RoomId;

use crate::{now_millis, Message, Repository, StoreError};

/// Where the pager is in its pull cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PagerState {
    /// No pull outstanding; more history may exist.
    Idle,
    /// A pull is in flight. Further pulls are no-ops.
    Loading,
    /// The repository reported no older page. Terminal until the room
    /// is reopened.
    Exhausted,
}

/// What one call to [`ConversationPager::pull`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullOutcome {
    /// A page arrived; this many messages were merged in.
    Loaded(usize),
    /// No older history exists.
    Exhausted,
    /// A pull was already outstanding; nothing was requested.
    Busy,
}

/// Incrementally backfills a room's history, newest page first.
pub struct ConversationPager<R: Repository> {
    repo: Arc<R>,
    room_id: RoomId,
    /// Timestamp of the oldest page loaded so far; the next pull asks
    /// for strictly older. Starts at "now" when the room is opened.
    oldest_loaded: u64,
    state: PagerState,
    /// Locally held messages in display (chronological) order.
    messages: Vec<Message>,
}

impl<R: Repository> ConversationPager<R> {
    /// Opens a pager for a freshly opened room, anchored at the current
    /// time.
    pub fn open(repo: Arc<R>, room_id: RoomId) -> Self {
        Self::open_at(repo, room_id, now_millis())
    }

    /// Opens a pager anchored at an explicit timestamp. Mostly for
    /// tests; production callers want [`open`](Self::open).
    pub fn open_at(repo: Arc<R>, room_id: RoomId, anchor: u64) -> Self {
        Self {
            repo,
            room_id,
            oldest_loaded: anchor,
            state: PagerState::Idle,
            messages: Vec::new(),
        }
    }

    /// Pulls the next-older page of history.
    ///
    /// No-op (returns [`PullOutcome::Busy`] / [`PullOutcome::Exhausted`])
    /// unless the pager is idle. On success the page's messages are
    /// merged into the head of the held sequence and the anchor moves
    /// to the page's timestamp, which is strictly smaller; the ranges
    /// of successive pages therefore never overlap.
    ///
    /// # Errors
    /// A transient repository failure is logged and returned; the pager
    /// goes back to `Idle` with its anchor unmoved, so the same pull
    /// can simply be retried.
    pub async fn pull(&mut self) -> Result<PullOutcome, StoreError> {
        match self.state {
            PagerState::Loading => return Ok(PullOutcome::Busy),
            PagerState::Exhausted => return Ok(PullOutcome::Exhausted),
            PagerState::Idle => {}
        }

        self.state = PagerState::Loading;
        let result = self
            .repo
            .conversation_before(self.room_id, self.oldest_loaded)
            .await;

        match result {
            Ok(Some(page)) => {
                let count = page.messages.len();
                self.merge_older(page.messages);
                self.oldest_loaded = page.timestamp;
                self.state = PagerState::Idle;
                tracing::debug!(
                    room_id = %self.room_id,
                    anchor = self.oldest_loaded,
                    count,
                    "history page loaded"
                );
                Ok(PullOutcome::Loaded(count))
            }
            Ok(None) => {
                self.state = PagerState::Exhausted;
                Ok(PullOutcome::Exhausted)
            }
            Err(e) => {
                tracing::warn!(
                    room_id = %self.room_id,
                    error = %e,
                    "history pull failed, will retry on next pull"
                );
                self.state = PagerState::Idle;
                Err(e)
            }
        }
    }

    /// Merges an older page into the head of the held sequence.
    ///
    /// The sort is stable and keyed by timestamp only, so messages with
    /// equal timestamps keep their original relative order.
    fn merge_older(&mut self, older: Vec<Message>) {
        let mut merged = older;
        merged.append(&mut self.messages);
        merged.sort_by_key(|m| m.timestamp);
        self.messages = merged;
    }

    /// The locally held messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// The current anchor: the next pull requests strictly older than
    /// this.
    pub fn oldest_loaded(&self) -> u64 {
        self.oldest_loaded
    }

    /// Current gate state.
    pub fn state(&self) -> PagerState {
        self.state
    }

    /// Returns `true` if a call to [`pull`](Self::pull) would actually
    /// issue a request.
    pub fn can_pull(&self) -> bool {
        self.state == PagerState::Idle
    }
}
