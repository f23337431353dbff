//! Storage abstraction for Campfire.
//!
//! The persistent store is an external collaborator: the core never
//! talks to a database directly, only to the [`Repository`] trait. Every
//! call may fail with a transient [`StoreError`], and callers are
//! written to survive that (retained buffers, demoted transitions,
//! retryable pulls).
//!
//! # Key pieces
//!
//! - [`Repository`] — the abstract room/conversation/user store
//! - [`Room`], [`Message`], [`ConversationPage`], [`User`] — the
//!   persisted domain types
//! - [`MemoryStore`] — in-process reference implementation, used by the
//!   demo and the test suites
//! - [`ConversationPager`] — the client-side pull protocol that
//!   backfills older history page by page

#![allow(async_fn_in_trait)]

mod error;
mod memory;
mod pager;
mod repo;
mod types;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use pager::{ConversationPager, PagerState, PullOutcome};
pub use repo::Repository;
pub use types::{now_millis, ConversationPage, Message, Room, ThreadId, User};
