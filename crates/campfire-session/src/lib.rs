//! Session management for Campfire.
//!
//! This crate handles everything between "a user logged in" and "a
//! WebSocket is allowed to speak":
//!
//! 1. **Session tracking** — the token → identity map with TTL expiry
//!    ([`SessionStore`])
//! 2. **Expiry sweeping** — a background task that removes dead
//!    sessions, decoupled from request handling ([`spawn_sweeper`])
//! 3. **Admission** — validating the session cookie on a WebSocket
//!    upgrade before any frame is accepted ([`gate`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Connection handler (above)  ← calls gate::admit() once per upgrade
//!     ↕
//! Session layer (this crate)  ← owns token → identity with expiry
//!     ↕
//! Auth collaborator (outside) ← calls SessionStore::create() on login
//! ```
//!
//! The store never sees passwords. Whoever verifies credentials (the
//! login endpoint, outside this system) calls [`SessionStore::create`]
//! and sets the resulting token as the `campfire-session` cookie.

pub mod gate;

mod error;
mod session;
mod store;

pub use error::SessionError;
pub use session::{Session, SessionConfig};
pub use store::{spawn_sweeper, SessionStore};
