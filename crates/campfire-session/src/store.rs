//! The session store: a concurrency-safe token → identity map with expiry.
//!
//! Every connection task validates against the same store, and the
//! sweeper deletes from it concurrently, so the map sits behind an
//! interior mutex. The critical sections are a single hash-map
//! operation each; nothing async happens while the lock is held. From
//! any observer's viewpoint a session either is or is not present,
//! atomically: a validate racing a sweep sees one or the other, never a
//! half-removed entry.
//!
//! Expiry is enforced twice. The sweeper deletes autonomously on an
//! interval, and [`SessionStore::validate`] re-checks the deadline at
//! read time, since a token can expire between two sweeps.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use rand::Rng;

use crate::{Session, SessionError};

/// How many times `create` regenerates on a token collision before
/// giving up. A collision needs two identical 128-bit draws, so more
/// than one retry is already paranoia.
const MAX_TOKEN_ATTEMPTS: u32 = 4;

/// Tracks every live session, keyed by its opaque token.
///
/// Shared as `Arc<SessionStore>` between the accept loop, every
/// connection task, and the sweeper.
pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    /// Creates a new, empty session store.
    pub fn new() -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Creates a session for `identity` and returns its token.
    ///
    /// The token is 32 lowercase hex characters (128 bits of entropy),
    /// unguessable for any practical purpose. The contract still
    /// requires a collision check: if the freshly generated token is
    /// somehow already present, it is regenerated.
    ///
    /// # Errors
    /// Returns [`SessionError::TokenCollision`] if a unique token could
    /// not be produced after [`MAX_TOKEN_ATTEMPTS`] draws. That points
    /// at a broken RNG, and the failure is surfaced to the caller
    /// instead of handing out a colliding credential.
    pub fn create(
        &self,
        identity: &str,
        ttl: Duration,
    ) -> Result<String, SessionError> {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().expect("session lock");

        for _ in 0..MAX_TOKEN_ATTEMPTS {
            let token = generate_token();
            if sessions.contains_key(&token) {
                tracing::warn!("session token collision, regenerating");
                continue;
            }

            sessions.insert(
                token.clone(),
                Session {
                    identity: identity.to_owned(),
                    created_at: now,
                    expires_at: now + ttl,
                },
            );
            tracing::info!(identity, "session created");
            return Ok(token);
        }

        Err(SessionError::TokenCollision)
    }

    /// Resolves a token to its identity.
    ///
    /// Returns `None` if the token is absent **or** already past its
    /// expiry at check time; an expired entry found here is deleted
    /// eagerly rather than left for the sweeper.
    pub fn validate(&self, token: &str) -> Option<String> {
        let mut sessions = self.sessions.lock().expect("session lock");
        let session = sessions.get(token)?;

        if session.is_expired(Instant::now()) {
            sessions.remove(token);
            return None;
        }

        Some(session.identity.clone())
    }

    /// Deletes a session eagerly (logout).
    ///
    /// Idempotent: invalidating an absent token is a no-op.
    pub fn invalidate(&self, token: &str) {
        let removed = self
            .sessions
            .lock()
            .expect("session lock")
            .remove(token)
            .is_some();
        if removed {
            tracing::info!("session invalidated");
        }
    }

    /// Removes every expired session. Returns how many were removed.
    ///
    /// Called by the sweeper task; safe to call from anywhere.
    pub fn sweep(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().expect("session lock");
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(now));
        let removed = before - sessions.len();
        if removed > 0 {
            tracing::debug!(removed, "swept expired sessions");
        }
        removed
    }

    /// Returns the number of sessions currently held (expired entries
    /// not yet swept included).
    pub fn len(&self) -> usize {
        self.sessions.lock().expect("session lock").len()
    }

    /// Returns `true` if there are no sessions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Spawns the background expiry sweeper for a shared store.
///
/// Runs until the returned handle is aborted (the server never stops it
/// explicitly; it dies with the process). Sweeping is deliberately
/// independent of request handling: a burst of logins or a quiet night
/// both get the same cleanup cadence.
pub fn spawn_sweeper(
    store: Arc<SessionStore>,
    interval: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // The first tick fires immediately; skip it so a fresh server
        // doesn't log a pointless sweep.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            store.sweep();
        }
    })
}

/// Generates a random 32-character hex string (128 bits of entropy).
fn generate_token() -> String {
    let mut rng = rand::rng();
    let bytes: [u8; 16] = rng.random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
