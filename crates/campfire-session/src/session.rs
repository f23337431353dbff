//! Session types: the record behind one issued login token.

use std::time::{Duration, Instant};

/// Configuration for session behavior.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// How long a freshly created session stays valid.
    ///
    /// Default: 600 seconds, matching the cookie max-age the login
    /// endpoint sends alongside the token.
    pub ttl: Duration,

    /// How often the background sweeper scans for expired sessions.
    ///
    /// Expiry is also checked defensively on every validate, so this
    /// only bounds how long a dead session occupies memory.
    pub sweep_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(600),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

/// One established login, keyed in the store by its opaque token.
///
/// `Instant` (monotonic) rather than wall-clock time: expiry decisions
/// must not jump when the system clock is adjusted.
#[derive(Debug, Clone)]
pub struct Session {
    /// The identity this token resolves to. A token resolves to at
    /// most one identity for its whole lifetime.
    pub identity: String,

    /// When the session was created.
    pub created_at: Instant,

    /// The session never validates at or past this instant.
    pub expires_at: Instant,
}

impl Session {
    /// Returns `true` if the session is past its expiry.
    pub fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_config_default() {
        let config = SessionConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(600));
        assert_eq!(config.sweep_interval, Duration::from_secs(60));
    }

    #[test]
    fn test_session_is_expired_boundary() {
        let now = Instant::now();
        let session = Session {
            identity: "alice".into(),
            created_at: now,
            expires_at: now,
        };
        // Expiry is inclusive: at expires_at the session is dead.
        assert!(session.is_expired(now));
    }
}
