//! The connection gate: admission control for real-time connections.
//!
//! Runs exactly once per WebSocket upgrade, before any frame is read.
//! The gate extracts the session token from the connection's `Cookie`
//! header and resolves it against the [`SessionStore`]. A rejection
//! closes the connection with no state mutated anywhere else; an
//! admission binds the connection to the resolved identity for its
//! entire lifetime. Later frames are *not* re-validated: the identity
//! captured here is the one stamped on every authored message, never a
//! value taken from a client payload.

use crate::{SessionError, SessionStore};

/// Name of the cookie carrying the session token.
pub const SESSION_COOKIE: &str = "campfire-session";

/// Validates a connection's cookie header and returns the identity it
/// is bound to.
///
/// # Errors
/// - [`SessionError::MissingCookie`] — no header, or no
///   `campfire-session` cookie in it
/// - [`SessionError::InvalidToken`] — the token is unknown or expired
pub fn admit(
    store: &SessionStore,
    cookie_header: Option<&str>,
) -> Result<String, SessionError> {
    let header = cookie_header.ok_or(SessionError::MissingCookie)?;
    let token =
        session_token(header).ok_or(SessionError::MissingCookie)?;

    store
        .validate(token)
        .ok_or(SessionError::InvalidToken)
}

/// Extracts the session token from a raw `Cookie` header.
///
/// Cookie headers are `;`-separated `name=value` pairs with optional
/// whitespace. Returns the value of the `campfire-session` pair, or
/// `None` if it isn't present.
fn session_token(header: &str) -> Option<&str> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then_some(value)
    })
}
