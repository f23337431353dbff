//! Error types for the session layer.

/// Errors that can occur during session management and admission.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The connection presented no `Cookie` header, or the header has
    /// no session cookie in it. Hard rejection at handshake time.
    #[error("no session cookie presented")]
    MissingCookie,

    /// The presented token is unknown to the store or already expired.
    #[error("session token is invalid or expired")]
    InvalidToken,

    /// The store could not allocate a unique token after retrying.
    /// With 128-bit tokens this means the RNG is broken; the failure is
    /// fatal to this one create operation and surfaced to the caller.
    #[error("could not allocate a unique session token")]
    TokenCollision,
}
