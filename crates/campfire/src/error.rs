//! Unified error type for the server crate.

use thiserror::Error;

/// Any error the server surface can produce, wrapping each layer's
/// error type.
#[derive(Debug, Error)]
pub enum CampfireError {
    #[error(transparent)]
    Transport(#[from] campfire_transport::TransportError),

    #[error(transparent)]
    Protocol(#[from] campfire_protocol::ProtocolError),

    #[error(transparent)]
    Session(#[from] campfire_session::SessionError),

    #[error(transparent)]
    Store(#[from] campfire_store::StoreError),

    #[error(transparent)]
    Room(#[from] campfire_room::RoomError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_session_error() {
        let err = campfire_session::SessionError::MissingCookie;
        let wrapped: CampfireError = err.into();
        assert!(matches!(wrapped, CampfireError::Session(_)));
    }

    #[test]
    fn test_from_room_error_keeps_message() {
        let err = campfire_room::RoomError::NotFound(
            campfire_protocol::RoomId(7),
        );
        let wrapped: CampfireError = err.into();
        assert!(wrapped.to_string().contains("room-7"));
    }

    #[test]
    fn test_from_store_error() {
        let err = campfire_store::StoreError::Unavailable("down".into());
        let wrapped: CampfireError = err.into();
        assert!(matches!(wrapped, CampfireError::Store(_)));
        assert!(wrapped.to_string().contains("down"));
    }
}
