//! Wire protocol for Campfire.
//!
//! This crate defines the "language" that chat clients and the server
//! speak:
//!
//! - **Types** ([`ChatEnvelope`], [`RoomId`]) — the message structures
//!   that travel on the wire.
//! - **Sanitization** ([`sanitize`]) — HTML-escaping applied to
//!   client-supplied text at the trust boundary.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — how envelopes are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]) — what can go wrong during
//!   encoding/decoding.
//!
//! The protocol layer sits between transport (raw frames) and session
//! (identity). It doesn't know about connections, rooms, or storage —
//! it only knows the shape of the data.

mod codec;
mod error;
mod sanitize;
mod types;

pub use codec::Codec;
#[cfg(feature = "json")]
pub use codec::JsonCodec;
pub use error::ProtocolError;
pub use sanitize::sanitize;
pub use types::{ChatEnvelope, RoomId};
