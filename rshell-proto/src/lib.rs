//! Frame codec, encrypted connection and handshake for the reverse shell
//! wire protocol.
//!
//! This crate handles:
//! * Length-prefixed block framing (`frame`)
//! * The handshake that confirms both sides hold the same password-derived
//!   key (`handshake`)
//! * A transport type usable directly by a stream multiplexer
//!   (`transport`), including the `STUB=1` bypass for integration testing
//! * The resize-record wire format carried on the control stream
//!   (`resize`)
//!
//! It is intentionally transport-agnostic above TCP: `transport::establish`
//! takes anything that implements tokio's `AsyncRead + AsyncWrite`.

#![deny(unsafe_code)]

mod errors;
mod frame;
mod handshake;
mod pump;
pub mod resize;
pub mod transport;

pub use errors::ProtoError;
pub use resize::ResizeRecord;
pub use transport::{Transport, establish};

/// The cleartext marker sent (then re-sent back, garbled) during the
/// handshake. Functions purely as a post-decryption sanity check; it is
/// not a capability token and is not kept secret.
pub const MAGIC_STRING: &str = "hello world";

/// Number of random alphanumeric bytes appended to [`MAGIC_STRING`] to
/// build one handshake string.
pub const NONCE_LEN: usize = 32;

/// Returns `true` when the `STUB` environment variable is set to `1`.
///
/// Selects a bypass mode where the "encrypted connection" is replaced by a
/// plain pass-through: no framing, no encryption, no handshake. This
/// exists solely for integration tests and must never be set in
/// production; both sides of a connection must agree on it, since a stub
/// peer cannot understand a real peer's frames or vice versa.
pub fn stub_enabled() -> bool {
    std::env::var("STUB").ok().as_deref() == Some("1")
}
