//! Session coordination for the reverse shell: turns an established
//! [`rshell_proto::Transport`] into a yamux multiplexer, tags its two
//! logical streams, and exposes the cancellation and state-machine
//! plumbing shared by both the shell and listener binaries.
//!
//! Re-exports [`rshell_crypto`] and [`rshell_proto`] so downstream
//! binaries depend on a single crate for the whole stack, the way
//! `layer` did for its MTProto sub-crates.

#![deny(unsafe_code)]

mod cancel;
mod session;
mod state;
mod stream_kind;

pub use cancel::CancelToken;
pub use session::{ClientSession, ServerSession};
pub use state::{ConnectionEvent, ConnectionState, SessionError, SessionEvent, SessionState};
pub use stream_kind::StreamKind;

/// Re-export of [`rshell_crypto`] — KDF and block codec.
pub use rshell_crypto as crypto;

/// Re-export of [`rshell_proto`] — framing, handshake, transport, resize
/// records.
pub use rshell_proto as proto;
