//! Cryptographic primitives for the reverse shell wire protocol.
//!
//! Provides:
//! - PBKDF2-HMAC-SHA256 password-to-key derivation
//! - AES-256-CBC block encode/decode with a random IV and random padding
//!   per block
//!
//! There is no MAC here. Tamper detection relies entirely on the
//! handshake magic string one layer up (`rshell-proto`); see that crate's
//! docs for the threat model this implies.

#![deny(unsafe_code)]

mod codec;
mod kdf;

pub use codec::{CodecError, decode_block, encode_block};
pub use kdf::derive_key;

/// Fixed salt used for the password KDF. Same value on both sides of the
/// connection; there is no per-connection salt exchange.
pub const KDF_SALT: &[u8] = b"d76cd86b-4237-4ef2-befd-0384a64d47c7";

/// Iteration count for the password KDF. Deliberately low; raising it
/// would break wire compatibility with the protocol this was modeled on,
/// so it is left as-is. See `DESIGN.md`.
pub const KDF_ITERATIONS: u32 = 100;

/// Output key length in bytes (selects AES-256 for the block cipher).
pub const KEY_LEN: usize = 32;
