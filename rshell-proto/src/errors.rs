//! Error types for `rshell-proto`.

use std::fmt;

use rshell_crypto::CodecError;

/// Errors from the handshake, framing, or transport layer.
#[derive(Debug)]
pub enum ProtoError {
    /// A block failed to decode during the handshake. Almost certainly
    /// means the two sides derived different keys, i.e. different
    /// passwords.
    PasswordMismatch,
    /// The handshake decoded successfully but didn't start with
    /// [`crate::MAGIC_STRING`].
    BadMagicString,
    /// The peer echoed our own handshake string back verbatim — a naive
    /// echo reflector, or an attacker probing the protocol.
    SameHandshake,
    /// A decode failed outside of the handshake (fatal: the connection
    /// cannot be trusted past this point).
    Codec(CodecError),
    /// The underlying stream closed or errored.
    Io(std::io::Error),
}

impl fmt::Display for ProtoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PasswordMismatch => write!(f, "handshake password mismatch"),
            Self::BadMagicString => write!(f, "decryption worked, but got bad magic string"),
            Self::SameHandshake => write!(f, "received identical handshake; hack attempt"),
            Self::Codec(e) => write!(f, "codec error: {e}"),
            Self::Io(e) => write!(f, "io error: {e}"),
        }
    }
}

impl std::error::Error for ProtoError {}

impl From<std::io::Error> for ProtoError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<CodecError> for ProtoError {
    fn from(e: CodecError) -> Self {
        Self::Codec(e)
    }
}
