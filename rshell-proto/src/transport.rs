//! Entry point that turns a raw connected stream into a byte stream
//! ready to be handed to a multiplexer.

use std::pin::Pin;
use std::task::{Context, Poll};

use tokio::io::{AsyncRead, AsyncWrite, DuplexStream, ReadBuf};

use crate::errors::ProtoError;
use crate::{handshake, pump, stub_enabled};

/// A connection ready for multiplexing: either the real encrypted path
/// (backed by the frame pump over a `tokio::io::duplex`) or the `STUB=1`
/// bypass (the raw stream, untouched).
///
/// Both variants implement `AsyncRead + AsyncWrite`, so callers — the
/// yamux session in `rshell-core` — never need to know which one they
/// got.
pub enum Transport<S> {
    Encrypted(DuplexStream),
    Stub(S),
}

impl<S: AsyncRead + Unpin> AsyncRead for Transport<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            Transport::Encrypted(d) => Pin::new(d).poll_read(cx, buf),
            Transport::Stub(s) => Pin::new(s).poll_read(cx, buf),
        }
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for Transport<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<std::io::Result<usize>> {
        match self.get_mut() {
            Transport::Encrypted(d) => Pin::new(d).poll_write(cx, buf),
            Transport::Stub(s) => Pin::new(s).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            Transport::Encrypted(d) => Pin::new(d).poll_flush(cx),
            Transport::Stub(s) => Pin::new(s).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        match self.get_mut() {
            Transport::Encrypted(d) => Pin::new(d).poll_shutdown(cx),
            Transport::Stub(s) => Pin::new(s).poll_shutdown(cx),
        }
    }
}

/// Perform (or skip, under `STUB=1`) the handshake and hand back a
/// `Transport` ready to be wrapped in a yamux session.
///
/// `password` is hashed into the AES key independently by both sides;
/// it is never sent over the wire.
pub async fn establish<S>(mut stream: S, password: &str) -> Result<Transport<S>, ProtoError>
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    if stub_enabled() {
        log::warn!("STUB=1: skipping handshake and encryption entirely");
        return Ok(Transport::Stub(stream));
    }

    let key = rshell_crypto::derive_key(password);
    handshake::perform(&mut stream, &key).await?;
    log::debug!("handshake complete");

    let near = pump::spawn(stream, key);
    Ok(Transport::Encrypted(near))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn matching_passwords_establish_and_pump() {
        let (a, b) = tokio::io::duplex(8192);
        let (ra, rb) = tokio::join!(establish(a, "hunter2"), establish(b, "hunter2"));
        let mut ta = ra.unwrap();
        let mut tb = rb.unwrap();

        ta.write_all(b"hi").await.unwrap();
        let mut buf = [0u8; 2];
        tb.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"hi");
    }

    #[tokio::test]
    async fn mismatched_passwords_fail_establish() {
        let (a, b) = tokio::io::duplex(8192);
        let (ra, rb) = tokio::join!(establish(a, "hunter2"), establish(b, "wrong"));
        assert!(ra.is_err());
        assert!(rb.is_err());
    }

    #[tokio::test]
    async fn stub_mode_bypasses_handshake() {
        std::env::set_var("STUB", "1");
        let (a, b) = tokio::io::duplex(8192);
        let (ra, rb) = tokio::join!(establish(a, "unused"), establish(b, "also-unused"));
        let mut ta = ra.unwrap();
        let mut tb = rb.unwrap();
        std::env::remove_var("STUB");

        ta.write_all(b"raw").await.unwrap();
        let mut buf = [0u8; 3];
        tb.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"raw");
    }
}
