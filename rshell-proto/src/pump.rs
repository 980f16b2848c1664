//! Bridges an encrypted wire connection to a plain in-process duplex
//! stream.
//!
//! Everything above this module — the stream multiplexer, PTY/control
//! readers and writers — talks to the duplex's near end as an ordinary
//! `AsyncRead + AsyncWrite`. This task owns the far end plus the raw
//! connection and does nothing but shuttle bytes between them, framing
//! and encrypting in one direction and decrypting in the other.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, DuplexStream};

use crate::frame::{read_frame, write_frame};

/// Size of the in-process duplex buffer between the pump and its caller.
/// Generous enough that a burst of multiplexed frames doesn't stall on
/// backpressure before the raw socket does.
const DUPLEX_CAPACITY: usize = 256 * 1024;

/// Spawn the pump task and return the near end of the duplex it feeds.
///
/// `conn` is consumed: after this call, all reads and writes to the
/// underlying connection happen exclusively inside the spawned task.
pub fn spawn<S>(conn: S, key: [u8; 32]) -> DuplexStream
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (near, far) = tokio::io::duplex(DUPLEX_CAPACITY);
    tokio::spawn(run(conn, far, key));
    near
}

async fn run<S>(conn: S, duplex: DuplexStream, key: [u8; 32])
where
    S: AsyncRead + AsyncWrite + Unpin + Send + 'static,
{
    let (mut conn_read, mut conn_write) = tokio::io::split(conn);
    let (mut dup_read, mut dup_write) = tokio::io::split(duplex);

    let decrypt = async move {
        loop {
            let blob = match read_frame(&mut conn_read).await {
                Ok(Some(blob)) => blob,
                Ok(None) => return,
                Err(e) => {
                    log::debug!("pump: connection read failed: {e}");
                    return;
                }
            };
            let payload = match rshell_crypto::decode_block(&blob, &key) {
                Ok(p) => p,
                Err(e) => {
                    log::warn!("pump: dropping undecodable block: {e}");
                    return;
                }
            };
            if dup_write.write_all(&payload).await.is_err() {
                return;
            }
        }
    };

    let encrypt = async move {
        let mut buf = vec![0u8; 64 * 1024];
        loop {
            let n = match dup_read.read(&mut buf).await {
                Ok(0) => return,
                Ok(n) => n,
                Err(e) => {
                    log::debug!("pump: duplex read failed: {e}");
                    return;
                }
            };
            let blob = rshell_crypto::encode_block(&buf[..n], &key);
            if write_frame(&mut conn_write, &blob).await.is_err() {
                return;
            }
        }
    };

    tokio::join!(decrypt, encrypt);
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[tokio::test]
    async fn pumps_bytes_both_ways() {
        let key = [3u8; 32];
        let (conn_a, conn_b) = tokio::io::duplex(8192);

        let mut near_a = spawn(conn_a, key);
        let mut near_b = spawn(conn_b, key);

        near_a.write_all(b"ping").await.unwrap();
        let mut buf = [0u8; 4];
        near_b.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"ping");

        near_b.write_all(b"pong!").await.unwrap();
        let mut buf = [0u8; 5];
        near_a.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"pong!");
    }
}
