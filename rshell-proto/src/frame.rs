//! Outer length-prefixed framing.
//!
//! Every block produced by `rshell_crypto::encode_block` is itself
//! prefixed with a little-endian `u64` byte count before it hits the
//! wire, so the reading side knows exactly how many bytes to buffer
//! before handing them to the block decoder.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Write `payload` prefixed with its length as a little-endian `u64`.
pub async fn write_frame<W: AsyncWrite + Unpin>(
    writer: &mut W,
    payload: &[u8],
) -> std::io::Result<()> {
    writer.write_all(&(payload.len() as u64).to_le_bytes()).await?;
    writer.write_all(payload).await?;
    writer.flush().await
}

/// Read one length-prefixed frame, returning `Ok(None)` on a clean EOF
/// before any bytes of the length prefix arrive (i.e. the peer closed the
/// connection between frames, not mid-frame).
pub async fn read_frame<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> std::io::Result<Option<Vec<u8>>> {
    let mut len_bytes = [0u8; 8];
    match reader.read_exact(&mut len_bytes).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e),
    }
    let len = u64::from_le_bytes(len_bytes) as usize;
    let mut payload = vec![0u8; len];
    reader.read_exact(&mut payload).await?;
    Ok(Some(payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trip() {
        let (mut a, mut b) = tokio::io::duplex(4096);
        write_frame(&mut a, b"hello").await.unwrap();
        let got = read_frame(&mut b).await.unwrap().unwrap();
        assert_eq!(got, b"hello");
    }

    #[tokio::test]
    async fn empty_payload_round_trips() {
        let (mut a, mut b) = tokio::io::duplex(4096);
        write_frame(&mut a, b"").await.unwrap();
        let got = read_frame(&mut b).await.unwrap().unwrap();
        assert!(got.is_empty());
    }

    #[tokio::test]
    async fn clean_close_yields_none() {
        let (a, mut b) = tokio::io::duplex(4096);
        drop(a);
        let got = read_frame(&mut b).await.unwrap();
        assert!(got.is_none());
    }
}
