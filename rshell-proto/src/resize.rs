//! Wire format for PTY resize notifications carried on the control
//! stream.
//!
//! Each record is a `u16`-le length prefix followed by a JSON object.
//! `u16` rather than the `u64` used for the main frame is a deliberate
//! asymmetry carried over from the protocol this was modeled on: resize
//! records are always tiny and bounding the prefix keeps a corrupted
//! control stream from trying to allocate gigabytes.

use serde::{Deserialize, Serialize};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// A terminal size, in character cells (`rows`/`cols`) and pixels
/// (`x`/`y`). Most terminals leave `x`/`y` at zero; they're carried
/// because the PTY ioctl this was modeled on has them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResizeRecord {
    pub rows: u16,
    pub cols: u16,
    #[serde(rename = "x")]
    pub x_pixels: u16,
    #[serde(rename = "y")]
    pub y_pixels: u16,
}

/// Errors specific to the resize-record codec.
#[derive(Debug)]
pub enum ResizeError {
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for ResizeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(e) => write!(f, "io error: {e}"),
            Self::Json(e) => write!(f, "malformed resize record: {e}"),
        }
    }
}
impl std::error::Error for ResizeError {}

impl From<std::io::Error> for ResizeError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}
impl From<serde_json::Error> for ResizeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Write one resize record as `u16 le length ‖ json`.
pub async fn write_resize<W: AsyncWrite + Unpin>(
    writer: &mut W,
    record: ResizeRecord,
) -> Result<(), ResizeError> {
    let json = serde_json::to_vec(&record)?;
    writer.write_all(&(json.len() as u16).to_le_bytes()).await?;
    writer.write_all(&json).await?;
    writer.flush().await?;
    Ok(())
}

/// Read one resize record, or `Ok(None)` on a clean EOF between records.
pub async fn read_resize<R: AsyncRead + Unpin>(
    reader: &mut R,
) -> Result<Option<ResizeRecord>, ResizeError> {
    let mut len_bytes = [0u8; 2];
    match reader.read_exact(&mut len_bytes).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(None),
        Err(e) => return Err(e.into()),
    }
    let len = u16::from_le_bytes(len_bytes) as usize;
    let mut json = vec![0u8; len];
    reader.read_exact(&mut json).await?;
    Ok(Some(serde_json::from_slice(&json)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn round_trip() {
        let record = ResizeRecord { rows: 24, cols: 80, x_pixels: 0, y_pixels: 0 };
        let (mut a, mut b) = tokio::io::duplex(4096);
        write_resize(&mut a, record).await.unwrap();
        let got = read_resize(&mut b).await.unwrap().unwrap();
        assert_eq!(got, record);
    }

    #[test]
    fn field_names_match_wire_format() {
        let record = ResizeRecord { rows: 1, cols: 2, x_pixels: 3, y_pixels: 4 };
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"rows\":1"));
        assert!(json.contains("\"cols\":2"));
        assert!(json.contains("\"x\":3"));
        assert!(json.contains("\"y\":4"));
    }
}
