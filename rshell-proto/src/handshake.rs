//! The post-connect handshake.
//!
//! Both sides send `MAGIC_STRING ‖ 32 random alphanumeric bytes` as a
//! single encrypted block, then read back whatever the peer sent. If
//! decryption fails, the passwords differ. If the decrypted string
//! doesn't start with `MAGIC_STRING`, something other than this protocol
//! is on the other end. If it's byte-for-byte identical to what we sent,
//! we're talking to an echo reflector, not a peer — reject it rather than
//! proceed into a pump loop with ourselves.

use rand::Rng;
use tokio::io::{AsyncRead, AsyncWrite};

use crate::errors::ProtoError;
use crate::frame::{read_frame, write_frame};
use crate::{MAGIC_STRING, NONCE_LEN};

fn random_handshake_string() -> String {
    let nonce: String = rand::thread_rng()
        .sample_iter(rand::distributions::Alphanumeric)
        .take(NONCE_LEN)
        .map(char::from)
        .collect();
    format!("{MAGIC_STRING}{nonce}")
}

/// Perform the handshake over an already-connected stream.
///
/// On success, the caller may proceed to spawn the frame pump; on
/// failure, the connection must be dropped without a retry, since a
/// wrong key will never succeed on a later attempt over the same
/// connection.
pub async fn perform<S: AsyncRead + AsyncWrite + Unpin>(
    stream: &mut S,
    key: &[u8; 32],
) -> Result<(), ProtoError> {
    let ours = random_handshake_string();
    let ours_block = rshell_crypto::encode_block(ours.as_bytes(), key);
    write_frame(stream, &ours_block).await?;

    let theirs_block = read_frame(stream)
        .await?
        .ok_or(ProtoError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "connection closed during handshake",
        )))?;
    let theirs = rshell_crypto::decode_block(&theirs_block, key)
        .map_err(|_| ProtoError::PasswordMismatch)?;

    if !theirs.starts_with(MAGIC_STRING.as_bytes()) {
        return Err(ProtoError::BadMagicString);
    }
    if theirs == ours.as_bytes() {
        return Err(ProtoError::SameHandshake);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn matching_keys_succeed() {
        let key = rshell_crypto::derive_key("shared-secret");
        let (mut a, mut b) = tokio::io::duplex(4096);
        let (ra, rb) = tokio::join!(perform(&mut a, &key), perform(&mut b, &key));
        ra.unwrap();
        rb.unwrap();
    }

    #[tokio::test]
    async fn mismatched_keys_fail() {
        let key_a = rshell_crypto::derive_key("one");
        let key_b = rshell_crypto::derive_key("two");
        let (mut a, mut b) = tokio::io::duplex(4096);
        let (ra, rb) = tokio::join!(perform(&mut a, &key_a), perform(&mut b, &key_b));
        assert!(ra.is_err());
        assert!(rb.is_err());
    }

    #[tokio::test]
    async fn echoed_handshake_is_rejected() {
        let key = rshell_crypto::derive_key("shared-secret");
        let (mut a, mut echo_side) = tokio::io::duplex(4096);

        let echo = tokio::spawn(async move {
            let frame = read_frame(&mut echo_side).await.unwrap().unwrap();
            write_frame(&mut echo_side, &frame).await.unwrap();
        });

        let result = perform(&mut a, &key).await;
        echo.await.unwrap();
        assert!(matches!(result, Err(ProtoError::SameHandshake)));
    }
}
