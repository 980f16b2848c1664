//! Single-block AES-256-CBC encode/decode.
//!
//! "Block" here means one wire unit: a fresh random IV followed by CBC
//! ciphertext whose plaintext is `len(payload) as u64 le ‖ payload ‖
//! random padding`. Padding brings the plaintext to a 16-byte multiple;
//! when `8 + payload.len()` is already 16-aligned, no padding is added —
//! callers on both ends must agree on this exactly, since the decoder
//! trusts the embedded length rather than inspecting padding.

use aes::Aes256;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::NoPadding};
use rand::RngCore;

type Encryptor = cbc::Encryptor<Aes256>;
type Decryptor = cbc::Decryptor<Aes256>;

const IV_LEN: usize = 16;
const BLOCK_LEN: usize = 16;

/// Errors from [`decode_block`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodecError {
    /// The embedded payload length claims more bytes than the decrypted
    /// plaintext actually carries. Almost always means the wrong key was
    /// used to decrypt this block.
    DecodeUnderrun,
}

impl std::fmt::Display for CodecError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DecodeUnderrun => write!(f, "decode underrun"),
        }
    }
}
impl std::error::Error for CodecError {}

/// Encode `payload` into `IV ‖ ciphertext` under `key`.
///
/// Panics if `payload.len()` doesn't fit in a `u64` length prefix
/// alongside the block-alignment padding — i.e. never, on any platform
/// this runs on.
pub fn encode_block(payload: &[u8], key: &[u8; 32]) -> Vec<u8> {
    let mut plaintext = Vec::with_capacity(8 + payload.len() + BLOCK_LEN);
    plaintext.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    plaintext.extend_from_slice(payload);

    let rem = plaintext.len() % BLOCK_LEN;
    if rem != 0 {
        let pad_len = BLOCK_LEN - rem;
        let mut pad = vec![0u8; pad_len];
        rand::thread_rng().fill_bytes(&mut pad);
        plaintext.extend_from_slice(&pad);
    }

    let mut iv = [0u8; IV_LEN];
    rand::thread_rng().fill_bytes(&mut iv);

    let msg_len = plaintext.len();
    plaintext.resize(msg_len, 0);
    let ciphertext = Encryptor::new(key.into(), &iv.into())
        .encrypt_padded_mut::<NoPadding>(&mut plaintext, msg_len)
        .expect("plaintext is always block-aligned by construction")
        .to_vec();

    let mut out = Vec::with_capacity(IV_LEN + ciphertext.len());
    out.extend_from_slice(&iv);
    out.extend_from_slice(&ciphertext);
    out
}

/// Decode `blob` (`IV ‖ ciphertext`, as produced by [`encode_block`]) under
/// `key`, returning the original payload.
///
/// `blob` must be at least 16 bytes and the ciphertext portion must be a
/// multiple of 16 bytes; these are caller/transport invariants enforced by
/// the outer framing in `rshell-proto`, not attacker-controlled, so
/// violations panic rather than return an error.
pub fn decode_block(blob: &[u8], key: &[u8; 32]) -> Result<Vec<u8>, CodecError> {
    assert!(blob.len() >= IV_LEN, "block shorter than one IV");
    let (iv, ciphertext) = blob.split_at(IV_LEN);
    assert_eq!(ciphertext.len() % BLOCK_LEN, 0, "ciphertext not block-aligned");

    let mut buf = ciphertext.to_vec();
    let plaintext = Decryptor::new(key.into(), iv.into())
        .decrypt_padded_mut::<NoPadding>(&mut buf)
        .expect("NoPadding never rejects a block-aligned buffer");

    if plaintext.len() < 8 {
        return Err(CodecError::DecodeUnderrun);
    }
    let mut len_bytes = [0u8; 8];
    len_bytes.copy_from_slice(&plaintext[..8]);
    let payload_len = u64::from_le_bytes(len_bytes) as usize;

    if payload_len + 8 > plaintext.len() {
        return Err(CodecError::DecodeUnderrun);
    }
    Ok(plaintext[8..8 + payload_len].to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn arbitrary_key() -> impl Strategy<Value = [u8; 32]> {
        proptest::array::uniform32(any::<u8>())
    }

    proptest! {
        #[test]
        fn round_trip(payload in prop::collection::vec(any::<u8>(), 1..65536), key in arbitrary_key()) {
            let blob = encode_block(&payload, &key);
            let decoded = decode_block(&blob, &key).expect("should decode");
            prop_assert_eq!(decoded, payload);
        }

        #[test]
        fn wrong_key_fails_or_differs(
            payload in prop::collection::vec(any::<u8>(), 1..4096),
            key_a in arbitrary_key(),
            key_b in arbitrary_key(),
        ) {
            prop_assume!(key_a != key_b);
            let blob = encode_block(&payload, &key_a);
            match decode_block(&blob, &key_b) {
                Err(CodecError::DecodeUnderrun) => {}
                Ok(decoded) => prop_assert_ne!(decoded, payload),
            }
        }
    }

    #[test]
    fn ivs_do_not_repeat() {
        let key = [7u8; 32];
        let mut seen = std::collections::HashSet::new();
        for _ in 0..10_000 {
            let blob = encode_block(b"same payload", &key);
            let iv = blob[..IV_LEN].to_vec();
            assert!(seen.insert(iv), "IV repeated within 10,000 encodings");
        }
    }

    #[test]
    fn no_padding_when_already_aligned() {
        // 8 (length prefix) + payload must hit exactly a multiple of 16
        // for zero padding to be added.
        let payload = vec![0xAAu8; 8];
        let key = [1u8; 32];
        let blob = encode_block(&payload, &key);
        // IV (16) + one ciphertext block (16) = 32, no extra block for padding.
        assert_eq!(blob.len(), 32);
    }
}
