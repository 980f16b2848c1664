//! Password-to-key derivation.

use crate::{KDF_ITERATIONS, KDF_SALT, KEY_LEN};

/// Derive the 32-byte AES key from a pre-shared password.
///
/// Both sides of a connection call this independently with the same
/// password; a mismatched password produces a different key and only
/// surfaces as a handshake failure one layer up, never here.
pub fn derive_key(password: &str) -> [u8; KEY_LEN] {
    let mut key = [0u8; KEY_LEN];
    pbkdf2::pbkdf2_hmac::<sha2::Sha256>(password.as_bytes(), KDF_SALT, KDF_ITERATIONS, &mut key);
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_password_derives_same_key() {
        assert_eq!(derive_key("hunter2"), derive_key("hunter2"));
    }

    #[test]
    fn different_passwords_derive_different_keys() {
        assert_ne!(derive_key("hunter2"), derive_key("wrong"));
    }
}
