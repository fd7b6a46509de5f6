//! Text-safe encryption of secret values.
//!
//! `Cipher` seals a UTF-8 string under the master key and hex-encodes the
//! `nonce || ciphertext || tag` buffer so it fits in a TEXT column.
//! No associated data is bound; the record identity lives next to the
//! ciphertext in the store.

use std::sync::Arc;

use zeroize::Zeroize;

use super::encryption::{open, seal};
use super::master_key::MasterKey;
use crate::errors::{Result, TokenVaultError};

/// Authenticated cipher keyed by the installation's master key.
#[derive(Debug, Clone)]
pub struct Cipher {
    key: Arc<MasterKey>,
}

impl Cipher {
    /// Build a cipher around an already-resolved master key.
    pub fn new(key: Arc<MasterKey>) -> Self {
        Self { key }
    }

    /// Encrypt `plaintext` and return its hex encoding.
    pub fn encrypt(&self, plaintext: &str) -> Result<String> {
        let sealed = seal(self.key.as_bytes(), plaintext.as_bytes())?;
        Ok(hex::encode(sealed))
    }

    /// Decrypt a value produced by `encrypt`.
    ///
    /// Bad hex, truncated input, a wrong key, tampering and non-UTF-8
    /// output all surface as `DecryptionFailed`.
    pub fn decrypt(&self, encoded: &str) -> Result<String> {
        let data = hex::decode(encoded).map_err(|_| TokenVaultError::DecryptionFailed)?;
        let plaintext = open(self.key.as_bytes(), &data)?;

        String::from_utf8(plaintext).map_err(|e| {
            let mut bad_bytes = e.into_bytes();
            bad_bytes.zeroize();
            TokenVaultError::DecryptionFailed
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cipher(byte: u8) -> Cipher {
        Cipher::new(Arc::new(MasterKey::new([byte; 32])))
    }

    #[test]
    fn output_is_lowercase_hex() {
        let encoded = cipher(1).encrypt("token").unwrap();
        assert!(encoded
            .chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c)));
    }

    #[test]
    fn invalid_hex_is_a_decryption_failure() {
        let result = cipher(1).decrypt("zz-not-hex");
        assert!(matches!(result, Err(TokenVaultError::DecryptionFailed)));
    }

    #[test]
    fn empty_string_roundtrips() {
        let c = cipher(3);
        let encoded = c.encrypt("").unwrap();
        assert_eq!(c.decrypt(&encoded).unwrap(), "");
    }

    #[test]
    fn cloned_cipher_shares_key() {
        let c = cipher(5);
        let encoded = c.encrypt("shared").unwrap();
        assert_eq!(c.clone().decrypt(&encoded).unwrap(), "shared");
    }
}
