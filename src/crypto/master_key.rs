//! Master key lifecycle.
//!
//! A single 256-bit key per installation lives in `<config dir>/master.key`
//! as 64 hex characters, readable and writable by the owner only.  It is
//! generated on first use and loaded on every later start.
//!
//! A key file that exists but does not decode to exactly 32 bytes is a
//! fatal error.  Replacing it would orphan every stored ciphertext.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use rand::rngs::OsRng;
use rand::TryRngCore;
use tracing::info;
use zeroize::{Zeroize, Zeroizing};

use crate::config;
use crate::errors::{Result, TokenVaultError};

/// Length of the master key in bytes (256 bits, for AES-256).
pub const KEY_LEN: usize = 32;

/// A 32-byte master key that zeroes its memory when dropped.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct MasterKey {
    bytes: [u8; KEY_LEN],
}

impl MasterKey {
    /// Wrap raw key bytes.  Used by the key manager and by tests that
    /// want an in-memory key.
    pub fn new(bytes: [u8; KEY_LEN]) -> Self {
        Self { bytes }
    }

    /// Draw a fresh key from the OS random source.
    pub fn generate() -> Result<Self> {
        let mut bytes = [0u8; KEY_LEN];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| TokenVaultError::KeyAccess(format!("random source failed: {e}")))?;
        let key = Self::new(bytes);
        bytes.zeroize();
        Ok(key)
    }

    /// Decode a hex-encoded key, rejecting anything that is not 32 bytes.
    pub fn from_hex(encoded: &str) -> Result<Self> {
        let decoded = Zeroizing::new(
            hex::decode(encoded.trim())
                .map_err(|e| TokenVaultError::KeyAccess(format!("corrupt key file: {e}")))?,
        );

        let mut bytes: [u8; KEY_LEN] = decoded.as_slice().try_into().map_err(|_| {
            TokenVaultError::KeyAccess(format!(
                "corrupt key file: expected {KEY_LEN} bytes, got {}",
                decoded.len()
            ))
        })?;
        let key = Self::new(bytes);
        bytes.zeroize();
        Ok(key)
    }

    /// Access the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.bytes
    }

    fn to_hex(&self) -> Zeroizing<String> {
        Zeroizing::new(hex::encode(self.bytes))
    }
}

impl std::fmt::Debug for MasterKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterKey([REDACTED])")
    }
}

/// Owns the location of the master key file.
#[derive(Debug, Clone)]
pub struct KeyManager {
    config_dir: PathBuf,
    key_path: PathBuf,
}

impl KeyManager {
    /// Build a manager for `key_path` inside `config_dir`.
    pub fn new(config_dir: &Path, key_path: &Path) -> Self {
        Self {
            config_dir: config_dir.to_path_buf(),
            key_path: key_path.to_path_buf(),
        }
    }

    /// Path to the key file on disk.
    pub fn key_path(&self) -> &Path {
        &self.key_path
    }

    /// Load the master key, generating and persisting it on first use.
    pub fn get_or_create(&self) -> Result<MasterKey> {
        config::ensure_private_dir(&self.config_dir)
            .map_err(|e| TokenVaultError::KeyAccess(format!("cannot create config directory: {e}")))?;

        if self.key_path.exists() {
            return self.load();
        }

        self.generate_and_save()
    }

    fn load(&self) -> Result<MasterKey> {
        let contents = Zeroizing::new(fs::read_to_string(&self.key_path).map_err(|e| {
            TokenVaultError::KeyAccess(format!(
                "failed to read key file {}: {e}",
                self.key_path.display()
            ))
        })?);

        MasterKey::from_hex(&contents)
    }

    fn generate_and_save(&self) -> Result<MasterKey> {
        if let Some(parent) = self.key_path.parent() {
            config::ensure_private_dir(parent).map_err(|e| {
                TokenVaultError::KeyAccess(format!("cannot create key directory: {e}"))
            })?;
        }

        let key = MasterKey::generate()?;

        let mut options = fs::OpenOptions::new();
        options.write(true).create_new(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        let mut file = options.open(&self.key_path).map_err(|e| {
            TokenVaultError::KeyAccess(format!(
                "failed to create key file {}: {e}",
                self.key_path.display()
            ))
        })?;
        file.write_all(key.to_hex().as_bytes())
            .and_then(|()| file.sync_all())
            .map_err(|e| TokenVaultError::KeyAccess(format!("failed to write key file: {e}")))?;

        info!(path = %self.key_path.display(), "Generated new master key");
        Ok(key)
    }
}
