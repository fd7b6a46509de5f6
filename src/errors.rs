use thiserror::Error;

/// All errors that can occur in TokenVault.
#[derive(Debug, Error)]
pub enum TokenVaultError {
    // --- Key errors ---
    #[error("Master key unavailable: {0}")]
    KeyAccess(String),

    // --- Crypto errors ---
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Decryption failed — invalid key or corrupted data")]
    DecryptionFailed,

    // --- Store errors ---
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("No token stored for project '{project}' with tag '{tag}'")]
    NotFound { project: String, tag: String },

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    Config(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

impl TokenVaultError {
    /// True for failures raised by the cipher layer.
    pub fn is_cipher_error(&self) -> bool {
        matches!(self, Self::EncryptionFailed(_) | Self::DecryptionFailed)
    }

    /// True when a fetch failed because the record is missing or cannot be
    /// decrypted. Callers report both the same way so that a corrupted
    /// record is indistinguishable from an absent one.
    pub fn is_not_found_or_undecryptable(&self) -> bool {
        matches!(self, Self::NotFound { .. }) || self.is_cipher_error()
    }
}

/// Convenience type alias for TokenVault results.
pub type Result<T> = std::result::Result<T, TokenVaultError>;
