//! Cryptographic primitives for TokenVault.
//!
//! This module provides:
//! - The master key and its on-disk lifecycle (`master_key`)
//! - AES-256-GCM sealing over raw bytes (`encryption`)
//! - The hex-encoding `Cipher` used by the token store (`cipher`)

pub mod cipher;
pub mod encryption;
pub mod master_key;

pub use cipher::Cipher;
pub use master_key::{KeyManager, MasterKey};
