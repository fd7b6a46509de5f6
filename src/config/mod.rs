//! Configuration directory lookup and installation settings.

pub mod settings;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::errors::{Result, TokenVaultError};

pub use settings::Settings;

/// Directory name used under the user's home when no override is given.
pub const DEFAULT_DIR_NAME: &str = ".tokenvault";

/// Resolve the configuration directory.
///
/// An explicit override (from `--home` or `TOKENVAULT_HOME`) wins;
/// otherwise `<home>/.tokenvault` is used.
pub fn resolve_config_dir(override_dir: Option<&Path>) -> Result<PathBuf> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }

    let home = dirs::home_dir().ok_or_else(|| {
        TokenVaultError::KeyAccess("could not determine the user home directory".into())
    })?;
    Ok(home.join(DEFAULT_DIR_NAME))
}

/// Create `dir` (and parents) if absent.  On Unix the leaf directory is
/// created with mode `0700`.
pub fn ensure_private_dir(dir: &Path) -> io::Result<()> {
    if dir.is_dir() {
        return Ok(());
    }

    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)
}
