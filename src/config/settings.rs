use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TokenVaultError};

/// Installation-level configuration, loaded from `<config dir>/config.toml`.
///
/// Every field has a sensible default so TokenVault works out-of-the-box
/// without any config file at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// File (relative to the config directory) holding the hex master key.
    #[serde(default = "default_key_file")]
    pub key_file: String,

    /// SQLite database file (relative to the config directory).
    #[serde(default = "default_database_file")]
    pub database_file: String,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_key_file() -> String {
    "master.key".to_string()
}

fn default_database_file() -> String {
    "token.db".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            key_file: default_key_file(),
            database_file: default_database_file(),
        }
    }
}

impl Settings {
    /// Name of the config file we look for in the config directory.
    const FILE_NAME: &'static str = "config.toml";

    /// Load settings from `<config_dir>/config.toml`.
    ///
    /// If the file does not exist, defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(config_dir: &Path) -> Result<Self> {
        let config_path = config_dir.join(Self::FILE_NAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            TokenVaultError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        Ok(settings)
    }

    /// Full path to the master key file.
    pub fn key_path(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(&self.key_file)
    }

    /// Full path to the token database.
    pub fn database_path(&self, config_dir: &Path) -> PathBuf {
        config_dir.join(&self.database_file)
    }
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_match_legacy_layout() {
        let s = Settings::default();
        assert_eq!(s.key_file, "master.key");
        assert_eq!(s.database_file, "token.db");
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.database_file, "token.db");
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let config = r#"
key_file = "keys/primary.key"
database_file = "vault.sqlite"
"#;
        fs::write(tmp.path().join("config.toml"), config).unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.key_file, "keys/primary.key");
        assert_eq!(settings.database_file, "vault.sqlite");
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "database_file = \"x.db\"\n").unwrap();

        let settings = Settings::load(tmp.path()).unwrap();
        assert_eq!(settings.database_file, "x.db");
        assert_eq!(settings.key_file, "master.key");
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("config.toml"), "not valid {{toml").unwrap();

        let result = Settings::load(tmp.path());
        assert!(matches!(result, Err(TokenVaultError::Config(_))));
    }

    #[test]
    fn paths_resolve_inside_config_dir() {
        let s = Settings::default();
        let dir = Path::new("/home/user/.tokenvault");
        assert_eq!(
            s.key_path(dir),
            PathBuf::from("/home/user/.tokenvault/master.key")
        );
        assert_eq!(
            s.database_path(dir),
            PathBuf::from("/home/user/.tokenvault/token.db")
        );
    }
}
