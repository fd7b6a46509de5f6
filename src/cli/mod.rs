//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use zeroize::Zeroizing;

use crate::config::{self, Settings};
use crate::crypto::{Cipher, KeyManager};
use crate::errors::{Result, TokenVaultError};
use crate::store::RecordStore;

/// TokenVault CLI: local encrypted token vault.
#[derive(Parser)]
#[command(
    name = "tokenvault",
    about = "Local encrypted vault for API tokens and keys",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration directory (default: ~/.tokenvault)
    #[arg(long, env = "TOKENVAULT_HOME", global = true)]
    pub home: Option<PathBuf>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Encrypt and store a token for a project
    Store {
        /// Project name
        project: String,
        /// Token value (omit to read from stdin or a prompt)
        token: Option<String>,
        /// Tag distinguishing several tokens of one project
        #[arg(short, long)]
        tag: Option<String>,
    },

    /// Print a stored token
    Fetch {
        /// Project name
        project: String,
        /// Tag to fetch (default: "default")
        #[arg(short, long)]
        tag: Option<String>,
        /// Print the token and its metadata as JSON
        #[arg(long)]
        json: bool,
    },

    /// List stored tokens (values are never shown)
    List {
        /// Only show tokens for this project
        #[arg(short, long)]
        project: Option<String>,
    },

    /// Delete a stored token
    Delete {
        /// Project name
        project: String,
        /// Tag to delete (default: "default")
        #[arg(short, long)]
        tag: Option<String>,
        /// Skip confirmation prompt
        #[arg(short, long)]
        force: bool,
    },

    /// Show vault location, schema generation and record count
    Status,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Resolved locations for this invocation.
#[derive(Debug, Clone)]
pub struct VaultPaths {
    pub config_dir: PathBuf,
    pub key_path: PathBuf,
    pub database_path: PathBuf,
}

/// Resolve the config directory and load `config.toml` from it.
pub fn vault_paths(cli: &Cli) -> Result<VaultPaths> {
    let config_dir = config::resolve_config_dir(cli.home.as_deref())?;
    let settings = Settings::load(&config_dir)?;

    Ok(VaultPaths {
        key_path: settings.key_path(&config_dir),
        database_path: settings.database_path(&config_dir),
        config_dir,
    })
}

/// Load (or create) the master key and open the token store.
///
/// The key is resolved once here and shared with the cipher; the store
/// runs its schema check before it is handed back.
pub fn open_store(paths: &VaultPaths) -> Result<RecordStore> {
    let key = KeyManager::new(&paths.config_dir, &paths.key_path).get_or_create()?;
    let cipher = Cipher::new(Arc::new(key));

    if let Some(parent) = paths.database_path.parent() {
        config::ensure_private_dir(parent)?;
    }
    RecordStore::open(&paths.database_path, cipher)
}

/// Read a token from one of three sources: the command line, piped
/// stdin, or a hidden interactive prompt.
pub fn read_token(inline: Option<&str>, project: &str) -> Result<Zeroizing<String>> {
    if let Some(v) = inline {
        output::warning("Token provided on command line — it may appear in shell history.");
        return Ok(Zeroizing::new(v.to_string()));
    }

    if !io::stdin().is_terminal() {
        let mut buf = Zeroizing::new(String::new());
        io::stdin().read_to_string(&mut buf)?;
        return Ok(Zeroizing::new(buf.trim_end().to_string()));
    }

    let token = dialoguer::Password::new()
        .with_prompt(format!("Enter token for {project}"))
        .interact()
        .map_err(|e| TokenVaultError::CommandFailed(format!("input prompt: {e}")))?;
    Ok(Zeroizing::new(token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_store_with_tag() {
        let cli = Cli::try_parse_from(["tokenvault", "store", "acme", "tok", "--tag", "admin"])
            .unwrap();
        match cli.command {
            Commands::Store {
                project,
                token,
                tag,
            } => {
                assert_eq!(project, "acme");
                assert_eq!(token.as_deref(), Some("tok"));
                assert_eq!(tag.as_deref(), Some("admin"));
            }
            _ => panic!("expected store"),
        }
    }

    #[test]
    fn home_flag_sets_config_dir() {
        let cli =
            Cli::try_parse_from(["tokenvault", "--home", "/tmp/tv", "status"]).unwrap();
        let paths = vault_paths(&cli).unwrap();
        assert_eq!(paths.config_dir, PathBuf::from("/tmp/tv"));
        assert_eq!(paths.key_path, PathBuf::from("/tmp/tv/master.key"));
        assert_eq!(paths.database_path, PathBuf::from("/tmp/tv/token.db"));
    }

    #[test]
    fn inline_token_is_used_verbatim() {
        let token = read_token(Some("sk_live_1"), "acme").unwrap();
        assert_eq!(token.as_str(), "sk_live_1");
    }
}
