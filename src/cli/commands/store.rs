//! `tokenvault store` — encrypt and save a token for a project.

use tracing::debug;

use crate::cli::output;
use crate::cli::{open_store, read_token, vault_paths, Cli};
use crate::errors::{Result, TokenVaultError};
use crate::store::normalize_tag;

/// Message shown for any failure while storing.
const STORE_FAILED: &str = "Failed to encrypt and store token";

/// Execute the `store` command.
pub fn execute(cli: &Cli, project: &str, token: Option<&str>, tag: Option<&str>) -> Result<()> {
    let tag = normalize_tag(tag);
    let token = read_token(token, project)?;
    if token.is_empty() {
        return Err(TokenVaultError::InvalidInput("token cannot be empty".into()));
    }

    let paths = vault_paths(cli)?;
    let meta = open_store(&paths)
        .and_then(|store| store.put(project, tag, &token))
        .map_err(|e| {
            debug!(error = %e, project, tag, "Store failed");
            match e {
                TokenVaultError::InvalidInput(_) => e,
                _ => TokenVaultError::CommandFailed(STORE_FAILED.into()),
            }
        })?;

    output::success(&format!(
        "Securely stored {} token for '{project}' (tag: {tag})",
        meta.token_type
    ));
    if let Some(sub) = &meta.subject {
        output::info(&format!("Subject: {sub}"));
    }
    output::tip(&format!(
        "Expires (best effort): {}",
        output::format_unix(meta.expires_at)
    ));

    Ok(())
}
