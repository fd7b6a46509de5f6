//! `tokenvault fetch` — decrypt and print a stored token.

use serde_json::json;

use crate::cli::{open_store, vault_paths, Cli};
use crate::errors::{Result, TokenVaultError};
use crate::store::normalize_tag;

/// Message shown when a token is missing or cannot be decrypted.  Both
/// cases share it.
const FETCH_FAILED: &str = "Token not found or decryption failed";

/// Execute the `fetch` command.
pub fn execute(cli: &Cli, project: &str, tag: Option<&str>, as_json: bool) -> Result<()> {
    let tag = normalize_tag(tag);
    let paths = vault_paths(cli)?;
    let store = open_store(&paths)?;

    let (token, meta) = store.get(project, tag).map_err(|e| {
        if e.is_not_found_or_undecryptable() {
            TokenVaultError::CommandFailed(FETCH_FAILED.into())
        } else {
            e
        }
    })?;

    if as_json {
        let body = json!({ "token": token, "meta": meta });
        println!("{}", serde_json::to_string_pretty(&body)?);
    } else {
        // Print only the raw value so it can be piped.
        println!("{token}");
    }

    Ok(())
}
