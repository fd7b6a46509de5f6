//! `tokenvault delete` — remove a stored token.

use dialoguer::Confirm;

use crate::cli::output;
use crate::cli::{open_store, vault_paths, Cli};
use crate::errors::{Result, TokenVaultError};
use crate::store::normalize_tag;

/// Execute the `delete` command.
pub fn execute(cli: &Cli, project: &str, tag: Option<&str>, force: bool) -> Result<()> {
    let tag = normalize_tag(tag);

    // Unless --force is set, ask for confirmation before deleting.
    if !force {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete token '{project}' (tag: {tag})?"))
            .default(false)
            .interact()
            .map_err(|e| TokenVaultError::CommandFailed(format!("confirm prompt: {e}")))?;

        if !confirmed {
            output::info("Cancelled.");
            return Ok(());
        }
    }

    let paths = vault_paths(cli)?;
    let store = open_store(&paths)?;
    store.delete(project, tag)?;

    output::success(&format!("Deleted token '{project}' (tag: {tag})"));

    Ok(())
}
