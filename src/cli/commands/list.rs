//! `tokenvault list` — display stored tokens in a table.

use crate::cli::output;
use crate::cli::{open_store, vault_paths, Cli};
use crate::errors::Result;

/// Execute the `list` command.
pub fn execute(cli: &Cli, project: Option<&str>) -> Result<()> {
    let paths = vault_paths(cli)?;
    let store = open_store(&paths)?;

    let records = store.list(project)?;

    match project {
        Some(p) => output::info(&format!("{} token(s) for '{p}'", records.len())),
        None => output::info(&format!("{} token(s) stored", records.len())),
    }

    output::print_records_table(&records);

    Ok(())
}
