//! `tokenvault status` — show where the vault lives and what it holds.

use crate::cli::output;
use crate::cli::{open_store, vault_paths, Cli};
use crate::errors::Result;

/// Execute the `status` command.
pub fn execute(cli: &Cli) -> Result<()> {
    let paths = vault_paths(cli)?;
    let store = open_store(&paths)?;

    output::info(&format!("Config directory: {}", paths.config_dir.display()));
    output::info(&format!("Master key:       {}", paths.key_path.display()));
    output::info(&format!("Database:         {}", paths.database_path.display()));
    output::info(&format!("Schema:           {}", store.schema_state()?));
    output::info(&format!("Tokens stored:    {}", store.count()?));

    let report = store.startup_report();
    if report.migrated() {
        output::success(&format!(
            "Upgraded {} legacy token(s) to encrypted storage",
            report.upgraded
        ));
        if report.superseded > 0 {
            output::info(&format!(
                "{} older legacy row(s) were replaced by a newer row for the same project",
                report.superseded
            ));
        }
        for row in &report.skipped {
            output::warning(&format!(
                "Legacy row {} ({}) not migrated: {}",
                row.rowid,
                row.project.as_deref().unwrap_or("?"),
                row.reason
            ));
        }
        if !report.skipped.is_empty() {
            output::tip("Skipped rows remain in the tokens_v1_backup table.");
        }
    }

    Ok(())
}
