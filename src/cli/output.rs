//! Colored terminal output helpers.
//!
//! All user-facing output goes through these functions so we get
//! consistent styling across every command.

use chrono::{DateTime, Utc};
use comfy_table::{ContentArrangement, Table};
use console::style;

use crate::store::RecordSummary;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a yellow warning: "warning_sign {msg}"
pub fn warning(msg: &str) {
    eprintln!("{} {}", style("\u{26a0}").yellow().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Format a Unix timestamp for display.
pub fn format_unix(ts: i64) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .map_or_else(|| ts.to_string(), |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

/// Print a table of stored records (Project, Tag, Type, Expires, Stored).
pub fn print_records_table(records: &[RecordSummary]) {
    if records.is_empty() {
        info("No tokens stored yet.");
        tip("Run `tokenvault store <PROJECT>` to add your first token.");
        return;
    }

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Project", "Tag", "Type", "Expires", "Stored"]);

    for r in records {
        table.add_row(vec![
            r.project.clone(),
            r.tag.clone(),
            r.token_type.to_string(),
            r.expires_at.map_or_else(|| "-".to_string(), format_unix),
            r.created_at.map_or_else(
                || "-".to_string(),
                |dt| dt.format("%Y-%m-%d %H:%M:%S").to_string(),
            ),
        ]);
    }

    println!("{table}");
}
