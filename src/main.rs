use clap::Parser;
use tracing_subscriber::EnvFilter;

use tokenvault::cli::{Cli, Commands};

fn main() {
    // Logs go to stderr so `fetch` output stays pipeable.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env("TOKENVAULT_LOG").unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Store {
            ref project,
            ref token,
            ref tag,
        } => tokenvault::cli::commands::store::execute(
            &cli,
            project,
            token.as_deref(),
            tag.as_deref(),
        ),
        Commands::Fetch {
            ref project,
            ref tag,
            json,
        } => tokenvault::cli::commands::fetch::execute(&cli, project, tag.as_deref(), json),
        Commands::List { ref project } => {
            tokenvault::cli::commands::list::execute(&cli, project.as_deref())
        }
        Commands::Delete {
            ref project,
            ref tag,
            force,
        } => tokenvault::cli::commands::delete::execute(&cli, project, tag.as_deref(), force),
        Commands::Status => tokenvault::cli::commands::status::execute(&cli),
        Commands::Completions { shell } => tokenvault::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        tokenvault::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}
