//! One module per subcommand.

pub mod completions;
pub mod delete;
pub mod fetch;
pub mod list;
pub mod status;
pub mod store;
