//! CLI command handlers, one file per command.

mod checksum;
mod config;
mod drill_url;
mod fetch;

pub use checksum::run_checksum;
pub use config::run_config;
pub use drill_url::{drill_request, run_drill_url};
pub use fetch::{run_fetch, FetchArgs};
