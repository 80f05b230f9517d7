//! CLI for the cabinet report downloader.

mod commands;

use anyhow::Result;
use cabinet_core::config::{self, CabinetConfig};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use commands::{run_checksum, run_config, run_drill_url, run_fetch, FetchArgs};

/// Top-level CLI for the cabinet report downloader.
#[derive(Debug, Parser)]
#[command(name = "cabinet")]
#[command(about = "Download every attachment of a report from the monitoring cabinet", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Walk the report tree and download every attachment into `{report}_{year}`.
    Fetch {
        /// Report form code, e.g. oo1.
        #[arg(short = 'r', long)]
        report: String,
        /// Reporting year, e.g. 2023.
        #[arg(short = 'y', long)]
        year: String,
        /// Portal login.
        #[arg(short = 'l', long)]
        login: String,
        /// Portal password.
        #[arg(short = 'p', long)]
        password: String,
        /// Portal origin (overrides the config file).
        #[arg(long, value_name = "URL")]
        origin: Option<String>,
        /// Directory the report folder is created in (overrides the config file).
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Print the navigation URL a reopenJumper handler drills into.
    DrillUrl {
        /// Handler text, e.g. 'reopenJumper("101", "55", "3", "7", "1", "jslist")'.
        handler: String,
        /// Portal origin (overrides the config file).
        #[arg(long, value_name = "URL")]
        origin: Option<String>,
    },

    /// Compute SHA-256 of a file (e.g. a downloaded attachment).
    Checksum {
        /// Path to the file.
        path: String,
    },

    /// Print the config file location and the effective configuration.
    Config,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let cfg = config::load_or_init()?;
        tracing::debug!("loaded config: {:?}", cfg);

        match cli.command {
            CliCommand::Fetch {
                report,
                year,
                login,
                password,
                origin,
                output_dir,
            } => {
                let cfg = with_overrides(cfg, origin, output_dir);
                let args = FetchArgs {
                    report,
                    year,
                    login,
                    password,
                };
                run_fetch(cfg, args).await?;
            }
            CliCommand::DrillUrl { handler, origin } => {
                let cfg = with_overrides(cfg, origin, None);
                run_drill_url(&cfg, &handler)?;
            }
            CliCommand::Checksum { path } => run_checksum(Path::new(&path)).await?,
            CliCommand::Config => run_config(&cfg)?,
        }

        Ok(())
    }
}

/// Apply command-line overrides on top of the loaded config.
fn with_overrides(
    mut cfg: CabinetConfig,
    origin: Option<String>,
    output_dir: Option<PathBuf>,
) -> CabinetConfig {
    if let Some(origin) = origin {
        cfg.origin = origin;
    }
    if let Some(dir) = output_dir {
        cfg.output_dir = dir;
    }
    cfg
}

#[cfg(test)]
mod tests;
