//! `cabinet config`: show where the config lives and what is in effect.

use anyhow::Result;
use cabinet_core::config::{self, CabinetConfig};

pub fn run_config(cfg: &CabinetConfig) -> Result<()> {
    println!("# {}", config::config_path()?.display());
    print!("{}", toml::to_string_pretty(cfg)?);
    Ok(())
}
