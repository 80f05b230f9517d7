//! `cabinet drill-url`: show where a row's expand button leads.

use anyhow::{Context, Result};
use cabinet_core::config::CabinetConfig;
use cabinet_core::handler::NavigationRequest;
use cabinet_core::page::ContainerKind;
use url::Url;

pub fn run_drill_url(cfg: &CabinetConfig, handler: &str) -> Result<()> {
    let request = drill_request(&cfg.origin, handler)?;
    println!("{}", request);
    println!("container: {} ({:?})", request.container(), ContainerKind::of(&request));
    Ok(())
}

pub fn drill_request(origin: &str, handler: &str) -> Result<NavigationRequest> {
    let origin =
        Url::parse(origin).with_context(|| format!("invalid portal origin: {}", origin))?;
    Ok(NavigationRequest::from_handler(&origin, handler)?)
}
