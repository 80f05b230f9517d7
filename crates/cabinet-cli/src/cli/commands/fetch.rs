//! `cabinet fetch`: download every attachment of one report.

use anyhow::Result;
use cabinet_core::config::{CabinetConfig, ReportSelection};
use cabinet_core::control::CancelFlag;
use cabinet_core::transport::SessionCookies;
use cabinet_core::{Cabinet, RunSummary};

#[derive(Debug, Clone)]
pub struct FetchArgs {
    pub report: String,
    pub year: String,
    pub login: String,
    pub password: String,
}

pub async fn run_fetch(cfg: CabinetConfig, args: FetchArgs) -> Result<()> {
    let selection = ReportSelection::new(args.report, args.year);
    let cookies = SessionCookies::portal_login(&args.login, &args.password, &selection);
    let cabinet = Cabinet::new(cfg, selection, cookies)?;

    // Ctrl-C stops new page fetches; in-flight work and queued downloads finish.
    let cancel = CancelFlag::new();
    let on_signal = cancel.clone();
    let signal_task = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received; finishing in-flight work");
            eprintln!("interrupted, finishing in-flight downloads...");
            on_signal.cancel();
        }
    });

    println!(
        "Downloading {} into {}",
        cabinet.selection().folder_name(),
        cabinet.output_folder().display()
    );
    let result = cabinet.run(cancel).await;
    signal_task.abort();

    print_summary(&result?);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    if !summary.banner.heading.is_empty() {
        println!("{}", summary.banner.heading);
    }
    if !summary.banner.status.is_empty() {
        println!("{}", summary.banner.status);
    }
    if summary.looks_unauthenticated() {
        println!("No report rows found: check the login, password, report and year.");
    }

    for failed in &summary.sink.failed {
        println!("  failed  {}: {}", failed.link, failed.error);
    }
    println!(
        "{} saved, {} failed, {} pages visited, {} branch errors{}",
        summary.sink.saved.len(),
        summary.sink.failed.len(),
        summary.walk.pages_fetched,
        summary.walk.transport_failures,
        if summary.cancelled { " (interrupted)" } else { "" }
    );
}
