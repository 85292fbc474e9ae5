//! `shopsync pages` — write one page per catalog record.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;

use shopsync_sync::{pipeline, MaterializeReport, Scope, WriteResult};

use super::SiteArgs;

/// Arguments for `shopsync pages`.
#[derive(Args, Debug)]
pub struct PagesArgs {
    /// Show what would be written without actually writing any files.
    #[arg(long)]
    pub dry_run: bool,
}

impl PagesArgs {
    pub fn run(self, site: &SiteArgs) -> Result<()> {
        let dry_run = self.dry_run;
        let report = site.with_context(|ctx| {
            pipeline::run(ctx, Scope::Pages { dry_run }).context("pages failed")
        })?;
        if let Some(pages) = &report.pages {
            print_report(pages, dry_run);
        }
        Ok(())
    }
}

pub(crate) fn print_report(report: &MaterializeReport, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    let tick = "✓".green().bold();

    if report.writes.is_empty() {
        println!("{prefix}{tick} pages — nothing to do ({} skipped)", report.skipped);
        return;
    }

    println!(
        "{prefix}{tick} pages ({} changed, {} unchanged, {} skipped)",
        report.changed(),
        report.unchanged(),
        report.skipped
    );
    for w in report.writes.iter().filter(|w| w.is_change()) {
        match w {
            WriteResult::Written { path } => println!("  ✎  {}", path.display()),
            WriteResult::WouldWrite { path } => println!("  ~  {}", path.display()),
            WriteResult::Unchanged { .. } => {}
        }
    }
}
