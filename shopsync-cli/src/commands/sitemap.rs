//! `shopsync sitemap` — regenerate sitemap chunks and the index.

use anyhow::{Context, Result};
use colored::Colorize;

use shopsync_sync::{pipeline, RobotsOutcome, Scope, SitemapReport};

use super::SiteArgs;

pub fn run(site: &SiteArgs) -> Result<()> {
    let report = site.with_context(|ctx| pipeline::run(ctx, Scope::Sitemap).context("sitemap failed"))?;
    if let Some(sitemap) = &report.sitemap {
        print_report(sitemap);
    }
    Ok(())
}

pub(crate) fn print_report(report: &SitemapReport) {
    let changed = report.chunks.iter().filter(|c| c.is_change()).count();
    println!(
        "{} sitemap ({} entries from {}, {} chunk(s), {changed} changed)",
        "✓".green().bold(),
        report.entries,
        report.pages_dir.display(),
        report.chunks.len()
    );
    for path in &report.pruned {
        println!("  {}  {}", "-".red(), path.display());
    }
    if report.robots == RobotsOutcome::Registered {
        println!("  +  robots.txt sitemap entry");
    }
}
