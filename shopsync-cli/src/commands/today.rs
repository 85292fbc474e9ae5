//! `shopsync today [build|inject]` — the recent-updates widget.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;

use shopsync_sync::{pipeline, FragmentReport, InjectReport, Scope};

use super::SiteArgs;

#[derive(Subcommand, Debug)]
pub enum TodayCommand {
    /// Select the newest documents and write the fragment.
    Build,
    /// Inject the fragment into the home page.
    Inject,
}

pub fn run(site: &SiteArgs, command: Option<TodayCommand>) -> Result<()> {
    let scope = match command {
        Some(TodayCommand::Build) => Scope::TodayBuild,
        Some(TodayCommand::Inject) => Scope::TodayInject,
        None => Scope::Today,
    };
    let report = site.with_context(|ctx| pipeline::run(ctx, scope).context("today failed"))?;
    if let Some(fragment) = &report.fragment {
        print_fragment(fragment);
    }
    if let Some(inject) = &report.inject {
        print_inject(inject);
    }
    Ok(())
}

pub(crate) fn print_fragment(report: &FragmentReport) {
    let tick = if report.items.is_empty() {
        "!".yellow().bold()
    } else {
        "✓".green().bold()
    };
    println!(
        "{tick} today build ({} item(s) from {})",
        report.items.len(),
        report.corpus_dir.display()
    );
    for item in &report.items {
        println!("  ·  {}  {}", item.href, item.title.dimmed());
    }
}

pub(crate) fn print_inject(report: &InjectReport) {
    let state = if report.write.is_change() { "updated" } else { "unchanged" };
    println!(
        "{} today inject ({} {state}, anchor {})",
        "✓".green().bold(),
        report.host.display(),
        report.strategy.name()
    );
}
