//! Subcommand implementations and the site setup they share.

pub mod diff;
pub mod pages;
pub mod sitemap;
pub mod today;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use shopsync_core::config::CONFIG_FILE_NAME;
use shopsync_core::{
    load_config, FsStore, GitHistory, NoHistory, SiteConfig, StoreMtime, SystemClock,
    TimestampProvider,
};
use shopsync_sync::{pipeline, Scope, SyncContext};

/// Where sitemap `lastmod` values come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum History {
    /// git when the root is a checkout, otherwise off.
    Auto,
    /// Last commit touching the file.
    Git,
    /// File modification time.
    Mtime,
    /// Always the current time.
    Off,
}

/// Options shared by every subcommand.
#[derive(Args, Debug, Clone)]
pub struct SiteArgs {
    /// Site root; every configured path is relative to it.
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Site config file [default: <root>/shopsync.yaml].
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Source of sitemap lastmod timestamps.
    #[arg(long, global = true, value_enum, default_value_t = History::Auto)]
    pub history: History,
}

impl SiteArgs {
    fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| self.root.join(CONFIG_FILE_NAME))
    }

    pub fn load_config(&self) -> Result<SiteConfig> {
        let path = self.config_path();
        load_config(&FsStore, &path).with_context(|| format!("cannot load {}", path.display()))
    }

    fn resolved_history(&self) -> History {
        match self.history {
            History::Auto if GitHistory::is_work_tree(&self.root) => History::Git,
            History::Auto => History::Off,
            other => other,
        }
    }

    /// Build a [`SyncContext`] over the real filesystem and hand it to `f`.
    pub fn with_context<T>(&self, f: impl FnOnce(&SyncContext<'_>) -> Result<T>) -> Result<T> {
        let config = self.load_config()?;
        let clock = SystemClock;
        let git = GitHistory::new(&self.root);
        let mtime = StoreMtime::new(&FsStore);
        let history: &dyn TimestampProvider = match self.resolved_history() {
            History::Git => &git,
            History::Mtime => &mtime,
            History::Auto | History::Off => &NoHistory,
        };
        tracing::debug!("site root {}, history {:?}", self.root.display(), self.resolved_history());

        let ctx = SyncContext::new(&self.root, config, &FsStore, &clock, history)
            .context("cannot load templates")?;
        f(&ctx)
    }
}

/// `shopsync all` — every stage, printing each stage's summary.
pub fn all(site: &SiteArgs) -> Result<()> {
    let report = site.with_context(|ctx| pipeline::run(ctx, Scope::All).context("sync failed"))?;
    if let Some(pages) = &report.pages {
        pages::print_report(pages, false);
    }
    if let Some(sitemap) = &report.sitemap {
        sitemap::print_report(sitemap);
    }
    if let Some(fragment) = &report.fragment {
        today::print_fragment(fragment);
    }
    if let Some(inject) = &report.inject {
        today::print_inject(inject);
    }
    Ok(())
}
