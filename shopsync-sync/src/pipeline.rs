//! Shared pipeline entrypoint used by every CLI command.

use shopsync_core::load_catalog;

use crate::context::SyncContext;
use crate::error::SyncError;
use crate::inject::{inject_home, InjectReport};
use crate::pages::{materialize, MaterializeReport};
use crate::recency::{build_fragment, FragmentReport};
use crate::sitemap::{build_sitemaps, SitemapReport};

/// Which stages a run covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Catalog → pages. `dry_run` reports without writing.
    Pages { dry_run: bool },
    Sitemap,
    TodayBuild,
    TodayInject,
    /// `TodayBuild` then `TodayInject`.
    Today,
    /// Every stage: pages, sitemap, today build, today inject.
    All,
}

impl Scope {
    fn pages(&self) -> Option<bool> {
        match self {
            Scope::Pages { dry_run } => Some(*dry_run),
            Scope::All => Some(false),
            _ => None,
        }
    }

    fn sitemap(&self) -> bool {
        matches!(self, Scope::Sitemap | Scope::All)
    }

    fn today_build(&self) -> bool {
        matches!(self, Scope::TodayBuild | Scope::Today | Scope::All)
    }

    fn today_inject(&self) -> bool {
        matches!(self, Scope::TodayInject | Scope::Today | Scope::All)
    }
}

/// Per-stage reports; `None` for stages outside the scope.
#[derive(Debug, Default)]
pub struct RunReport {
    pub pages: Option<MaterializeReport>,
    pub sitemap: Option<SitemapReport>,
    pub fragment: Option<FragmentReport>,
    pub inject: Option<InjectReport>,
}

/// Run the stages of `scope` in order, stopping at the first failure.
pub fn run(ctx: &SyncContext<'_>, scope: Scope) -> Result<RunReport, SyncError> {
    let mut report = RunReport::default();

    if let Some(dry_run) = scope.pages() {
        let catalog = ctx.path(&ctx.config.catalog.path);
        let items = load_catalog(ctx.store, &catalog)?;
        tracing::debug!("catalog {}: {} record(s)", catalog.display(), items.len());
        report.pages = Some(materialize(ctx, &items, dry_run)?);
    }
    if scope.sitemap() {
        report.sitemap = Some(build_sitemaps(ctx)?);
    }
    if scope.today_build() {
        report.fragment = Some(build_fragment(ctx)?);
    }
    if scope.today_inject() {
        report.inject = Some(inject_home(ctx)?);
    }
    Ok(report)
}
