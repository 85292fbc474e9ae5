//! Per-run collaborators shared by every pipeline.

use std::path::{Component, Path, PathBuf};

use shopsync_core::{Clock, SiteConfig, Store, TimestampProvider};
use shopsync_renderer::Renderer;

use crate::error::SyncError;

/// Everything a pipeline needs: the site root, its config, and the injected
/// store, clock, and history.
pub struct SyncContext<'a> {
    pub root: PathBuf,
    pub config: SiteConfig,
    pub store: &'a dyn Store,
    pub clock: &'a dyn Clock,
    pub history: &'a dyn TimestampProvider,
    pub renderer: Renderer,
}

impl<'a> SyncContext<'a> {
    /// Build a context, loading template overrides from `config.templates_dir`
    /// (relative to `root`) when set.
    pub fn new(
        root: impl Into<PathBuf>,
        config: SiteConfig,
        store: &'a dyn Store,
        clock: &'a dyn Clock,
        history: &'a dyn TimestampProvider,
    ) -> Result<Self, SyncError> {
        let root = root.into();
        let overrides = config.templates_dir.as_ref().map(|dir| root.join(dir));
        let renderer = Renderer::with_overrides(overrides.as_deref())?;
        Ok(Self {
            root,
            config,
            store,
            clock,
            history,
            renderer,
        })
    }

    /// Resolve a config-relative path against the site root. `.` components
    /// are dropped so `sitemap_dir: .` names the root itself.
    pub fn path(&self, relative: &Path) -> PathBuf {
        let mut out = self.root.clone();
        for component in relative.components() {
            if component != Component::CurDir {
                out.push(component);
            }
        }
        out
    }
}
