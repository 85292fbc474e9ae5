//! Catalog → page materialization.
//!
//! One `<output_dir>/<id>.<source_ext>` per resolved id, written through the
//! content-gated writer so an unchanged catalog produces zero writes. Pages are
//! never deleted here.

use std::collections::HashMap;
use std::path::PathBuf;

use shopsync_core::CatalogItem;
use shopsync_renderer::PageContext;

use crate::context::SyncContext;
use crate::error::SyncError;
use crate::writer::{write_if_changed, WriteResult};

/// Outcome of one materializer run.
#[derive(Debug, Default)]
pub struct MaterializeReport {
    pub writes: Vec<WriteResult>,
    /// Records without a usable id.
    pub skipped: usize,
}

impl MaterializeReport {
    pub fn written(&self) -> usize {
        self.count(|w| matches!(w, WriteResult::Written { .. }))
    }

    pub fn unchanged(&self) -> usize {
        self.count(|w| matches!(w, WriteResult::Unchanged { .. }))
    }

    pub fn would_write(&self) -> usize {
        self.count(|w| matches!(w, WriteResult::WouldWrite { .. }))
    }

    /// Written plus would-write.
    pub fn changed(&self) -> usize {
        self.count(WriteResult::is_change)
    }

    fn count(&self, pred: impl Fn(&WriteResult) -> bool) -> usize {
        self.writes.iter().filter(|w| pred(w)).count()
    }
}

/// A rendered page ready to be compared or written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PlannedPage {
    pub path: PathBuf,
    pub content: String,
}

/// Ids become file names, so anything that could leave the output directory
/// is refused.
fn is_safe_file_stem(id: &str) -> bool {
    !id.starts_with('.') && !id.contains(['/', '\\']) && !id.contains('\0')
}

/// Render every page the catalog describes. Duplicate ids collapse to the
/// last occurrence, keeping the position of the first.
pub(crate) fn plan_pages(
    ctx: &SyncContext<'_>,
    items: &[CatalogItem],
) -> Result<(Vec<PlannedPage>, usize), SyncError> {
    let default_brand = ctx.config.site.default_brand.as_str();
    let mut order: Vec<PageContext> = Vec::new();
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut skipped = 0;

    for (i, item) in items.iter().enumerate() {
        let Some(page) = PageContext::from_item(item, default_brand) else {
            tracing::debug!("catalog record {i} has no id; skipped");
            skipped += 1;
            continue;
        };
        if !is_safe_file_stem(&page.product_id) {
            tracing::warn!("catalog record {i} has unusable id '{}'; skipped", page.product_id);
            skipped += 1;
            continue;
        }
        match seen.get(&page.product_id) {
            Some(&slot) => {
                tracing::debug!("duplicate id {}; later record wins", page.product_id);
                order[slot] = page;
            }
            None => {
                seen.insert(page.product_id.clone(), order.len());
                order.push(page);
            }
        }
    }

    let out_dir = ctx.path(&ctx.config.pages.output_dir);
    let ext = ctx.config.pages.source_ext.as_str();
    let mut planned = Vec::with_capacity(order.len());
    for page in &order {
        planned.push(PlannedPage {
            path: out_dir.join(format!("{}.{ext}", page.product_id)),
            content: ctx.renderer.product_page(page)?,
        });
    }
    Ok((planned, skipped))
}

/// Render and write one page per catalog id.
pub fn materialize(
    ctx: &SyncContext<'_>,
    items: &[CatalogItem],
    dry_run: bool,
) -> Result<MaterializeReport, SyncError> {
    let (planned, skipped) = plan_pages(ctx, items)?;
    let mut report = MaterializeReport {
        writes: Vec::with_capacity(planned.len()),
        skipped,
    };
    for page in planned {
        report
            .writes
            .push(write_if_changed(ctx.store, &page.path, &page.content, dry_run)?);
    }
    tracing::info!(
        "pages: total={} changed={} skipped={}",
        report.writes.len(),
        report.changed(),
        report.skipped
    );
    Ok(report)
}
