//! Dry-run unified diff support for `shopsync diff`.

use std::path::PathBuf;

use similar::TextDiff;

use shopsync_core::store::read_optional;
use shopsync_core::CatalogItem;

use crate::context::SyncContext;
use crate::error::{io_err, SyncError};
use crate::pages::plan_pages;
use crate::writer::{content_differs, normalize_line_endings};

/// A single rendered page diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDiff {
    pub path: PathBuf,
    pub unified_diff: String,
}

/// Render what `pages` would generate and compare it to the stored content.
///
/// Only pages the materializer would actually write are reported. No files
/// are written.
pub fn diff_pages(ctx: &SyncContext<'_>, items: &[CatalogItem]) -> Result<Vec<FileDiff>, SyncError> {
    let (planned, _skipped) = plan_pages(ctx, items)?;

    let mut diffs = Vec::new();
    for page in planned {
        let existing = read_optional(ctx.store, &page.path)
            .map_err(|e| io_err(&page.path, e))?
            .map(|s| normalize_line_endings(&s))
            .unwrap_or_default();
        let rendered = normalize_line_endings(&page.content);
        if !existing.is_empty() && !content_differs(&existing, &rendered) {
            continue;
        }

        let relative = page.path.strip_prefix(&ctx.root).unwrap_or(page.path.as_path());
        let old_header = format!("a/{}", relative.display());
        let new_header = format!("b/{}", relative.display());
        let unified = TextDiff::from_lines(&existing, &rendered)
            .unified_diff()
            .header(&old_header, &new_header)
            .context_radius(3)
            .to_string();

        diffs.push(FileDiff {
            path: page.path,
            unified_diff: unified,
        });
    }
    Ok(diffs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use shopsync_core::{FixedClock, MemoryStore, NoHistory, ProductId, SiteConfig};
    use std::path::Path;

    use crate::pages::materialize;

    fn item(price: &str) -> CatalogItem {
        CatalogItem {
            id: Some(ProductId::from("A1")),
            title: Some("Widget".to_string()),
            image_url: String::new(),
            description: String::new(),
            brand: None,
            price_number: price.to_string(),
            rating: None,
        }
    }

    fn with_ctx<T>(store: &MemoryStore, f: impl FnOnce(&SyncContext<'_>) -> T) -> T {
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        let ctx = SyncContext::new("", SiteConfig::default(), store, &clock, &NoHistory).unwrap();
        f(&ctx)
    }

    #[test]
    fn no_diffs_after_materialize() {
        let store = MemoryStore::new();
        let items = vec![item("10000")];
        with_ctx(&store, |ctx| materialize(ctx, &items, false).unwrap());
        let diffs = with_ctx(&store, |ctx| diff_pages(ctx, &items).unwrap());
        assert!(diffs.is_empty(), "materialized pages should have no diff");
    }

    #[test]
    fn changed_price_shows_in_diff_without_writing() {
        let store = MemoryStore::new();
        with_ctx(&store, |ctx| materialize(ctx, &[item("10000")], false).unwrap());
        let writes_before = store.writes();

        let diffs = with_ctx(&store, |ctx| diff_pages(ctx, &[item("9900")]).unwrap());
        assert_eq!(diffs.len(), 1);
        let diff = &diffs[0].unified_diff;
        assert!(diff.contains("--- a/p/A1.md"), "{diff}");
        assert!(diff.contains("+++ b/p/A1.md"), "{diff}");
        assert!(diff.contains("-price_number: \"10000\""), "{diff}");
        assert!(diff.contains("+price_number: \"9900\""), "{diff}");
        assert_eq!(store.writes(), writes_before);
    }

    #[test]
    fn new_page_diffs_against_empty() {
        let store = MemoryStore::new();
        let diffs = with_ctx(&store, |ctx| diff_pages(ctx, &[item("1")]).unwrap());
        assert_eq!(diffs.len(), 1);
        assert_eq!(diffs[0].path, Path::new("p/A1.md"));
        assert!(diffs[0].unified_diff.contains("+layout: product"));
    }
}
