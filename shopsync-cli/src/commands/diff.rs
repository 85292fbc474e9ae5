//! `shopsync diff` — show unified diffs for what `pages` would write.

use anyhow::{Context, Result};

use shopsync_core::load_catalog;
use shopsync_sync::diff_pages;

use super::SiteArgs;

pub fn run(site: &SiteArgs) -> Result<()> {
    let diffs = site.with_context(|ctx| {
        let items = load_catalog(ctx.store, &ctx.path(&ctx.config.catalog.path))?;
        diff_pages(ctx, &items).context("diff failed")
    })?;

    if diffs.is_empty() {
        println!("No differences.");
        return Ok(());
    }

    for diff in diffs {
        print!("{}", diff.unified_diff);
        if !diff.unified_diff.ends_with('\n') {
            println!();
        }
    }
    Ok(())
}
