//! Corpus → paginated sitemap, index, and discovery registration.
//!
//! ## Layout
//!
//! | Entries (hub included) | Chunk files                         |
//! |------------------------|-------------------------------------|
//! | `N <= chunk_size`      | `sitemap.xml`                       |
//! | `N > chunk_size`       | `sitemap-1.xml` … `sitemap-k.xml`   |
//!
//! `k = ceil(N / chunk_size)`. `sitemap_index.xml` lists exactly those files
//! in order. Chunk files from earlier, larger runs are removed.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use shopsync_core::clock::format_w3c;
use shopsync_core::store::read_optional;
use shopsync_core::Store;
use shopsync_renderer::{IndexContext, UrlCtx, UrlsetContext};

use crate::context::SyncContext;
use crate::corpus::{scan, CorpusDocument};
use crate::error::{io_err, SyncError};
use crate::writer::{write_if_changed, WriteResult};

const HUB_CHANGEFREQ: &str = "hourly";
const HUB_PRIORITY: &str = "1.0";
const PAGE_CHANGEFREQ: &str = "daily";
const PAGE_PRIORITY: &str = "0.8";

/// `robots.txt` used when the site has none yet.
pub const DEFAULT_ROBOTS: &str = "User-agent: *\nAllow: /\n";

static CHUNK_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^sitemap(?:-\d+)?\.xml$").expect("valid regex"));

/// What the discovery registrar did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotsOutcome {
    Registered,
    AlreadyPresent,
}

/// Outcome of one sitemap run.
#[derive(Debug)]
pub struct SitemapReport {
    pub pages_dir: PathBuf,
    /// URL entries, hub included.
    pub entries: usize,
    pub chunks: Vec<WriteResult>,
    pub index: WriteResult,
    pub pruned: Vec<PathBuf>,
    pub robots: RobotsOutcome,
}

/// Chunk file names for `count` chunks.
pub fn chunk_file_names(count: usize) -> Vec<String> {
    if count <= 1 {
        vec!["sitemap.xml".to_string()]
    } else {
        (1..=count).map(|i| format!("sitemap-{i}.xml")).collect()
    }
}

/// `<site_url>/<prefix>/<path>`, skipping an empty prefix.
fn page_url(site_url: &str, prefix: &str, path: &str) -> String {
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() {
        format!("{site_url}/{path}")
    } else {
        format!("{site_url}/{prefix}/{path}")
    }
}

fn lastmod_for(ctx: &SyncContext<'_>, doc: &CorpusDocument, now: DateTime<Utc>) -> DateTime<Utc> {
    match ctx.history.last_modified(&doc.path) {
        Ok(Some(t)) => t,
        Ok(None) => now,
        Err(err) => {
            tracing::warn!("no history for {}: {err}; using current time", doc.path.display());
            now
        }
    }
}

/// Regenerate the sitemap chunks and index from the pages corpus, prune stale
/// chunks, and register the index in `robots.txt`.
pub fn build_sitemaps(ctx: &SyncContext<'_>) -> Result<SitemapReport, SyncError> {
    let pages = &ctx.config.pages;
    let pages_dir = ctx.config.page_dirs().rooted_at(&ctx.root).resolve(ctx.store)?;
    let docs = scan(ctx.store, &pages_dir, &pages.source_ext, pages.recursive)?;

    let now = ctx.clock.now();
    let site_url = ctx.config.site.site_url();

    let mut dated: Vec<(DateTime<Utc>, String)> = docs
        .iter()
        .map(|doc| {
            let loc = page_url(&site_url, &pages.url_prefix, &doc.url_path(&pages.public_ext));
            (lastmod_for(ctx, doc, now), loc)
        })
        .collect();
    if pages.sort_by_lastmod {
        dated.sort_by(|a, b| b.0.cmp(&a.0));
    }

    let mut entries = Vec::with_capacity(dated.len() + 1);
    entries.push(UrlCtx::new(
        &format!("{site_url}/"),
        format_w3c(now),
        HUB_CHANGEFREQ,
        HUB_PRIORITY,
    ));
    entries.extend(
        dated
            .into_iter()
            .map(|(t, loc)| UrlCtx::new(&loc, format_w3c(t), PAGE_CHANGEFREQ, PAGE_PRIORITY)),
    );

    let out_dir = ctx.path(&pages.sitemap_dir);
    let total = entries.len();
    let groups: Vec<Vec<UrlCtx>> = entries
        .chunks(pages.chunk_size.max(1))
        .map(<[UrlCtx]>::to_vec)
        .collect();
    let names = chunk_file_names(groups.len());

    let mut chunks = Vec::with_capacity(groups.len());
    for (name, group) in names.iter().zip(groups) {
        let xml = ctx.renderer.urlset(&UrlsetContext { entries: group })?;
        chunks.push(write_if_changed(ctx.store, &out_dir.join(name), &xml, false)?);
    }

    let chunk_urls: Vec<String> = names.iter().map(|n| format!("{site_url}/{n}")).collect();
    let index_xml = ctx
        .renderer
        .sitemap_index(&IndexContext::new(format_w3c(now), &chunk_urls))?;
    let index = write_if_changed(ctx.store, &out_dir.join(&pages.index_name), &index_xml, false)?;

    let pruned = prune_stale_chunks(ctx.store, &out_dir, &names)?;

    let index_url = format!("{site_url}/{}", pages.index_name);
    let robots = register_sitemap(ctx.store, &out_dir.join(&pages.robots_name), &index_url)?;

    tracing::info!(
        "sitemap: {} document(s), {total} entries, {} chunk(s)",
        docs.len(),
        names.len()
    );
    Ok(SitemapReport {
        pages_dir,
        entries: total,
        chunks,
        index,
        pruned,
        robots,
    })
}

/// Remove `sitemap.xml` / `sitemap-<n>.xml` files in `dir` not named in `keep`.
fn prune_stale_chunks(
    store: &dyn Store,
    dir: &Path,
    keep: &[String],
) -> Result<Vec<PathBuf>, SyncError> {
    if !store.is_dir(dir) {
        return Ok(Vec::new());
    }
    let mut pruned = Vec::new();
    for entry in store.list(dir).map_err(|e| io_err(dir, e))? {
        if entry.is_dir || !CHUNK_NAME_RE.is_match(&entry.name) || keep.contains(&entry.name) {
            continue;
        }
        store.remove(&entry.path).map_err(|e| io_err(&entry.path, e))?;
        tracing::info!("removed stale sitemap chunk: {}", entry.path.display());
        pruned.push(entry.path);
    }
    Ok(pruned)
}

/// Ensure `robots_path` carries `Sitemap: <index_url>` exactly once.
///
/// An absent file starts from [`DEFAULT_ROBOTS`].
pub fn register_sitemap(
    store: &dyn Store,
    robots_path: &Path,
    index_url: &str,
) -> Result<RobotsOutcome, SyncError> {
    let directive = format!("Sitemap: {index_url}");
    let current = read_optional(store, robots_path)
        .map_err(|e| io_err(robots_path, e))?
        .unwrap_or_else(|| DEFAULT_ROBOTS.to_string());

    if current.lines().any(|line| line.trim() == directive) {
        tracing::debug!("{} already lists {index_url}", robots_path.display());
        return Ok(RobotsOutcome::AlreadyPresent);
    }

    let updated = format!("{}\n{directive}\n", current.trim());
    write_if_changed(store, robots_path, &updated, false)?;
    Ok(RobotsOutcome::Registered)
}
