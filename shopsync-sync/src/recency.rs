//! Recency selection and the recent-updates fragment.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use shopsync_core::Store;
use shopsync_renderer::RecentContext;

use crate::context::SyncContext;
use crate::corpus::{scan, CorpusDocument};
use crate::error::SyncError;
use crate::writer::{write_if_changed, WriteResult};

/// Longest title shown in the widget, in characters.
pub const MAX_TITLE_CHARS: usize = 80;

static TITLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("valid regex"));
static H1_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").expect("valid regex"));
static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// One line of the widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentItem {
    pub href: String,
    pub title: String,
    pub path: PathBuf,
}

/// Outcome of building the fragment.
#[derive(Debug)]
pub struct FragmentReport {
    pub corpus_dir: PathBuf,
    pub items: Vec<RecentItem>,
    pub write: WriteResult,
}

/// The `limit` most recently modified `*.<ext>` files directly under `dir`:
/// newest first, ties broken by name.
pub fn select_recent(
    store: &dyn Store,
    dir: &Path,
    ext: &str,
    limit: usize,
) -> Result<Vec<CorpusDocument>, SyncError> {
    let mut docs = scan(store, dir, ext, false)?;
    docs.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| a.name.cmp(&b.name)));
    docs.truncate(limit);
    Ok(docs)
}

fn first_capture(re: &Regex, markup: &str) -> Option<String> {
    re.captures(markup)
        .and_then(|caps| caps.get(1))
        .map(|m| sanitize_title(&TAG_RE.replace_all(m.as_str(), "")))
        .filter(|t| !t.is_empty())
}

/// `<title>`, else the first `<h1>` with inner tags stripped, else `stem`.
pub fn extract_title(markup: &str, stem: &str) -> String {
    first_capture(&TITLE_RE, markup)
        .or_else(|| first_capture(&H1_RE, markup))
        .unwrap_or_else(|| sanitize_title(stem))
}

/// Strip control characters and angle brackets, collapse whitespace, and cap
/// the length at [`MAX_TITLE_CHARS`].
pub fn sanitize_title(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .filter(|c| *c != '<' && *c != '>')
        .collect();
    cleaned
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .chars()
        .take(MAX_TITLE_CHARS)
        .collect::<String>()
        .trim_end()
        .to_string()
}

fn title_of(store: &dyn Store, doc: &CorpusDocument) -> String {
    match store.read_to_string(&doc.path) {
        Ok(markup) => extract_title(&markup, doc.stem()),
        Err(err) => {
            tracing::warn!("cannot read {}: {err}; using file name", doc.path.display());
            sanitize_title(doc.stem())
        }
    }
}

/// Select the newest published documents, render the fragment, and write it to
/// the configured intermediate path.
pub fn build_fragment(ctx: &SyncContext<'_>) -> Result<FragmentReport, SyncError> {
    let recent = &ctx.config.recent;
    let corpus_dir = ctx.config.recent_dirs().rooted_at(&ctx.root).resolve(ctx.store)?;
    let docs = select_recent(ctx.store, &corpus_dir, &recent.ext, recent.limit)?;
    if docs.is_empty() {
        tracing::warn!(
            "no *.{} documents under {}; fragment will be empty",
            recent.ext,
            corpus_dir.display()
        );
    }

    let mut fragment = RecentContext::new(&recent.marker, &recent.heading);
    let mut items = Vec::with_capacity(docs.len());
    for doc in docs {
        let item = RecentItem {
            href: format!("{}{}", recent.public_prefix, doc.name),
            title: title_of(ctx.store, &doc),
            path: doc.path,
        };
        fragment.push(&item.href, &item.title);
        items.push(item);
    }

    let html = ctx.renderer.recent_updates(&fragment)?;
    let out = ctx.path(&recent.fragment_path);
    let write = write_if_changed(ctx.store, &out, &html, false)?;
    tracing::info!("today: {} item(s) from {}", items.len(), corpus_dir.display());
    Ok(FragmentReport {
        corpus_dir,
        items,
        write,
    })
}
