//! Corpus scanning: the documents that actually exist on disk.
//!
//! Both the sitemap and the recency widget are derived from a fresh scan on
//! every run, never from remembered state.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use shopsync_core::Store;

use crate::error::{io_err, SyncError};

/// One document found under a corpus directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusDocument {
    /// File name including extension.
    pub name: String,
    pub path: PathBuf,
    /// Path relative to the scanned directory.
    pub relative: PathBuf,
    pub modified: SystemTime,
}

impl CorpusDocument {
    /// File name without its extension.
    pub fn stem(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.name)
    }

    /// Relative path with `/` separators and the extension swapped for `ext`.
    pub fn url_path(&self, ext: &str) -> String {
        let swapped = self.relative.with_extension(ext);
        swapped
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

fn has_extension(name: &str, ext: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext.trim_start_matches('.')))
}

/// Every `*.<ext>` file under `dir`, sorted by relative path.
///
/// Extension matching ignores case. Dot-prefixed entries are skipped.
/// Subdirectories are descended only when `recursive` is set.
pub fn scan(
    store: &dyn Store,
    dir: &Path,
    ext: &str,
    recursive: bool,
) -> Result<Vec<CorpusDocument>, SyncError> {
    let mut docs = Vec::new();
    scan_into(store, dir, Path::new(""), ext, recursive, &mut docs)?;
    docs.sort_by(|a, b| a.relative.cmp(&b.relative));
    tracing::debug!("scanned {}: {} *.{ext} document(s)", dir.display(), docs.len());
    Ok(docs)
}

fn scan_into(
    store: &dyn Store,
    dir: &Path,
    prefix: &Path,
    ext: &str,
    recursive: bool,
    out: &mut Vec<CorpusDocument>,
) -> Result<(), SyncError> {
    for entry in store.list(dir).map_err(|e| io_err(dir, e))? {
        if entry.name.starts_with('.') {
            continue;
        }
        let relative = prefix.join(&entry.name);
        if entry.is_dir {
            if recursive {
                scan_into(store, &entry.path, &relative, ext, recursive, out)?;
            }
        } else if has_extension(&entry.name, ext) {
            out.push(CorpusDocument {
                name: entry.name,
                path: entry.path,
                relative,
                modified: entry.modified,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopsync_core::MemoryStore;

    fn corpus() -> MemoryStore {
        let store = MemoryStore::new();
        store.seed("p/b.md", "b");
        store.seed("p/A.MD", "a");
        store.seed("p/.draft.md", "hidden");
        store.seed("p/notes.txt", "not a page");
        store.seed("p/sub/c.md", "c");
        store.seed("p/.git/x.md", "hidden dir");
        store
    }

    #[test]
    fn flat_scan_matches_extension_case_insensitively() {
        let docs = scan(&corpus(), Path::new("p"), "md", false).unwrap();
        let names: Vec<_> = docs.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["A.MD", "b.md"]);
    }

    #[test]
    fn recursive_scan_descends_but_skips_hidden() {
        let docs = scan(&corpus(), Path::new("p"), ".md", true).unwrap();
        let rel: Vec<_> = docs.iter().map(|d| d.url_path("html")).collect();
        assert_eq!(rel, vec!["A.html", "b.html", "sub/c.html"]);
    }

    #[test]
    fn missing_directory_is_io_error() {
        let err = scan(&MemoryStore::new(), Path::new("nope"), "md", false).unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
    }

    #[test]
    fn stem_drops_extension() {
        let docs = scan(&corpus(), Path::new("p"), "md", false).unwrap();
        assert_eq!(docs[1].stem(), "b");
    }
}
