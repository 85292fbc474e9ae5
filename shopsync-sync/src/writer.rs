//! Content-gated writer.
//!
//! ## `write_if_changed` protocol
//!
//! 1. Normalise the rendered content to LF.
//! 2. Read the existing file (absent reads as nothing).
//! 3. Compare both sides trimmed; identical → `Unchanged`, no write.
//! 4. `dry_run` → `WouldWrite`, no write.
//! 5. Persist through [`Store::write`] (tmp + rename for [`FsStore`]).
//!
//! [`FsStore`]: shopsync_core::FsStore

use std::path::{Path, PathBuf};

use shopsync_core::store::{read_optional, Store};

use crate::error::{io_err, SyncError};

/// Outcome of an individual file write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteResult {
    /// File was written (content changed or did not previously exist).
    Written { path: PathBuf },
    /// File was skipped; on-disk content already matches.
    Unchanged { path: PathBuf },
    /// `--dry-run` mode: the file *would* have been written.
    WouldWrite { path: PathBuf },
}

impl WriteResult {
    pub fn path(&self) -> &Path {
        match self {
            WriteResult::Written { path }
            | WriteResult::Unchanged { path }
            | WriteResult::WouldWrite { path } => path,
        }
    }

    /// `true` for `Written` and `WouldWrite`.
    pub fn is_change(&self) -> bool {
        !matches!(self, WriteResult::Unchanged { .. })
    }
}

/// LF line endings, for comparison and for what lands on disk.
pub fn normalize_line_endings(content: &str) -> String {
    content.replace("\r\n", "\n")
}

/// `true` when `a` and `b` differ once trimmed and LF-normalised.
pub fn content_differs(a: &str, b: &str) -> bool {
    normalize_line_endings(a).trim() != normalize_line_endings(b).trim()
}

/// Write `content` to `path` only if it differs from what is stored there.
pub fn write_if_changed(
    store: &dyn Store,
    path: &Path,
    content: &str,
    dry_run: bool,
) -> Result<WriteResult, SyncError> {
    let content = normalize_line_endings(content);
    let existing = read_optional(store, path).map_err(|e| io_err(path, e))?;

    if let Some(existing) = existing {
        if !content_differs(&existing, &content) {
            tracing::debug!("unchanged: {}", path.display());
            return Ok(WriteResult::Unchanged {
                path: path.to_path_buf(),
            });
        }
    }

    if dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(WriteResult::WouldWrite {
            path: path.to_path_buf(),
        });
    }

    store.write(path, &content).map_err(|e| io_err(path, e))?;
    tracing::info!("wrote: {}", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
    })
}
