//! Ordered candidate lists with a "first existing wins" resolver.
//!
//! Site layouts differ between deployments (`yourshop/p` vs `p`,
//! `index.html` vs `index.md`), so every location the pipelines depend on is
//! configured as a list. Order is significant: a later candidate is never
//! chosen while an earlier one exists.

use std::path::{Path, PathBuf};

use crate::error::LookupError;
use crate::store::Store;

/// What a candidate path must be to count as existing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateKind {
    Directory,
    File,
}

/// A labelled, ordered list of candidate paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidates {
    label: String,
    kind: CandidateKind,
    paths: Vec<PathBuf>,
}

impl Candidates {
    /// Candidates that must be directories.
    pub fn directories(label: impl Into<String>, paths: Vec<PathBuf>) -> Self {
        Self {
            label: label.into(),
            kind: CandidateKind::Directory,
            paths,
        }
    }

    /// Candidates that must be regular files.
    pub fn files(label: impl Into<String>, paths: Vec<PathBuf>) -> Self {
        Self {
            label: label.into(),
            kind: CandidateKind::File,
            paths,
        }
    }

    /// Join every candidate onto `root`. Absolute candidates are kept as-is.
    pub fn rooted_at(mut self, root: &Path) -> Self {
        self.paths = self.paths.iter().map(|p| root.join(p)).collect();
        self
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Return the first candidate that exists with the right kind.
    pub fn resolve(&self, store: &dyn Store) -> Result<PathBuf, LookupError> {
        let found = self.paths.iter().find(|path| match self.kind {
            CandidateKind::Directory => store.is_dir(path),
            CandidateKind::File => store.exists(path) && !store.is_dir(path),
        });
        match found {
            Some(path) => {
                tracing::debug!("resolved {}: {}", self.label, path.display());
                Ok(path.clone())
            }
            None => Err(LookupError {
                label: self.label.clone(),
                candidates: self.paths.clone(),
            }),
        }
    }
}
