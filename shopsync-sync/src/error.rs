//! Error types for shopsync-sync.

use std::path::PathBuf;

use thiserror::Error;

use shopsync_core::error::{ConfigurationError, LookupError};
use shopsync_renderer::RenderError;

/// All errors that can arise from a pipeline run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Catalog or site configuration is unusable.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A required directory or file has no existing candidate.
    #[error(transparent)]
    Lookup(#[from] LookupError),

    /// An error from the rendering engine.
    #[error("render error: {0}")]
    Render(#[from] RenderError),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
