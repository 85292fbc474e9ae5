//! Error types for shopsync-renderer.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from template loading and rendering.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Tera template engine error (syntax or render-time).
    #[error("template engine error: {0}")]
    Tera(#[from] tera::Error),

    /// Filesystem error while loading user templates.
    #[error("template io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A user template does not correspond to any embedded template, so it
    /// would never be rendered.
    #[error("unknown template override '{name}' in {dir}; expected one of: {expected}")]
    UnknownOverride {
        name: String,
        dir: PathBuf,
        expected: String,
    },
}
