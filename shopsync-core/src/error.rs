//! Error types for shopsync-core.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal input errors: the catalog or site configuration cannot be used.
///
/// Any of these aborts the run before a single page is written.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// The catalog file did not exist at the expected path.
    #[error("catalog not found at {path}")]
    CatalogNotFound { path: PathBuf },

    /// The catalog is not valid JSON — includes path and line context from serde_json.
    #[error("failed to parse catalog at {path}: {source}")]
    CatalogParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The catalog parsed, but is not an array of objects.
    #[error("catalog at {path} has the wrong shape: {detail}")]
    CatalogShape { path: PathBuf, detail: String },

    /// `shopsync.yaml` exists but could not be parsed.
    #[error("failed to parse site config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The site config parsed but holds an unusable value.
    #[error("invalid site config: {0}")]
    Invalid(String),

    /// Underlying I/O failure while reading an input file.
    #[error("I/O error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// None of an ordered list of candidate locations exists.
#[derive(Debug, Error)]
pub struct LookupError {
    /// What was being looked for, e.g. `"pages directory"`.
    pub label: String,
    /// Every path tried, in priority order.
    pub candidates: Vec<PathBuf>,
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "no {} found; tried: ", self.label)?;
        if self.candidates.is_empty() {
            return write!(f, "(no candidates configured)");
        }
        for (i, path) in self.candidates.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", path.display())?;
        }
        Ok(())
    }
}

/// Failure to obtain a last-modified timestamp from history.
///
/// Always recoverable: callers fall back to the current time.
#[derive(Debug, Error)]
pub enum TimestampError {
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("history lookup for {path} exited with {status}: {stderr}")]
    Command {
        path: PathBuf,
        status: String,
        stderr: String,
    },

    #[error("cannot stat {path}: {source}")]
    Stat {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unparsable timestamp '{value}': {source}")]
    Parse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_error_lists_candidates_in_order() {
        let err = LookupError {
            label: "host document".to_string(),
            candidates: vec![PathBuf::from("site/index.html"), PathBuf::from("site/index.md")],
        };
        assert_eq!(
            err.to_string(),
            "no host document found; tried: site/index.html, site/index.md"
        );
    }

    #[test]
    fn lookup_error_without_candidates() {
        let err = LookupError {
            label: "pages directory".to_string(),
            candidates: vec![],
        };
        assert!(err.to_string().contains("no candidates configured"));
    }
}
