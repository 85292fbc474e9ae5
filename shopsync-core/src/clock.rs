//! Injected time sources.
//!
//! - [`Clock`] — "now", used for fallback `lastmod` values and build stamps.
//! - [`TimestampProvider`] — a document's true last-modified time, normally
//!   from version-control history. Failures are recoverable; callers fall back
//!   to the clock.

use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::error::TimestampError;
use crate::store::Store;

/// Source of the current instant.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Source of per-document last-modified times.
pub trait TimestampProvider {
    /// `Ok(None)` when the document has no recorded history.
    fn last_modified(&self, path: &Path) -> Result<Option<DateTime<Utc>>, TimestampError>;
}

/// Provider with no history at all; every lookup yields `None`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl TimestampProvider for NoHistory {
    fn last_modified(&self, _path: &Path) -> Result<Option<DateTime<Utc>>, TimestampError> {
        Ok(None)
    }
}

/// Last commit time from `git log -1 --pretty=format:%cI -- <path>`.
#[derive(Debug, Clone)]
pub struct GitHistory {
    repo_root: PathBuf,
}

impl GitHistory {
    pub fn new(repo_root: impl Into<PathBuf>) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }

    /// True when `dir` lies anywhere inside a git work tree.
    pub fn is_work_tree(dir: &Path) -> bool {
        Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(["rev-parse", "--is-inside-work-tree"])
            .output()
            .map(|out| out.status.success() && out.stdout.trim_ascii() == b"true")
            .unwrap_or(false)
    }

    /// Pathspec for `path` as seen from inside `-C repo_root`.
    ///
    /// Callers pass paths joined onto the root; git resolves pathspecs
    /// against the `-C` directory, so the root prefix must go.
    fn pathspec<'p>(&self, path: &'p Path) -> &'p Path {
        path.strip_prefix(&self.repo_root).unwrap_or(path)
    }
}

impl TimestampProvider for GitHistory {
    fn last_modified(&self, path: &Path) -> Result<Option<DateTime<Utc>>, TimestampError> {
        let output = Command::new("git")
            .arg("-C")
            .arg(&self.repo_root)
            .args(["log", "-1", "--pretty=format:%cI", "--"])
            .arg(self.pathspec(path))
            .output()
            .map_err(|source| TimestampError::Spawn {
                program: "git",
                source,
            })?;

        if !output.status.success() {
            return Err(TimestampError::Command {
                path: path.to_path_buf(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_commit_time(stdout.trim())
    }
}

/// Modification time as reported by the [`Store`] listing.
///
/// Used when the site is not a git checkout.
pub struct StoreMtime<'a> {
    store: &'a dyn Store,
}

impl<'a> StoreMtime<'a> {
    pub fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }
}

impl TimestampProvider for StoreMtime<'_> {
    fn last_modified(&self, path: &Path) -> Result<Option<DateTime<Utc>>, TimestampError> {
        let Some(parent) = path.parent() else {
            return Ok(None);
        };
        let entries = self.store.list(parent).map_err(|source| TimestampError::Stat {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(entries
            .into_iter()
            .find(|e| e.path == path && !e.is_dir)
            .map(|e| DateTime::<Utc>::from(e.modified)))
    }
}

/// Parse `%cI` output. Empty means the path was never committed.
pub fn parse_commit_time(value: &str) -> Result<Option<DateTime<Utc>>, TimestampError> {
    if value.is_empty() {
        return Ok(None);
    }
    DateTime::parse_from_rfc3339(value)
        .map(|t| Some(t.with_timezone(&Utc)))
        .map_err(|source| TimestampError::Parse {
            value: value.to_string(),
            source,
        })
}

/// Sitemap-style timestamp: UTC, second precision, `Z` suffix.
pub fn format_w3c(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn commit_time_converts_offset_to_utc() {
        let parsed = parse_commit_time("2024-05-01T18:30:00+09:00").unwrap().unwrap();
        assert_eq!(format_w3c(parsed), "2024-05-01T09:30:00Z");
    }

    #[test]
    fn empty_commit_time_is_none() {
        assert!(parse_commit_time("").unwrap().is_none());
    }

    #[test]
    fn garbage_commit_time_is_parse_error() {
        let err = parse_commit_time("yesterday").unwrap_err();
        assert!(matches!(err, TimestampError::Parse { .. }));
    }

    #[test]
    fn format_w3c_drops_subseconds() {
        let t = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap()
            + chrono::Duration::milliseconds(678);
        assert_eq!(format_w3c(t), "2025-01-02T03:04:05Z");
    }

    #[test]
    fn fixed_clock_is_frozen() {
        let t = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
        let clock = FixedClock(t);
        assert_eq!(clock.now(), t);
        assert_eq!(clock.now(), t);
    }

    #[test]
    fn store_mtime_reads_listing() {
        use crate::store::MemoryStore;
        use std::time::{Duration, UNIX_EPOCH};

        let store = MemoryStore::new();
        store.seed("p/a.md", "a");
        store.set_modified(Path::new("p/a.md"), UNIX_EPOCH + Duration::from_secs(86_400));

        let provider = StoreMtime::new(&store);
        let t = provider.last_modified(Path::new("p/a.md")).unwrap().unwrap();
        assert_eq!(format_w3c(t), "1970-01-02T00:00:00Z");
        assert!(provider.last_modified(Path::new("p/b.md")).unwrap().is_none());
        assert!(provider.last_modified(Path::new("q/a.md")).is_err());
    }

    #[test]
    fn pathspec_is_relative_to_repo_root() {
        let history = GitHistory::new("site");
        assert_eq!(history.pathspec(Path::new("site/p/a.md")), Path::new("p/a.md"));
        assert_eq!(history.pathspec(Path::new("/elsewhere/a.md")), Path::new("/elsewhere/a.md"));

        let history = GitHistory::new(".");
        assert_eq!(history.pathspec(Path::new("./p/a.md")), Path::new("p/a.md"));
    }

    fn git_available() -> bool {
        Command::new("git").arg("--version").output().is_ok_and(|o| o.status.success())
    }

    fn git(dir: &Path, args: &[&str]) {
        let status = Command::new("git")
            .arg("-C")
            .arg(dir)
            .args(["-c", "user.name=shopsync", "-c", "user.email=shopsync@example.invalid"])
            .args(args)
            .env("GIT_AUTHOR_DATE", "2020-01-02T03:04:05Z")
            .env("GIT_COMMITTER_DATE", "2020-01-02T03:04:05Z")
            .status()
            .expect("run git");
        assert!(status.success(), "git {args:?} failed");
    }

    #[test]
    fn git_history_reads_commit_time_for_rooted_path() {
        if !git_available() {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let site = dir.path().join("site");
        std::fs::create_dir_all(site.join("p")).unwrap();
        std::fs::write(site.join("p/a.md"), "a").unwrap();
        git(&site, &["init", "-q"]);
        git(&site, &["add", "."]);
        git(&site, &["commit", "-q", "-m", "init"]);

        let history = GitHistory::new(&site);
        let t = history.last_modified(&site.join("p/a.md")).unwrap().unwrap();
        assert_eq!(format_w3c(t), "2020-01-02T03:04:05Z");
        assert!(history.last_modified(&site.join("p/new.md")).unwrap().is_none());
    }

    #[test]
    fn work_tree_detection_covers_subdirectories() {
        let plain = tempfile::tempdir().unwrap();
        assert!(!GitHistory::is_work_tree(plain.path()));
        if !git_available() {
            return;
        }

        let repo = tempfile::tempdir().unwrap();
        let nested = repo.path().join("site");
        std::fs::create_dir_all(&nested).unwrap();
        git(repo.path(), &["init", "-q"]);
        assert!(GitHistory::is_work_tree(repo.path()));
        assert!(GitHistory::is_work_tree(&nested));
    }

    #[test]
    fn no_history_yields_none() {
        assert!(NoHistory.last_modified(Path::new("p/a.md")).unwrap().is_none());
    }
}
