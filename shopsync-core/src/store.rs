//! Store interface over the site file tree.
//!
//! Every pipeline reads, stats, and writes through [`Store`], so the same code
//! runs against disk ([`FsStore`]) or against an in-memory tree
//! ([`MemoryStore`]) in tests.
//!
//! ## `FsStore::write` — atomic protocol
//!
//! 1. Ensure the parent directory exists.
//! 2. Write to `<path>.shopsync.tmp`.
//! 3. Rename to the final path (atomic on POSIX).
//! 4. On rename failure, remove the tmp file and report the error.

use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{self, ErrorKind};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Immutable listing entry: one child of a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub modified: SystemTime,
    pub is_dir: bool,
}

/// Read / write / list access to the durable file tree.
pub trait Store {
    /// Read a UTF-8 file. Absent files fail with [`ErrorKind::NotFound`].
    fn read_to_string(&self, path: &Path) -> io::Result<String>;

    /// Replace the file at `path`, creating parent directories as needed.
    fn write(&self, path: &Path, contents: &str) -> io::Result<()>;

    /// Delete a file.
    fn remove(&self, path: &Path) -> io::Result<()>;

    /// `true` if a file or directory exists at `path`.
    fn exists(&self, path: &Path) -> bool;

    /// `true` if a directory exists at `path`.
    fn is_dir(&self, path: &Path) -> bool;

    /// Immediate children of `dir`, sorted by name.
    fn list(&self, dir: &Path) -> io::Result<Vec<FileEntry>>;
}

/// Read a file, mapping "not found" to `None`.
pub fn read_optional(store: &dyn Store, path: &Path) -> io::Result<Option<String>> {
    match store.read_to_string(path) {
        Ok(contents) => Ok(Some(contents)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

// ---------------------------------------------------------------------------
// FsStore
// ---------------------------------------------------------------------------

/// [`Store`] backed by the real filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsStore;

impl FsStore {
    fn write_with_tmp(path: &Path, contents: &str, tmp: &Path) -> io::Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(tmp, contents)?;
        if let Err(e) = std::fs::rename(tmp, path) {
            let _ = std::fs::remove_file(tmp);
            return Err(e);
        }
        Ok(())
    }
}

impl Store for FsStore {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let tmp = PathBuf::from(format!("{}.shopsync.tmp", path.display()));
        Self::write_with_tmp(path, contents, &tmp)
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        std::fs::remove_file(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<FileEntry>> {
        let mut entries = Vec::new();
        for entry in std::fs::read_dir(dir)? {
            let entry = entry?;
            let meta = entry.metadata()?;
            entries.push(FileEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path: entry.path(),
                modified: meta.modified()?,
                is_dir: meta.is_dir(),
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

// ---------------------------------------------------------------------------
// MemoryStore
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct MemFile {
    contents: String,
    modified: SystemTime,
}

#[derive(Debug, Default)]
struct MemTree {
    files: BTreeMap<PathBuf, MemFile>,
    dirs: BTreeSet<PathBuf>,
    tick: u64,
    writes: usize,
}

impl MemTree {
    fn next_mtime(&mut self) -> SystemTime {
        self.tick += 1;
        UNIX_EPOCH + Duration::from_secs(1_700_000_000 + self.tick)
    }

    fn add_ancestors(&mut self, path: &Path) {
        let mut current = path.parent();
        while let Some(dir) = current {
            if dir.as_os_str().is_empty() {
                break;
            }
            self.dirs.insert(dir.to_path_buf());
            current = dir.parent();
        }
    }
}

/// In-memory [`Store`] for tests.
///
/// Every write advances a logical clock by one second, so modification order
/// is deterministic. [`MemoryStore::writes`] counts mutations for idempotence
/// assertions.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tree: RefCell<MemTree>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty directory (and its ancestors).
    pub fn create_dir(&self, path: impl Into<PathBuf>) {
        let path = path.into();
        let mut tree = self.tree.borrow_mut();
        tree.add_ancestors(&path);
        tree.dirs.insert(path);
    }

    /// Insert a file without counting it as a write.
    pub fn seed(&self, path: impl Into<PathBuf>, contents: &str) {
        let path = path.into();
        let mut tree = self.tree.borrow_mut();
        let modified = tree.next_mtime();
        tree.add_ancestors(&path);
        tree.files.insert(
            path,
            MemFile {
                contents: contents.to_string(),
                modified,
            },
        );
    }

    /// Override a file's modification time.
    pub fn set_modified(&self, path: &Path, modified: SystemTime) {
        if let Some(file) = self.tree.borrow_mut().files.get_mut(path) {
            file.modified = modified;
        }
    }

    /// Number of `write` and `remove` calls that reached the store.
    pub fn writes(&self) -> usize {
        self.tree.borrow().writes
    }

    /// Contents of a file, if present.
    pub fn get(&self, path: &Path) -> Option<String> {
        self.tree.borrow().files.get(path).map(|f| f.contents.clone())
    }

    /// All file paths, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.tree.borrow().files.keys().cloned().collect()
    }
}

fn not_found(path: &Path) -> io::Error {
    io::Error::new(
        ErrorKind::NotFound,
        format!("{} does not exist", path.display()),
    )
}

impl Store for MemoryStore {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.get(path).ok_or_else(|| not_found(path))
    }

    fn write(&self, path: &Path, contents: &str) -> io::Result<()> {
        let mut tree = self.tree.borrow_mut();
        if tree.dirs.contains(path) {
            return Err(io::Error::new(
                ErrorKind::Other,
                format!("{} is a directory", path.display()),
            ));
        }
        let modified = tree.next_mtime();
        tree.add_ancestors(path);
        tree.files.insert(
            path.to_path_buf(),
            MemFile {
                contents: contents.to_string(),
                modified,
            },
        );
        tree.writes += 1;
        Ok(())
    }

    fn remove(&self, path: &Path) -> io::Result<()> {
        let mut tree = self.tree.borrow_mut();
        tree.files.remove(path).ok_or_else(|| not_found(path))?;
        tree.writes += 1;
        Ok(())
    }

    fn exists(&self, path: &Path) -> bool {
        let tree = self.tree.borrow();
        tree.files.contains_key(path) || tree.dirs.contains(path)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.tree.borrow().dirs.contains(path)
    }

    fn list(&self, dir: &Path) -> io::Result<Vec<FileEntry>> {
        let tree = self.tree.borrow();
        if !tree.dirs.contains(dir) {
            return Err(not_found(dir));
        }
        let name_of = |p: &Path| {
            p.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        };

        let mut entries: Vec<FileEntry> = tree
            .files
            .iter()
            .filter(|(path, _)| path.parent() == Some(dir))
            .map(|(path, file)| FileEntry {
                name: name_of(path),
                path: path.clone(),
                modified: file.modified,
                is_dir: false,
            })
            .collect();
        entries.extend(
            tree.dirs
                .iter()
                .filter(|path| path.parent() == Some(dir))
                .map(|path| FileEntry {
                    name: name_of(path),
                    path: path.clone(),
                    modified: UNIX_EPOCH,
                    is_dir: true,
                }),
        );
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
