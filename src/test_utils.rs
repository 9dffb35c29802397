//! Test utilities: temporary source trees and an in-memory file system.
//!
//! This module is only compiled for tests, benchmarks and the `test-utils`
//! feature.

use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tempfile::TempDir;

use crate::collector::{FileSystem, MATCH_OPTIONS, compile_patterns, is_excluded};
use crate::error::GlobError;

/// A temporary directory of source files.
///
/// The directory is removed when dropped.
pub struct TestTree {
    dir: TempDir,
}

impl TestTree {
    /// Create a new empty temporary directory.
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        Self { dir }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Write a file, creating parent directories as needed.
    pub fn add_file(&self, path: &str, content: &str) -> PathBuf {
        let full_path = self.dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }

    /// Write raw bytes, e.g. invalid UTF-8.
    pub fn add_bytes(&self, path: &str, content: &[u8]) -> PathBuf {
        let full_path = self.dir.path().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).expect("Failed to create parent dirs");
        }
        fs::write(&full_path, content).expect("Failed to write file");
        full_path
    }
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory [`FileSystem`] keyed by absolute path.
///
/// Paths registered with [`MemoryFs::with_unreadable`] are matched by glob
/// but fail on read. An optional read delay makes concurrency observable.
#[derive(Default)]
pub struct MemoryFs {
    files: BTreeMap<PathBuf, Option<String>>,
    read_delay: Option<Duration>,
    reads: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MemoryFs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a file under `root`.
    pub fn with_file(mut self, path: impl AsRef<Path>, content: &str) -> Self {
        self.files
            .insert(path.as_ref().to_path_buf(), Some(content.to_string()));
        self
    }

    /// Add a path that is listed by glob but cannot be read.
    pub fn with_unreadable(mut self, path: impl AsRef<Path>) -> Self {
        self.files.insert(path.as_ref().to_path_buf(), None);
        self
    }

    pub fn with_read_delay(mut self, delay: Duration) -> Self {
        self.read_delay = Some(delay);
        self
    }

    /// Number of reads that started.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Highest number of reads observed in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl FileSystem for MemoryFs {
    fn glob(
        &self,
        root: &Path,
        include: &[String],
        exclude: &[String],
    ) -> Result<Vec<PathBuf>, GlobError> {
        let includes = compile_patterns(include)?;
        let excludes = compile_patterns(exclude)?;

        let matched: BTreeSet<PathBuf> = self
            .files
            .keys()
            .filter_map(|path| {
                let relative = path.strip_prefix(root).ok()?;
                let included = includes
                    .iter()
                    .any(|p| p.matches_path_with(relative, MATCH_OPTIONS));
                (included && !is_excluded(relative, &excludes)).then(|| path.clone())
            })
            .collect();

        Ok(matched.into_iter().collect())
    }

    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.read_delay {
            std::thread::sleep(delay);
        }
        let result = match self.files.get(path) {
            Some(Some(content)) => Ok(content.clone()),
            Some(None) => Err(io::Error::new(
                io::ErrorKind::PermissionDenied,
                "permission denied",
            )),
            None => Err(io::Error::new(io::ErrorKind::NotFound, "no such file")),
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_creates_nested_files() {
        let tree = TestTree::new();
        let path = tree.add_file("a/b/c.rs", "fn main() {}");
        assert!(path.exists());
        assert_eq!(fs::read_to_string(path).unwrap(), "fn main() {}");
    }

    #[test]
    fn test_memory_fs_glob_and_read() {
        let fs = MemoryFs::new()
            .with_file("/root/a.ts", "a")
            .with_file("/root/dir/b.ts", "b")
            .with_file("/root/node_modules/x.ts", "x")
            .with_file("/other/c.ts", "c");

        let paths = fs
            .glob(
                Path::new("/root"),
                &["**/*.ts".to_string()],
                &["**/node_modules/**".to_string()],
            )
            .unwrap();
        assert_eq!(
            paths,
            vec![PathBuf::from("/root/a.ts"), PathBuf::from("/root/dir/b.ts")]
        );
        assert_eq!(fs.read_to_string(Path::new("/root/a.ts")).unwrap(), "a");
        assert_eq!(fs.reads(), 1);
    }

    #[test]
    fn test_memory_fs_unreadable() {
        let fs = MemoryFs::new().with_unreadable("/root/secret.ts");
        let err = fs.read_to_string(Path::new("/root/secret.ts")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::PermissionDenied);
    }
}
