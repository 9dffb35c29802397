//! Source file discovery
//!
//! The [`Collector`] resolves the configured include/exclude globs against
//! the project root and reads every match into a [`RawFile`] record.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use sourcedocs::{Collector, Config, LocalFs};
//!
//! let config = Config::default().with_include(["src/**/*.rs"]);
//! let collector = Collector::new(&config, Arc::new(LocalFs));
//! for file in collector.discover_files()? {
//!     println!("{}", file?.relative_path.display());
//! }
//! # Ok::<(), sourcedocs::CollectError>(())
//! ```
//!
//! [`RawFile`]: crate::file::RawFile

mod fs;
mod stream;

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use crate::cancel::CancellationToken;
use crate::config::Config;
use crate::error::{CollectError, GlobError};
use crate::language::LanguageClassifier;

pub use fs::{FileSystem, LocalFs, MATCH_OPTIONS, compile_patterns, is_excluded};
pub use stream::FileStream;

/// Upper bound on file reads in flight at once.
pub const MAX_CONCURRENT_READS: usize = 20;

pub struct Collector {
    root: PathBuf,
    include: Vec<String>,
    exclude: Vec<String>,
    classifier: LanguageClassifier,
    fs: Arc<dyn FileSystem>,
    concurrency: usize,
    cancel: Option<CancellationToken>,
}

impl Collector {
    /// Build a collector for `config`. A relative root is resolved against
    /// the current working directory; `.` components are dropped.
    pub fn new(config: &Config, fs: Arc<dyn FileSystem>) -> Self {
        let root = if config.root.is_absolute() {
            config.root.clone()
        } else {
            std::env::current_dir()
                .map(|cwd| cwd.join(&config.root))
                .unwrap_or_else(|_| config.root.clone())
        };

        Self {
            root: without_cur_dir(&root),
            include: config.include.clone(),
            exclude: config.exclude.clone(),
            classifier: LanguageClassifier::new(&config.parsing.language_map),
            fs,
            concurrency: MAX_CONCURRENT_READS,
            cancel: None,
        }
    }

    /// Limit reads in flight; clamped to `1..=MAX_CONCURRENT_READS`.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, MAX_CONCURRENT_READS);
        self
    }

    /// Observe `token` in every stream this collector produces.
    pub fn with_cancel_token(mut self, token: CancellationToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Matching paths without reading them.
    pub fn discover_paths(&self) -> Result<Vec<PathBuf>, GlobError> {
        self.fs.glob(&self.root, &self.include, &self.exclude)
    }

    /// Resolve the globs and start reading matches.
    ///
    /// Glob failures abort before any record is produced. Read failures
    /// arrive as an `Err` item that ends the stream.
    pub fn discover_files(&self) -> Result<FileStream, CollectError> {
        let paths = self.discover_paths()?;
        log::info!(
            "Discovered {} file(s) under {}",
            paths.len(),
            self.root.display()
        );

        FileStream::spawn(
            paths,
            self.root.clone(),
            Arc::clone(&self.fs),
            self.classifier.clone(),
            self.concurrency,
            self.cancel.clone().unwrap_or_default(),
        )
    }
}

fn without_cur_dir(path: &Path) -> PathBuf {
    path.components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect()
}
