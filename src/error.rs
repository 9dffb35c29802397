//! Error types for discovery, scanning and configuration

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure while resolving include/exclude patterns.
///
/// Aborts discovery entirely: no file records are produced.
#[derive(Error, Debug)]
pub enum GlobError {
    #[error("invalid glob pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("failed to scan '{}': {source}", .path.display())]
    Scan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Failure while discovering or reading source files.
#[derive(Error, Debug)]
pub enum CollectError {
    #[error(transparent)]
    Glob(#[from] GlobError),

    #[error("failed to read '{}': {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to start file readers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Failure while scanning a single file for directives.
#[derive(Error, Debug)]
pub enum ParseError {
    /// A directive's arguments did not fit the handler's declared shape.
    #[error("invalid arguments for @{command} at {}:{}: {source}", .path.display(), .line + 1)]
    ArgumentDecode {
        command: String,
        path: PathBuf,
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

/// Any failure surfaced by the end-to-end pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Collect(#[from] CollectError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("operation cancelled")]
    Cancelled,
}

/// Failure while loading or normalizing configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid config '{}': {source}", .path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("root directory '{}' does not exist", .0.display())]
    InvalidRoot(PathBuf),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_error_message_names_path() {
        let err = CollectError::Read {
            path: PathBuf::from("/tmp/missing.ts"),
            source: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(err.to_string(), "failed to read '/tmp/missing.ts': not found");
    }

    #[test]
    fn test_argument_decode_message_is_one_indexed() {
        let source = serde_json::from_str::<u32>("\"x\"").unwrap_err();
        let err = ParseError::ArgumentDecode {
            command: "snippet".to_string(),
            path: PathBuf::from("/src/a.ts"),
            line: 0,
            source,
        };
        assert!(err.to_string().starts_with("invalid arguments for @snippet at /src/a.ts:1:"));
    }

    #[test]
    fn test_glob_error_is_transparent_in_collect_error() {
        let pattern_err = glob::Pattern::new("[").unwrap_err();
        let err: CollectError = GlobError::Pattern {
            pattern: "[".to_string(),
            source: pattern_err,
        }
        .into();
        assert!(err.to_string().starts_with("invalid glob pattern '['"));
    }
}
