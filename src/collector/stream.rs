//! Bounded-concurrency file reading
//!
//! Reads run on a dedicated rayon pool whose size caps the number of reads
//! in flight. Finished records arrive over a bounded channel in completion
//! order, not discovery order.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{Receiver, sync_channel};

use crate::cancel::CancellationToken;
use crate::error::CollectError;
use crate::file::RawFile;
use crate::language::LanguageClassifier;

use super::FileSystem;

/// Lazy, finite, non-restartable sequence of discovered files.
///
/// The first read error is yielded once and ends the sequence; pending
/// reads are skipped. Dropping the stream or cancelling its token skips
/// pending reads too.
pub struct FileStream {
    receiver: Receiver<Result<RawFile, CollectError>>,
    cancel: CancellationToken,
    // Internal to this stream, so dropping it leaves the caller's token alone.
    stop: CancellationToken,
    total: usize,
    done: bool,
    // Keeps the reader threads alive for the stream's lifetime.
    _pool: Option<rayon::ThreadPool>,
}

impl FileStream {
    pub(crate) fn spawn(
        paths: Vec<PathBuf>,
        root: PathBuf,
        fs: Arc<dyn FileSystem>,
        classifier: LanguageClassifier,
        concurrency: usize,
        cancel: CancellationToken,
    ) -> Result<Self, CollectError> {
        let total = paths.len();
        let concurrency = concurrency.max(1);
        let (sender, receiver) = sync_channel(concurrency);
        let stop = CancellationToken::new();

        if paths.is_empty() {
            return Ok(Self {
                receiver,
                cancel,
                stop,
                total,
                done: false,
                _pool: None,
            });
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(concurrency.min(total))
            .thread_name(|i| format!("sourcedocs-read-{}", i))
            .build()?;

        let root = Arc::new(root);
        let classifier = Arc::new(classifier);
        for path in paths {
            let sender = sender.clone();
            let fs = Arc::clone(&fs);
            let root = Arc::clone(&root);
            let classifier = Arc::clone(&classifier);
            let cancel = cancel.clone();
            let stop = stop.clone();

            pool.spawn(move || {
                if cancel.is_cancelled() || stop.is_cancelled() {
                    return;
                }
                let result = match fs.read_to_string(&path) {
                    Ok(content) => Ok(RawFile::new(&path, &root, content, &classifier)),
                    Err(source) => Err(CollectError::Read { path, source }),
                };
                // The receiver is gone once the stream is dropped
                let _ = sender.send(result);
            });
        }

        Ok(Self {
            receiver,
            cancel,
            stop,
            total,
            done: false,
            _pool: Some(pool),
        })
    }

    /// Number of files matched by discovery.
    pub fn total(&self) -> usize {
        self.total
    }

    pub fn cancel_token(&self) -> &CancellationToken {
        &self.cancel
    }
}

impl Iterator for FileStream {
    type Item = Result<RawFile, CollectError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.cancel.is_cancelled() {
            self.done = true;
            return None;
        }

        match self.receiver.recv() {
            Ok(Ok(file)) if !self.cancel.is_cancelled() => Some(Ok(file)),
            Ok(Ok(_)) => {
                self.done = true;
                None
            }
            Ok(Err(err)) => {
                self.done = true;
                self.stop.cancel();
                Some(Err(err))
            }
            Err(_) => {
                self.done = true;
                None
            }
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            (0, Some(0))
        } else {
            (0, Some(self.total))
        }
    }
}

impl Drop for FileStream {
    fn drop(&mut self) {
        self.stop.cancel();
    }
}
