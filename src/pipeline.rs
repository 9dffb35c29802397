//! End-to-end extraction: discover, read, scan
//!
//! Files are scanned one at a time as reads complete. A file's nodes are
//! released only once its scan finished, so an aborted or cancelled file
//! never contributes a partial set.

use std::collections::VecDeque;
use std::sync::Arc;

use rayon::prelude::*;

use crate::cancel::CancellationToken;
use crate::collector::{Collector, FileStream, FileSystem};
use crate::config::Config;
use crate::engine::DirectiveEngine;
use crate::error::{CollectError, PipelineError};
use crate::file::RawFile;
use crate::node::DocNode;
use crate::plugin::CommandMap;

pub struct Pipeline {
    engine: DirectiveEngine,
    fs: Arc<dyn FileSystem>,
    cancel: CancellationToken,
}

impl Pipeline {
    pub fn new(config: Config, commands: CommandMap, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            engine: DirectiveEngine::new(Arc::new(config), commands),
            fs,
            cancel: CancellationToken::new(),
        }
    }

    /// Token shared by every run of this pipeline. Cancelling it stops
    /// pending reads and ends node sequences at the next file boundary.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn engine(&self) -> &DirectiveEngine {
        &self.engine
    }

    fn collector(&self) -> Collector {
        Collector::new(self.engine.config(), Arc::clone(&self.fs))
            .with_cancel_token(self.cancel.clone())
    }

    /// Lazy node sequence. Discovery starts on the first poll; the first
    /// error is yielded once and ends the sequence.
    pub fn nodes(&self) -> PipelineNodes {
        PipelineNodes {
            engine: self.engine.clone(),
            collector: Some(self.collector()),
            stream: None,
            pending: VecDeque::new(),
            cancel: self.cancel.clone(),
            done: false,
        }
    }

    /// Run to completion, returning every node or the first error.
    pub fn collect_nodes(&self) -> Result<Vec<DocNode>, PipelineError> {
        self.nodes().collect()
    }

    /// Read every file, then scan them concurrently on `jobs` threads.
    ///
    /// Files are returned in read-completion order, each file's nodes in
    /// line order. Any error discards all nodes.
    pub fn scan_parallel(&self, jobs: usize) -> Result<Vec<DocNode>, PipelineError> {
        let files = self
            .collector()
            .discover_files()?
            .collect::<Result<Vec<RawFile>, CollectError>>()?;
        if self.cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs.max(1))
            .thread_name(|i| format!("sourcedocs-scan-{}", i))
            .build()
            .map_err(CollectError::from)?;

        let engine = &self.engine;
        let cancel = &self.cancel;
        let per_file = pool.install(|| {
            files
                .into_par_iter()
                .map(|file| {
                    if cancel.is_cancelled() {
                        return Err(PipelineError::Cancelled);
                    }
                    engine.parse_all(file).map_err(PipelineError::from)
                })
                .collect::<Result<Vec<Vec<DocNode>>, PipelineError>>()
        })?;

        if self.cancel.is_cancelled() {
            return Err(PipelineError::Cancelled);
        }
        Ok(per_file.into_iter().flatten().collect())
    }
}

/// Node sequence returned by [`Pipeline::nodes`].
pub struct PipelineNodes {
    engine: DirectiveEngine,
    collector: Option<Collector>,
    stream: Option<FileStream>,
    pending: VecDeque<DocNode>,
    cancel: CancellationToken,
    done: bool,
}

impl PipelineNodes {
    fn fail(&mut self, err: PipelineError) -> Option<Result<DocNode, PipelineError>> {
        self.done = true;
        self.stream = None;
        self.pending.clear();
        Some(Err(err))
    }
}

impl Iterator for PipelineNodes {
    type Item = Result<DocNode, PipelineError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.done {
                return None;
            }
            if let Some(node) = self.pending.pop_front() {
                return Some(Ok(node));
            }
            if self.cancel.is_cancelled() {
                return self.fail(PipelineError::Cancelled);
            }

            if let Some(collector) = self.collector.take() {
                match collector.discover_files() {
                    Ok(stream) => self.stream = Some(stream),
                    Err(e) => return self.fail(e.into()),
                }
            }
            let Some(stream) = self.stream.as_mut() else {
                self.done = true;
                return None;
            };

            let file = match stream.next() {
                Some(Ok(file)) => file,
                Some(Err(e)) => return self.fail(e.into()),
                None if self.cancel.is_cancelled() => {
                    return self.fail(PipelineError::Cancelled);
                }
                None => {
                    self.done = true;
                    self.stream = None;
                    return None;
                }
            };

            log::debug!("Scanning {}", file.relative_path.display());
            match self.engine.parse_all(file) {
                Ok(_) if self.cancel.is_cancelled() => {
                    return self.fail(PipelineError::Cancelled);
                }
                Ok(nodes) => self.pending.extend(nodes),
                Err(e) => return self.fail(e.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CommentToken;
    use crate::cursor::LineCursor;
    use crate::error::{GlobError, ParseError};
    use crate::node::NodeId;
    use crate::plugin::builtin::core_plugin;
    use crate::plugin::{AnyArgs, ParserContext, ParserPlugin, PluginRegistry, define_command};
    use crate::test_utils::MemoryFs;
    use std::collections::BTreeSet;
    use std::sync::OnceLock;

    fn config() -> Config {
        Config::default()
            .with_root("/project")
            .with_include(["**/*.ts"])
            .with_comment_token(".ts", CommentToken::Start("//".to_string()))
    }

    fn core_commands() -> CommandMap {
        let mut registry = PluginRegistry::new();
        registry.register(core_plugin());
        registry.into_command_map()
    }

    fn ids(nodes: &[DocNode]) -> BTreeSet<String> {
        nodes.iter().map(|n| n.id.as_str().to_string()).collect()
    }

    fn sample_fs() -> MemoryFs {
        MemoryFs::new()
            .with_file(
                "/project/a.ts",
                "// @chapter id=intro title=Intro\n// @snippet id=one\nconst a = 1;\n// @end",
            )
            .with_file("/project/lib/b.ts", "// @snippet id=two\nb()\n// @end\n")
            .with_file("/project/c.ts", "no directives here")
    }

    #[test]
    fn test_collect_nodes_across_files() {
        let pipeline = Pipeline::new(config(), core_commands(), Arc::new(sample_fs()));
        let nodes = pipeline.collect_nodes().unwrap();

        assert_eq!(
            ids(&nodes),
            ["a.ts:intro", "a.ts:one", "lib/b.ts:two"]
                .iter()
                .map(|s| s.to_string())
                .collect::<BTreeSet<_>>()
        );
    }

    #[test]
    fn test_per_file_order_is_line_order() {
        let pipeline = Pipeline::new(config(), core_commands(), Arc::new(sample_fs()));
        let nodes = pipeline.collect_nodes().unwrap();

        let from_a: Vec<_> = nodes
            .iter()
            .filter(|n| n.id.as_str().starts_with("a.ts:"))
            .map(|n| n.id.clone())
            .collect();
        assert_eq!(from_a, vec![NodeId::new("a.ts:intro"), NodeId::new("a.ts:one")]);
    }

    #[test]
    fn test_nodes_carry_source_metadata() {
        let pipeline = Pipeline::new(config(), core_commands(), Arc::new(sample_fs()));
        let nodes = pipeline.collect_nodes().unwrap();
        let two = nodes
            .iter()
            .find(|n| n.id == NodeId::new("lib/b.ts:two"))
            .unwrap();

        let source = two.source().unwrap();
        assert_eq!(source.absolute_path, std::path::PathBuf::from("/project/lib/b.ts"));
        assert_eq!((source.start_line, source.end_line), (0, 2));
        assert!(!source.file_id.is_empty());
    }

    #[test]
    fn test_glob_error_is_first_and_only_item() {
        let cfg = config().with_include(["[oops"]);
        let pipeline = Pipeline::new(cfg, core_commands(), Arc::new(sample_fs()));
        let results: Vec<_> = pipeline.nodes().collect();

        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(PipelineError::Collect(CollectError::Glob(GlobError::Pattern { .. })))
        ));
    }

    #[test]
    fn test_read_error_ends_sequence() {
        let fs = MemoryFs::new().with_unreadable("/project/locked.ts");
        let pipeline = Pipeline::new(config(), core_commands(), Arc::new(fs));
        let mut nodes = pipeline.nodes();

        assert!(matches!(
            nodes.next(),
            Some(Err(PipelineError::Collect(CollectError::Read { .. })))
        ));
        assert!(nodes.next().is_none());
    }

    #[test]
    fn test_aborted_file_contributes_no_nodes() {
        let fs = MemoryFs::new().with_file(
            "/project/a.ts",
            "// @chapter id=ok title=Ok\n// @chapter id=broken\n",
        );
        let pipeline = Pipeline::new(config(), core_commands(), Arc::new(fs));
        let results: Vec<_> = pipeline.nodes().collect();

        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(PipelineError::Parse(ParseError::ArgumentDecode { .. }))
        ));
    }

    #[test]
    fn test_cancel_before_start() {
        let pipeline = Pipeline::new(config(), core_commands(), Arc::new(sample_fs()));
        pipeline.cancel_token().cancel();

        let results: Vec<_> = pipeline.nodes().collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(PipelineError::Cancelled)));
        assert!(matches!(pipeline.scan_parallel(2), Err(PipelineError::Cancelled)));
    }

    #[test]
    fn test_cancel_during_scan_drops_current_file() {
        let mut registry = PluginRegistry::new();
        let token_slot = Arc::new(OnceLock::<CancellationToken>::new());
        let slot = token_slot.clone();
        registry.register(ParserPlugin::new("test", "0.0.0").command(
            "stop",
            define_command(move |cursor: &mut LineCursor, ctx: &ParserContext<'_>, _args: AnyArgs| {
                cursor.next();
                if let Some(token) = slot.get() {
                    token.cancel();
                }
                Some(DocNode::new(NodeId::scoped(ctx.file, "stop"), "stop"))
            }),
        ));

        let fs = MemoryFs::new().with_file("/project/a.ts", "// @stop");
        let pipeline = Pipeline::new(config(), registry.into_command_map(), Arc::new(fs));
        token_slot.set(pipeline.cancel_token()).unwrap();

        let results: Vec<_> = pipeline.nodes().collect();
        assert_eq!(results.len(), 1);
        assert!(matches!(results[0], Err(PipelineError::Cancelled)));
    }

    #[test]
    fn test_pipeline_can_run_twice() {
        let pipeline = Pipeline::new(config(), core_commands(), Arc::new(sample_fs()));
        let first = pipeline.collect_nodes().unwrap();
        let second = pipeline.collect_nodes().unwrap();
        assert_eq!(ids(&first), ids(&second));
    }

    #[test]
    fn test_scan_parallel_matches_sequential() {
        let mut fs = MemoryFs::new();
        for i in 0..30 {
            fs = fs.with_file(
                format!("/project/f{}.ts", i),
                &format!("// @chapter id=c{} title=T\n// @snippet id=s{}\nx\n// @end", i, i),
            );
        }
        let pipeline = Pipeline::new(config(), core_commands(), Arc::new(fs));

        let sequential = pipeline.collect_nodes().unwrap();
        let parallel = pipeline.scan_parallel(4).unwrap();
        assert_eq!(sequential.len(), 60);
        assert_eq!(ids(&sequential), ids(&parallel));
    }

    #[test]
    fn test_scan_parallel_reports_parse_error() {
        let fs = sample_fs().with_file("/project/bad.ts", "// @snippet lang=ts");
        let pipeline = Pipeline::new(config(), core_commands(), Arc::new(fs));
        assert!(matches!(
            pipeline.scan_parallel(2),
            Err(PipelineError::Parse(_))
        ));
    }
}
