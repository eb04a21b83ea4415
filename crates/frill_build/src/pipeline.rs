//! One complete build, from configuration tree to index.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use frill_archive::write_index;
use frill_cache::{BuildCache, StaleReason, Staleness};
use frill_common::{assign_uids, fs, Target, TargetId};
use frill_config::resolve_tree;

use crate::compiler::ShaderCompiler;
use crate::dispatch::{dispatch, DispatchReport};
use crate::error::{BuildError, CompileError};
use crate::pool::ThreadPool;

/// Name of the directory holding dependency records.
pub const CACHE_DIR_NAME: &str = "__frill_cache__";

/// Settings for one build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Directory containing the root `frill.json`.
    pub source_dir: PathBuf,
    /// Directory receiving artifacts and the index.
    pub output_dir: PathBuf,
    /// Directory under which records are kept; `output_dir` when `None`.
    pub cache_dir: Option<PathBuf>,
    /// Number of worker threads.
    pub thread_count: usize,
    /// Compile every target regardless of the cache.
    pub force_rebuild: bool,
}

impl BuildOptions {
    /// Options with the given roots, one worker per available core and the
    /// cache under the output directory.
    pub fn new(source_dir: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_dir: source_dir.into(),
            output_dir: output_dir.into(),
            cache_dir: None,
            thread_count: default_thread_count(),
            force_rebuild: false,
        }
    }

    /// Where dependency records go: `<cache-or-output>/__frill_cache__`.
    pub fn cache_root(&self) -> PathBuf {
        self.cache_dir
            .as_ref()
            .unwrap_or(&self.output_dir)
            .join(CACHE_DIR_NAME)
    }
}

/// Hardware parallelism, or 1 if it cannot be determined.
pub fn default_thread_count() -> usize {
    thread::available_parallelism().map_or(1, |n| n.get())
}

/// What a finished build did.
#[derive(Debug, Default)]
pub struct BuildSummary {
    /// Number of targets in the configuration tree.
    pub total: usize,
    /// Targets compiled successfully in this run.
    pub compiled: Vec<TargetId>,
    /// Targets that failed to compile in this run.
    pub failed: Vec<(TargetId, CompileError)>,
}

impl BuildSummary {
    /// Number of targets that needed no work.
    pub fn up_to_date(&self) -> usize {
        self.total - self.compiled.len() - self.failed.len()
    }

    /// Returns `true` if no target failed.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs a build.
///
/// Only configuration and index errors are returned; failures of individual
/// targets are logged and collected in the summary.
pub fn run_build(
    options: &BuildOptions,
    compiler: Arc<dyn ShaderCompiler>,
) -> Result<BuildSummary, BuildError> {
    let mut targets = resolve_tree(&options.source_dir)?;
    assign_uids(&mut targets);
    log::debug!("resolved {} targets", targets.len());

    fs::create_dir_all(&options.output_dir)?;
    let cache = BuildCache::new(options.cache_root());

    let stale = stale_targets(&targets, &cache, options.force_rebuild);
    let report = if stale.is_empty() {
        log::info!("all targets up to date, nothing to compile");
        DispatchReport::default()
    } else {
        let pool = ThreadPool::new(options.thread_count);
        let report = dispatch(stale, compiler, &pool, &options.output_dir, &cache);
        pool.shutdown();
        report
    };

    write_index(&options.output_dir, &targets)?;

    let summary = BuildSummary {
        total: targets.len(),
        compiled: report.compiled,
        failed: report.failed,
    };
    log::info!(
        "{} compiled, {} failed, {} up to date",
        summary.compiled.len(),
        summary.failed.len(),
        summary.up_to_date()
    );
    Ok(summary)
}

fn stale_targets(targets: &[Target], cache: &BuildCache, force: bool) -> Vec<Target> {
    targets
        .iter()
        .filter(|target| {
            let verdict = if force {
                Staleness::Stale(StaleReason::Forced)
            } else {
                cache.check(target)
            };
            match verdict {
                Staleness::UpToDate => false,
                Staleness::Stale(reason) => {
                    log::debug!("{} is stale: {reason}", target.id);
                    true
                }
            }
        })
        .cloned()
        .collect()
}
