//! Frill CLI. Builds every shader variant declared under a source directory.
//!
//! The `frill` binary parses [`Cli`], installs logging and hands the
//! resulting [`BuildOptions`] to [`frill_build::run_build`].

#![warn(missing_docs)]

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use frill_build::{default_thread_count, run_build, BuildError, BuildOptions, ShaderCompiler};
use log::LevelFilter;

/// Incremental GLSL to SPIR-V build tool.
#[derive(Parser, Debug)]
#[command(name = "frill", version, about = "Incremental shader builds")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long)]
    pub verbose: bool,

    /// Directory containing the root `frill.json`.
    #[arg(short = 'S', long, default_value = ".")]
    pub source_dir: PathBuf,

    /// Directory receiving compiled artifacts and `index.json`.
    #[arg(short = 'B', long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Directory for dependency records (defaults to the output directory).
    #[arg(short = 'C', long)]
    pub cache_dir: Option<PathBuf>,

    /// Number of worker threads (defaults to the available parallelism).
    #[arg(short = 'j', long)]
    pub thread_count: Option<usize>,

    /// Recompile every target, ignoring the build cache.
    #[arg(short, long)]
    pub force_rebuild: bool,
}

impl Cli {
    /// The log level selected by `--quiet` / `--verbose`.
    pub fn log_level(&self) -> LevelFilter {
        if self.quiet {
            LevelFilter::Error
        } else if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    /// Converts the arguments into build settings.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            source_dir: self.source_dir.clone(),
            output_dir: self.output_dir.clone(),
            cache_dir: self.cache_dir.clone(),
            thread_count: self.thread_count.unwrap_or_else(default_thread_count),
            force_rebuild: self.force_rebuild,
        }
    }
}

/// Installs the global logger. `RUST_LOG` overrides the level from the flags.
pub fn init_logging(level: LevelFilter) {
    env_logger::Builder::new()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .parse_default_env()
        .init();
}

/// Runs a build for the parsed arguments and returns the exit code.
///
/// Target compile failures are logged by the build and do not change the
/// exit code; only fatal errors are returned.
pub fn run(cli: &Cli, compiler: Arc<dyn ShaderCompiler>) -> Result<i32, BuildError> {
    let summary = run_build(&cli.build_options(), compiler)?;
    if !summary.is_success() {
        log::warn!("{} target(s) failed to compile", summary.failed.len());
    }
    Ok(0)
}
