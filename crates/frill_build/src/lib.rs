//! Compilation of resolved shader targets.
//!
//! [`run_build`] drives one build: it resolves the configuration tree,
//! assigns UIDs, asks the [`BuildCache`](frill_cache::BuildCache) which
//! targets are stale, compiles those on a [`ThreadPool`] and finally rewrites
//! the index. The actual GLSL compiler is abstracted behind
//! [`ShaderCompiler`]; enable the `shaderc` feature for the real backend.

#![warn(missing_docs)]

pub mod compiler;
pub mod dispatch;
pub mod error;
pub mod include;
pub mod pipeline;
pub mod pool;
#[cfg(feature = "shaderc")]
pub mod shaderc_compiler;
pub mod stage;

pub use compiler::{CompileRequest, ShaderCompiler};
pub use dispatch::{dispatch, DispatchReport};
pub use error::{BuildError, CompileError, IncludeError, TaskPanic};
pub use include::{IncludeKind, IncludeResolver, ResolvedInclude, MAX_INCLUDE_DEPTH};
pub use pipeline::{default_thread_count, run_build, BuildOptions, BuildSummary, CACHE_DIR_NAME};
pub use pool::{TaskHandle, ThreadPool};
#[cfg(feature = "shaderc")]
pub use shaderc_compiler::ShadercCompiler;
pub use stage::ShaderStage;
