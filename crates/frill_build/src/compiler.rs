//! The interface to the external GLSL compiler.

use std::path::Path;

use crate::include::IncludeResolver;
use crate::stage::ShaderStage;

/// Everything a compiler needs to turn one target into an artifact.
#[derive(Debug, Clone)]
pub struct CompileRequest<'a> {
    /// Canonical path of the source file.
    pub source_path: &'a Path,
    /// The source text.
    pub source_text: &'a str,
    /// The stage to compile for.
    pub stage: ShaderStage,
    /// Macros to define (without values): the target's flags plus the stage
    /// macro, sorted and deduplicated.
    pub definitions: Vec<String>,
}

/// A GLSL to SPIR-V compiler.
///
/// One instance is shared by all worker threads; implementations keep any
/// mutable compiler state per call. `#include` directives must be resolved
/// through `includes`, which also records the touched files for the build
/// cache.
pub trait ShaderCompiler: Send + Sync {
    /// Compiles one request. On failure returns the compiler's diagnostic.
    fn compile(
        &self,
        request: &CompileRequest<'_>,
        includes: &mut IncludeResolver,
    ) -> Result<Vec<u8>, String>;
}
