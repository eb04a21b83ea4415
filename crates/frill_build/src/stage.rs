//! Shader stages and how they are derived from a target.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use crate::error::CompileError;

/// The pipeline stage a source compiles for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderStage {
    /// `.vert`
    Vertex,
    /// `.frag`
    Fragment,
    /// `.tesc`
    TessControl,
    /// `.tese`
    TessEvaluation,
    /// `.geom`
    Geometry,
    /// `.comp`
    Compute,
    /// `.rgen`
    RayGeneration,
    /// `.rahit`
    AnyHit,
    /// `.rchit`
    ClosestHit,
    /// `.rmiss`
    Miss,
    /// `.rint`
    Intersection,
    /// `.rcall`
    Callable,
    /// `.task`
    Task,
    /// `.mesh`
    Mesh,
}

impl ShaderStage {
    /// Every stage, in declaration order.
    pub const ALL: [ShaderStage; 14] = [
        ShaderStage::Vertex,
        ShaderStage::Fragment,
        ShaderStage::TessControl,
        ShaderStage::TessEvaluation,
        ShaderStage::Geometry,
        ShaderStage::Compute,
        ShaderStage::RayGeneration,
        ShaderStage::AnyHit,
        ShaderStage::ClosestHit,
        ShaderStage::Miss,
        ShaderStage::Intersection,
        ShaderStage::Callable,
        ShaderStage::Task,
        ShaderStage::Mesh,
    ];

    /// The file extension that selects this stage.
    pub fn extension(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "vert",
            ShaderStage::Fragment => "frag",
            ShaderStage::TessControl => "tesc",
            ShaderStage::TessEvaluation => "tese",
            ShaderStage::Geometry => "geom",
            ShaderStage::Compute => "comp",
            ShaderStage::RayGeneration => "rgen",
            ShaderStage::AnyHit => "rahit",
            ShaderStage::ClosestHit => "rchit",
            ShaderStage::Miss => "rmiss",
            ShaderStage::Intersection => "rint",
            ShaderStage::Callable => "rcall",
            ShaderStage::Task => "task",
            ShaderStage::Mesh => "mesh",
        }
    }

    /// The macro defined for every compile of this stage.
    pub fn macro_name(self) -> &'static str {
        match self {
            ShaderStage::Vertex => "FRILL_SHADER_STAGE_VERT",
            ShaderStage::Fragment => "FRILL_SHADER_STAGE_FRAG",
            ShaderStage::TessControl => "FRILL_SHADER_STAGE_TESS_CONTROL",
            ShaderStage::TessEvaluation => "FRILL_SHADER_STAGE_TESS_EVALUATION",
            ShaderStage::Geometry => "FRILL_SHADER_STAGE_GEOM",
            ShaderStage::Compute => "FRILL_SHADER_STAGE_COMP",
            ShaderStage::RayGeneration => "FRILL_SHADER_STAGE_RAY_GEN",
            ShaderStage::AnyHit => "FRILL_SHADER_STAGE_ANY_HIT",
            ShaderStage::ClosestHit => "FRILL_SHADER_STAGE_CLOSEST_HIT",
            ShaderStage::Miss => "FRILL_SHADER_STAGE_MISS",
            ShaderStage::Intersection => "FRILL_SHADER_STAGE_INTERSECTION",
            ShaderStage::Callable => "FRILL_SHADER_STAGE_CALLABLE",
            ShaderStage::Task => "FRILL_SHADER_STAGE_TASK",
            ShaderStage::Mesh => "FRILL_SHADER_STAGE_MESH",
        }
    }

    /// Looks a stage up by file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.extension() == ext)
    }

    /// Looks a stage up by its stage macro.
    pub fn from_macro(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.macro_name() == name)
    }

    /// Infers the stage of a source file.
    ///
    /// A stage extension decides directly. A `.glsl` file takes its stage
    /// from the first stage macro among `flags`.
    pub fn infer(path: &Path, flags: &BTreeSet<String>) -> Result<Self, CompileError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        if let Some(stage) = Self::from_extension(ext) {
            return Ok(stage);
        }
        if ext == "glsl" {
            return flags
                .iter()
                .find_map(|f| Self::from_macro(f))
                .ok_or_else(|| CompileError::UnknownStage {
                    path: path.to_path_buf(),
                    reason: "should specify a stage macro for *.glsl file",
                });
        }
        Err(CompileError::UnknownStage {
            path: path.to_path_buf(),
            reason: "invalid shader file extension",
        })
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}
