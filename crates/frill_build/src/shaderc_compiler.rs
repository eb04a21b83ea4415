//! [`ShaderCompiler`] backed by the native shaderc library.

use std::cell::RefCell;
use std::path::Path;

use shaderc::{CompileOptions, Compiler, IncludeType, ResolvedInclude, ShaderKind};

use crate::compiler::{CompileRequest, ShaderCompiler};
use crate::include::{IncludeKind, IncludeResolver};
use crate::stage::ShaderStage;

/// Compiles Vulkan GLSL to SPIR-V with shaderc.
///
/// A fresh `shaderc::Compiler` is created per call, so no compiler state is
/// shared across worker threads.
#[derive(Debug, Default, Clone, Copy)]
pub struct ShadercCompiler;

impl ShadercCompiler {
    /// Creates the backend.
    pub fn new() -> Self {
        Self
    }
}

fn shader_kind(stage: ShaderStage) -> ShaderKind {
    match stage {
        ShaderStage::Vertex => ShaderKind::Vertex,
        ShaderStage::Fragment => ShaderKind::Fragment,
        ShaderStage::TessControl => ShaderKind::TessControl,
        ShaderStage::TessEvaluation => ShaderKind::TessEvaluation,
        ShaderStage::Geometry => ShaderKind::Geometry,
        ShaderStage::Compute => ShaderKind::Compute,
        ShaderStage::RayGeneration => ShaderKind::RayGeneration,
        ShaderStage::AnyHit => ShaderKind::AnyHit,
        ShaderStage::ClosestHit => ShaderKind::ClosestHit,
        ShaderStage::Miss => ShaderKind::Miss,
        ShaderStage::Intersection => ShaderKind::Intersection,
        ShaderStage::Callable => ShaderKind::Callable,
        ShaderStage::Task => ShaderKind::Task,
        ShaderStage::Mesh => ShaderKind::Mesh,
    }
}

impl ShaderCompiler for ShadercCompiler {
    fn compile(
        &self,
        request: &CompileRequest<'_>,
        includes: &mut IncludeResolver,
    ) -> Result<Vec<u8>, String> {
        let compiler = Compiler::new().ok_or("failed to initialize shaderc compiler")?;
        let resolver = RefCell::new(includes);

        let mut options =
            CompileOptions::new().ok_or("failed to initialize shaderc compile options")?;
        for name in &request.definitions {
            options.add_macro_definition(name, None);
        }
        options.set_include_callback(|requested, include_type, requesting, depth| {
            let kind = match include_type {
                IncludeType::Relative => IncludeKind::Relative,
                IncludeType::Standard => IncludeKind::Standard,
            };
            resolver
                .borrow_mut()
                .resolve(requested, kind, Path::new(requesting), depth)
                .map(|found| ResolvedInclude {
                    resolved_name: found.path.to_string_lossy().into_owned(),
                    content: found.content,
                })
                .map_err(|e| e.to_string())
        });

        let artifact = compiler
            .compile_into_spirv(
                request.source_text,
                shader_kind(request.stage),
                &request.source_path.to_string_lossy(),
                "main",
                Some(&options),
            )
            .map_err(|e| e.to_string())?;
        if artifact.get_num_warnings() > 0 {
            log::warn!(
                "{}: {}",
                request.source_path.display(),
                artifact.get_warning_messages()
            );
        }
        Ok(artifact.as_binary_u8().to_vec())
    }
}
