//! Concurrent compilation of stale targets.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use frill_cache::{BuildCache, DependencyTimestamps};
use frill_common::{fs, Target, TargetId};

use crate::compiler::{CompileRequest, ShaderCompiler};
use crate::error::CompileError;
use crate::include::IncludeResolver;
use crate::pool::ThreadPool;
use crate::stage::ShaderStage;

/// Outcome of one [`dispatch`] call.
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Targets whose artifact and record were written.
    pub compiled: Vec<TargetId>,
    /// Targets that failed, with the reason.
    pub failed: Vec<(TargetId, CompileError)>,
}

impl DispatchReport {
    /// Returns `true` if every dispatched target compiled.
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Compiles each of `targets` once on `pool` and waits for all of them.
///
/// Artifacts go to `<output_root>/<uid>.spv`. A failing target is logged and
/// reported but never stops the others.
pub fn dispatch(
    targets: Vec<Target>,
    compiler: Arc<dyn ShaderCompiler>,
    pool: &ThreadPool,
    output_root: &Path,
    cache: &BuildCache,
) -> DispatchReport {
    let total = targets.len();
    let started = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = targets
        .into_iter()
        .map(|target| {
            let id = target.id.clone();
            let compiler = Arc::clone(&compiler);
            let started = Arc::clone(&started);
            let output_root = output_root.to_path_buf();
            let cache = cache.clone();
            let handle = pool.submit(move || {
                let n = started.fetch_add(1, Ordering::Relaxed) + 1;
                log::info!(
                    "[{n}/{total}] compiling {} {}",
                    target.id.path().display(),
                    target.id.flag_list()
                );
                compile_target(&target, compiler.as_ref(), &output_root, &cache)
            });
            (id, handle)
        })
        .collect();

    let mut report = DispatchReport::default();
    for (id, handle) in handles {
        match handle.join().map_err(CompileError::from).and_then(|r| r) {
            Ok(_) => report.compiled.push(id),
            Err(e) => {
                log::error!(
                    "failed to compile {} [{}]: {e}",
                    id.path().display(),
                    id.flag_list()
                );
                report.failed.push((id, e));
            }
        }
    }
    report
}

/// Compiles one target, writes its artifact and refreshes its record.
/// Returns the artifact path.
fn compile_target(
    target: &Target,
    compiler: &dyn ShaderCompiler,
    output_root: &Path,
    cache: &BuildCache,
) -> Result<PathBuf, CompileError> {
    let source_path = target.id.path();
    let stage = ShaderStage::infer(source_path, target.id.flags())?;
    let source_text = fs::read_to_string(source_path).map_err(CompileError::Read)?;

    let mut deps = DependencyTimestamps::new();
    deps.record(source_path).map_err(CompileError::Read)?;

    let mut definitions: BTreeSet<String> = target.id.flags().clone();
    definitions.insert(stage.macro_name().to_string());
    let request = CompileRequest {
        source_path,
        source_text: &source_text,
        stage,
        definitions: definitions.into_iter().collect(),
    };

    let mut includes = IncludeResolver::new(&target.include_dirs, deps);
    let bytes = compiler
        .compile(&request, &mut includes)
        .map_err(|diagnostic| CompileError::Compiler { diagnostic })?;

    let output = output_root.join(target.artifact_file_name());
    fs::write_bytes(&output, &bytes).map_err(CompileError::Write)?;
    cache.store(target, includes.into_dependencies(), &output)?;
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::include::IncludeKind;
    use parking_lot::Mutex;

    /// Echoes the definitions and resolves `//include <name>` lines.
    struct EchoCompiler {
        seen: Mutex<Vec<Vec<String>>>,
    }

    impl ShaderCompiler for EchoCompiler {
        fn compile(
            &self,
            request: &CompileRequest<'_>,
            includes: &mut IncludeResolver,
        ) -> Result<Vec<u8>, String> {
            self.seen.lock().push(request.definitions.clone());
            if request.source_text.contains("#error") {
                return Err(format!("{}: error directive", request.source_path.display()));
            }
            for name in request
                .source_text
                .lines()
                .filter_map(|l| l.strip_prefix("//include "))
            {
                includes
                    .resolve(name, IncludeKind::Standard, request.source_path, 1)
                    .map_err(|e| e.to_string())?;
            }
            Ok(request.definitions.join(" ").into_bytes())
        }
    }

    fn echo() -> Arc<EchoCompiler> {
        Arc::new(EchoCompiler {
            seen: Mutex::new(Vec::new()),
        })
    }

    fn target(root: &Path, name: &str, flags: &[&str], uid: &str) -> Target {
        Target {
            id: TargetId::new(root.join(name), flags.iter().copied()),
            relative_path: PathBuf::from(name),
            include_dirs: BTreeSet::from([root.join("inc")]),
            declaring_config_file: root.join("frill.json"),
            uid: uid.to_string(),
        }
    }

    #[test]
    fn compiles_and_records_each_target() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::create_dir_all(root.join("inc")).unwrap();
        std::fs::write(root.join("inc/common.glsl"), "").unwrap();
        std::fs::write(root.join("a.frag"), "//include common.glsl").unwrap();
        std::fs::write(root.join("b.vert"), "").unwrap();

        let targets = vec![
            target(&root, "a.frag", &["FOG"], "00000000000000AA"),
            target(&root, "b.vert", &[], "00000000000000BB"),
        ];
        let cache = BuildCache::new(root.join("cache"));
        let pool = ThreadPool::new(2);
        let report = dispatch(targets.clone(), echo(), &pool, &root.join("out"), &cache);

        assert!(report.is_success());
        assert_eq!(report.compiled.len(), 2);
        assert_eq!(
            std::fs::read(root.join("out/00000000000000AA.spv")).unwrap(),
            b"FOG FRILL_SHADER_STAGE_FRAG"
        );
        for t in &targets {
            assert!(!cache.is_stale(t));
        }
    }

    #[test]
    fn failure_does_not_stop_siblings() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::write(root.join("bad.frag"), "#error").unwrap();
        std::fs::write(root.join("missing_inc.frag"), "//include nope.glsl").unwrap();
        std::fs::write(root.join("good.frag"), "").unwrap();

        let targets = vec![
            target(&root, "bad.frag", &[], "0000000000000001"),
            target(&root, "missing_inc.frag", &[], "0000000000000002"),
            target(&root, "good.frag", &[], "0000000000000003"),
            target(&root, "shared.glsl", &[], "0000000000000004"),
        ];
        let cache = BuildCache::new(root.join("cache"));
        let pool = ThreadPool::new(2);
        let report = dispatch(targets.clone(), echo(), &pool, &root.join("out"), &cache);

        assert_eq!(report.compiled, vec![targets[2].id.clone()]);
        assert_eq!(report.failed.len(), 3);
        assert!(!root.join("out/0000000000000001.spv").exists());
        assert!(cache.is_stale(&targets[0]));
        assert!(!cache.is_stale(&targets[2]));

        let stage_failure = &report.failed.iter().find(|(id, _)| id == &targets[3].id).unwrap().1;
        assert!(matches!(stage_failure, CompileError::UnknownStage { .. }));
    }

    #[test]
    fn glsl_stage_macro_is_not_duplicated() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().canonicalize().unwrap();
        std::fs::write(root.join("shared.glsl"), "").unwrap();

        let compiler = echo();
        let pool = ThreadPool::new(1);
        let report = dispatch(
            vec![target(&root, "shared.glsl", &["FRILL_SHADER_STAGE_COMP"], "0000000000000001")],
            compiler.clone(),
            &pool,
            &root.join("out"),
            &BuildCache::new(root.join("cache")),
        );
        assert!(report.is_success());
        assert_eq!(
            compiler.seen.lock().as_slice(),
            &[vec!["FRILL_SHADER_STAGE_COMP".to_string()]]
        );
    }
}
