//! The solution runner: dependency-ordered direct execution.

use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Instant;

use tarn_graph::{flatten, CompileStep, PostBuildCommand, Solution};
use tarn_toolchain::BuildContext;

use crate::error::{ExecError, Result};
use crate::pool::run_compile_batch;
use crate::process::run_command;
use crate::report::{BuildReport, TargetOutcome, TargetStatus};

/// Execution policy for one run.
#[derive(Debug, Clone)]
pub struct ExecPolicy {
    /// Maximum parallel compile steps within one target.
    pub jobs: usize,
    /// Continue building independent targets after a failure.
    pub keep_going: bool,
}

impl Default for ExecPolicy {
    fn default() -> Self {
        Self {
            jobs: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1),
            keep_going: false,
        }
    }
}

/// Run an entity's post-build pipeline after its primary action succeeded.
///
/// Commands run in list order; the first failure aborts the rest for this
/// entity and becomes the entity's failure. Nothing already completed is
/// rolled back.
pub fn run_post_build(
    ctx: &BuildContext,
    entity: &str,
    commands: &[PostBuildCommand],
) -> Result<()> {
    for command in commands {
        match command {
            PostBuildCommand::Strip { file } => {
                let tool = ctx.strip.as_ref().ok_or_else(|| ExecError::PostBuildFailure {
                    entity: entity.to_string(),
                    detail: "strip requested but no strip tool selected".to_string(),
                })?;
                let cmd = tool.strip_command(file);
                let output = run_command(&cmd).map_err(|e| ExecError::PostBuildFailure {
                    entity: entity.to_string(),
                    detail: format!("spawning strip: {e}"),
                })?;
                if !output.success {
                    return Err(ExecError::PostBuildFailure {
                        entity: entity.to_string(),
                        detail: format!(
                            "strip {} failed: {}",
                            file.display(),
                            output.diagnostics().trim()
                        ),
                    });
                }
            }
            PostBuildCommand::Delete { path } => {
                std::fs::remove_file(path).map_err(|e| ExecError::PostBuildFailure {
                    entity: entity.to_string(),
                    detail: format!("delete {}: {e}", path.display()),
                })?;
            }
            PostBuildCommand::CreateDir { path } => {
                std::fs::create_dir_all(path).map_err(|e| ExecError::PostBuildFailure {
                    entity: entity.to_string(),
                    detail: format!("mkdir {}: {e}", path.display()),
                })?;
            }
        }
    }
    Ok(())
}

fn create_dirs(dirs: &[std::path::PathBuf]) -> Result<()> {
    for dir in dirs {
        std::fs::create_dir_all(dir).map_err(|source| ExecError::CreateDir {
            dir: dir.display().to_string(),
            source,
        })?;
    }
    Ok(())
}

fn run_target(
    ctx: &BuildContext,
    solution: &Solution,
    root: tarn_graph::EntityId,
    jobs: usize,
    built_outputs: &mut HashSet<PathBuf>,
) -> Result<usize> {
    let plan = flatten(solution, root)?;

    // Directory creation happens-before any compile writing into it, and
    // runs deduplicated on this single thread.
    create_dirs(&plan.dirs)?;

    // An output an earlier target already produced in this run is not
    // recompiled; output paths are deterministic, so the command would be
    // identical.
    let pending: Vec<CompileStep> = plan
        .compile_steps
        .iter()
        .filter(|s| !built_outputs.contains(&s.request.output))
        .cloned()
        .collect();
    let compiled = pending.len();
    run_compile_batch(ctx, &pending, jobs)?;
    for step in &pending {
        built_outputs.insert(step.request.output.clone());
    }

    if let Some(link) = &plan.link_step {
        let command = ctx.linker.link_command(&link.request);
        let output = run_command(&command).map_err(|source| ExecError::Spawn {
            program: command.program.display().to_string(),
            source,
        })?;
        if !output.success {
            return Err(ExecError::LinkFailure {
                entity: link.entity.clone(),
                command: command.display_line(),
                output: output.diagnostics().to_string(),
            });
        }
    }

    let entity = solution.entity(root)?;
    if let Some(link_props) = entity.link_props() {
        run_post_build(ctx, &entity.common.name, &link_props.post_build)?;
    }
    Ok(compiled)
}

/// Execute every target of `solution` in dependency order.
///
/// A failing step aborts its target; dependents of a failed target are
/// always skipped. With `keep_going`, independent remaining targets still
/// run; without it (the default, matching conventional `make`) the run
/// stops after the current target.
pub fn run(ctx: &BuildContext, solution: &Solution, policy: &ExecPolicy) -> Result<BuildReport> {
    let start = Instant::now();
    let order = solution.topological_order()?;

    let mut statuses: Vec<Option<TargetStatus>> = vec![None; solution.targets().len()];
    let mut outcomes: Vec<TargetOutcome> = Vec::with_capacity(order.len());
    let mut built_outputs: HashSet<PathBuf> = HashSet::new();
    let mut compile_count = 0usize;
    let mut stopping = false;

    for &index in &order {
        let target = &solution.targets()[index];

        let dep_failed = solution
            .target_dependencies(index)?
            .into_iter()
            .any(|dep| !matches!(statuses[dep], Some(TargetStatus::Built)));
        if stopping || dep_failed {
            statuses[index] = Some(TargetStatus::Skipped);
            outcomes.push(TargetOutcome {
                name: target.name.clone(),
                status: TargetStatus::Skipped,
                detail: None,
            });
            continue;
        }

        match run_target(ctx, solution, target.root, policy.jobs, &mut built_outputs) {
            Ok(compiled) => {
                compile_count += compiled;
                statuses[index] = Some(TargetStatus::Built);
                outcomes.push(TargetOutcome {
                    name: target.name.clone(),
                    status: TargetStatus::Built,
                    detail: None,
                });
            }
            // Graph errors are configuration-level and fatal; step
            // failures are attributed to the target.
            Err(err @ ExecError::Graph(_)) => return Err(err),
            Err(err) => {
                statuses[index] = Some(TargetStatus::Failed);
                outcomes.push(TargetOutcome {
                    name: target.name.clone(),
                    status: TargetStatus::Failed,
                    detail: Some(err.to_string()),
                });
                if !policy.keep_going {
                    stopping = true;
                }
            }
        }
    }

    Ok(BuildReport {
        targets: outcomes,
        compile_count,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::{Path, PathBuf};
    use tarn_graph::{CommonProps, Entity, EntityKind, LinkProps};
    use tarn_toolchain::{Compiler, Linker, Tool};

    fn context(compiler_path: &str) -> BuildContext {
        BuildContext::new(
            tarn_platform::lookup("linux").unwrap(),
            Compiler::gcc().with_path(compiler_path),
            Linker::ld().with_path("true"),
        )
        .unwrap()
        .with_strip(Tool::strip().with_path("true"))
    }

    fn object(sol: &mut Solution, name: &str, out_dir: &Path) -> tarn_graph::EntityId {
        sol.add_entity(Entity {
            common: CommonProps::named(name),
            kind: EntityKind::ObjectFile {
                source: PathBuf::from(format!("src/{name}.c")),
                output: out_dir.join(format!("{name}.o")),
                pic: false,
            },
        })
    }

    fn app(
        sol: &mut Solution,
        name: &str,
        depends: Vec<tarn_graph::EntityId>,
        out_dir: &Path,
    ) -> tarn_graph::EntityId {
        sol.add_entity(Entity {
            common: CommonProps::named(name),
            kind: EntityKind::Application(LinkProps::new(depends, out_dir.join(name))),
        })
    }

    #[test]
    fn successful_run_builds_everything() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("objs");
        let mut sol = Solution::new();
        let a = object(&mut sol, "a", &out);
        let b = object(&mut sol, "b", &out);
        let application = app(&mut sol, "tarn", vec![a, b], &out);
        sol.add_target("tarn", application);

        let report = run(&context("true"), &sol, &ExecPolicy::default()).unwrap();
        assert!(report.success());
        assert_eq!(report.compile_count, 2);
        // Output directory was created before compiling.
        assert!(out.is_dir());
    }

    #[test]
    fn shared_objects_compile_once_per_run() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("objs");
        let mut sol = Solution::new();
        let shared = object(&mut sol, "shared", &out);
        let first = app(&mut sol, "first", vec![shared], &out);
        let second = app(&mut sol, "second", vec![shared], &out);
        sol.add_target("first", first);
        sol.add_target("second", second);

        let report = run(&context("true"), &sol, &ExecPolicy::default()).unwrap();
        assert!(report.success());
        // Both targets list the object; it compiles for the first only.
        assert_eq!(report.compile_count, 1);
    }

    #[test]
    fn failed_dependency_skips_dependents() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("objs");
        let mut sol = Solution::new();
        let core = object(&mut sol, "core", &out);
        let lib = sol.add_entity(Entity {
            common: CommonProps::named("libtarn"),
            kind: EntityKind::StaticLibrary(LinkProps::new(vec![core], out.join("libtarn.a"))),
        });
        let application = app(&mut sol, "tarn", vec![lib], &out);
        sol.add_target("libtarn", lib);
        sol.add_target("tarn", application);

        // Compiler always fails.
        let report = run(&context("false"), &sol, &ExecPolicy::default()).unwrap();
        assert!(!report.success());
        assert_eq!(report.targets[0].status, TargetStatus::Failed);
        assert!(report.targets[0]
            .detail
            .as_deref()
            .unwrap()
            .contains("compiling"));
        assert_eq!(report.targets[1].status, TargetStatus::Skipped);
    }

    #[test]
    fn keep_going_builds_independent_targets() {
        let tmp = tempfile::tempdir().unwrap();
        let out = tmp.path().join("objs");
        let mut sol = Solution::new();

        // First target fails to compile (bad source marker is irrelevant —
        // the whole compiler is `false`), second is an empty application.
        let bad = object(&mut sol, "bad", &out);
        let failing = app(&mut sol, "failing", vec![bad], &out);
        let independent = app(&mut sol, "independent", vec![], &out);
        sol.add_target("failing", failing);
        sol.add_target("independent", independent);

        let policy = ExecPolicy {
            jobs: 1,
            keep_going: true,
        };
        let report = run(&context("false"), &sol, &policy).unwrap();
        assert_eq!(report.targets[0].status, TargetStatus::Failed);
        assert_eq!(report.targets[1].status, TargetStatus::Built);

        // Default policy stops instead.
        let report = run(&context("false"), &sol, &ExecPolicy { jobs: 1, keep_going: false })
            .unwrap();
        assert_eq!(report.targets[1].status, TargetStatus::Skipped);
    }

    #[test]
    fn post_build_pipeline_order_and_abort() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = context("true");

        let victim = tmp.path().join("victim.txt");
        std::fs::write(&victim, "x").unwrap();
        let made = tmp.path().join("made");

        // Delete succeeds, mkdir succeeds.
        run_post_build(
            &ctx,
            "tarn",
            &[
                PostBuildCommand::Delete {
                    path: victim.clone(),
                },
                PostBuildCommand::CreateDir { path: made.clone() },
            ],
        )
        .unwrap();
        assert!(!victim.exists());
        assert!(made.is_dir());

        // First failure aborts the rest: the second delete never happens.
        let keep = tmp.path().join("keep.txt");
        std::fs::write(&keep, "x").unwrap();
        let err = run_post_build(
            &ctx,
            "tarn",
            &[
                PostBuildCommand::Delete {
                    path: tmp.path().join("absent.txt"),
                },
                PostBuildCommand::Delete { path: keep.clone() },
            ],
        )
        .unwrap_err();
        assert!(matches!(err, ExecError::PostBuildFailure { entity, .. } if entity == "tarn"));
        assert!(keep.exists());
    }

    #[test]
    fn strip_without_tool_is_a_post_build_failure() {
        let ctx = BuildContext::new(
            tarn_platform::lookup("linux").unwrap(),
            Compiler::gcc().with_path("true"),
            Linker::ld().with_path("true"),
        )
        .unwrap();
        let err = run_post_build(
            &ctx,
            "tarn",
            &[PostBuildCommand::Strip {
                file: PathBuf::from("bin/tarn"),
            }],
        )
        .unwrap_err();
        assert!(matches!(err, ExecError::PostBuildFailure { .. }));
    }
}
