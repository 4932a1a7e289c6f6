//! Bounded worker pool for one target's compile batch.
//!
//! Compile steps within a plan have no dependencies on each other; they
//! all feed the same later link step. A failing step cancels the pending
//! remainder of its own batch — linking partial output is pointless.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use tarn_graph::CompileStep;
use tarn_toolchain::BuildContext;

use crate::error::{ExecError, Result};
use crate::process::run_command;

fn run_one(ctx: &BuildContext, step: &CompileStep) -> Result<()> {
    let command = ctx.compiler.compile_command(&step.request);
    let output = run_command(&command).map_err(|source| ExecError::Spawn {
        program: command.program.display().to_string(),
        source,
    })?;
    if output.success {
        Ok(())
    } else {
        Err(ExecError::CompileFailure {
            entity: step.entity.clone(),
            command: command.display_line(),
            output: output.diagnostics().to_string(),
        })
    }
}

/// Run `steps` with at most `jobs` workers; returns the first failure.
///
/// Dispatch order follows plan order. Already-running steps finish; pending
/// ones are abandoned once a failure is recorded.
pub fn run_compile_batch(ctx: &BuildContext, steps: &[CompileStep], jobs: usize) -> Result<()> {
    if steps.is_empty() {
        return Ok(());
    }
    let jobs = jobs.max(1).min(steps.len());
    if jobs == 1 {
        for step in steps {
            run_one(ctx, step)?;
        }
        return Ok(());
    }

    let queue: Mutex<VecDeque<&CompileStep>> = Mutex::new(steps.iter().collect());
    let cancelled = AtomicBool::new(false);
    let first_error: Mutex<Option<ExecError>> = Mutex::new(None);

    std::thread::scope(|scope| {
        for _ in 0..jobs {
            scope.spawn(|| loop {
                if cancelled.load(Ordering::SeqCst) {
                    break;
                }
                let step = match queue.lock().expect("queue poisoned").pop_front() {
                    Some(step) => step,
                    None => break,
                };
                if let Err(err) = run_one(ctx, step) {
                    cancelled.store(true, Ordering::SeqCst);
                    let mut slot = first_error.lock().expect("error slot poisoned");
                    if slot.is_none() {
                        *slot = Some(err);
                    }
                    break;
                }
            });
        }
    });

    match first_error.into_inner().expect("error slot poisoned") {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tarn_toolchain::{
        Compiler, CompileRequest, DebugMode, Linker, OptLevel,
    };

    fn context(compiler_path: &str) -> BuildContext {
        BuildContext::new(
            tarn_platform::lookup("linux").unwrap(),
            Compiler::gcc().with_path(compiler_path),
            Linker::ld().with_path("true"),
        )
        .unwrap()
    }

    fn step(name: &str) -> CompileStep {
        CompileStep {
            entity: name.to_string(),
            request: CompileRequest {
                source: PathBuf::from(format!("{name}.c")),
                output: PathBuf::from(format!("{name}.o")),
                includes: vec![],
                definitions: vec![],
                flags: vec![],
                optimization: OptLevel::Off,
                debug: DebugMode::Off,
                standard: None,
                pic: false,
            },
        }
    }

    #[test]
    fn batch_of_successes() {
        let ctx = context("true");
        let steps = vec![step("a"), step("b"), step("c"), step("d")];
        assert!(run_compile_batch(&ctx, &steps, 2).is_ok());
    }

    #[test]
    fn failure_is_reported_with_entity_and_command() {
        let ctx = context("false");
        let steps = vec![step("a")];
        let err = run_compile_batch(&ctx, &steps, 4).unwrap_err();
        match err {
            ExecError::CompileFailure { entity, command, .. } => {
                assert_eq!(entity, "a");
                assert!(command.starts_with("false"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn serial_batch_stops_at_first_failure() {
        let ctx = context("false");
        let steps = vec![step("a"), step("b")];
        let err = run_compile_batch(&ctx, &steps, 1).unwrap_err();
        assert!(matches!(err, ExecError::CompileFailure { entity, .. } if entity == "a"));
    }

    #[test]
    fn empty_batch_is_a_no_op() {
        let ctx = context("true");
        assert!(run_compile_batch(&ctx, &[], 8).is_ok());
    }
}
