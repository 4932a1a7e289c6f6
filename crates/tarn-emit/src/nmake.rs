//! NMake-compatible makefile generation.
//!
//! Same rule structure as the GNU backend, rendered in NMake syntax:
//! backslash paths on Windows-native platforms, `if not exist` directory
//! guards, `del`/`rmdir` cleanup, and no `.PHONY` declarations (NMake has
//! no equivalent; pseudo-targets are just artifact-less rules).

use std::path::Path;

use tarn_graph::{PostBuildCommand, Solution};
use tarn_toolchain::{BuildContext, Command, LinkKind};

use crate::error::Result;
use crate::model::{build_model, GenModel, TargetRule};
use crate::util::{backslashed, shell_join, write_if_changed};
use crate::Generator;

/// Emits one flat-rule NMake makefile for the whole solution.
#[derive(Debug, Default)]
pub struct NmakeGenerator;

fn path_str(ctx: &BuildContext, path: &Path) -> String {
    if ctx.platform.uses_backslash_paths() {
        backslashed(path)
    } else {
        path.display().to_string()
    }
}

fn rule_line(ctx: &BuildContext, var: &str, command: &Command) -> String {
    let args = if ctx.platform.uses_backslash_paths() {
        command
            .args
            .iter()
            .map(|a| {
                // Switches keep their forward slash, path-like args flip.
                if a.starts_with('/') {
                    a.clone()
                } else {
                    a.replace('/', "\\")
                }
            })
            .collect::<Vec<_>>()
    } else {
        command.args.clone()
    };
    format!("\t{var} {}", shell_join(&args))
}

fn mkdir_guard(ctx: &BuildContext, dir: &Path) -> String {
    let dir = path_str(ctx, dir);
    format!("\t@if not exist \"{dir}\" mkdir \"{dir}\"\n")
}

fn post_build_lines(ctx: &BuildContext, out: &mut String, target: &TargetRule) {
    for action in &target.post_build {
        match action {
            PostBuildCommand::Strip { file } => {
                out.push_str(&format!("\t$(STRIP) {}\n", path_str(ctx, file)));
            }
            PostBuildCommand::Delete { path } => {
                out.push_str(&format!("\t-del /f /q {}\n", path_str(ctx, path)));
            }
            PostBuildCommand::CreateDir { path } => {
                out.push_str(&mkdir_guard(ctx, path));
            }
        }
    }
}

fn render(ctx: &BuildContext, model: &GenModel) -> String {
    let mut out = String::new();
    out.push_str("# Generated by tarn-build for ");
    out.push_str(&ctx.platform.os_id);
    out.push_str("; do not edit.\n\n");

    out.push_str(&format!("CC = {}\n", ctx.compiler.path.display()));
    out.push_str(&format!("LD = {}\n", ctx.linker.path.display()));
    out.push_str(&format!("AR = {}\n", ctx.linker.archiver_path.display()));
    if let Some(strip) = &ctx.strip {
        out.push_str(&format!("STRIP = {}\n", strip.path.display()));
    }
    out.push('\n');

    let names: Vec<&str> = model.targets.iter().map(|t| t.name.as_str()).collect();
    out.push_str(&format!("all: {}\n\n", names.join(" ")));

    for target in &model.targets {
        let mut deps: Vec<String> = target.dep_targets.clone();
        if let Some(artifact) = &target.artifact {
            deps.push(path_str(ctx, artifact));
        }
        out.push_str(&format!("{}: {}\n\n", target.name, deps.join(" ")));
    }

    for target in &model.targets {
        let (artifact, link) = match (&target.artifact, &target.link_command) {
            (Some(a), Some(l)) => (a, l),
            _ => continue,
        };
        let mut inputs: Vec<String> = target
            .objects
            .iter()
            .map(|o| path_str(ctx, o))
            .collect();
        inputs.extend(target.extern_libs.iter().map(|l| path_str(ctx, l)));
        out.push_str(&format!("{}: {}\n", path_str(ctx, artifact), inputs.join(" ")));
        if let Some(dir) = artifact.parent().filter(|d| !d.as_os_str().is_empty()) {
            out.push_str(&mkdir_guard(ctx, dir));
        }
        let var = if target.kind == Some(LinkKind::StaticLibrary) {
            "$(AR)"
        } else {
            "$(LD)"
        };
        out.push_str(&rule_line(ctx, var, link));
        out.push('\n');
        post_build_lines(ctx, &mut out, target);
        out.push('\n');
    }

    for object in &model.objects {
        out.push_str(&format!(
            "{}: {}\n",
            path_str(ctx, &object.output),
            path_str(ctx, &object.source)
        ));
        if let Some(dir) = object.output.parent().filter(|d| !d.as_os_str().is_empty()) {
            out.push_str(&mkdir_guard(ctx, dir));
        }
        out.push_str(&rule_line(ctx, "$(CC)", &object.command));
        out.push_str("\n\n");
    }

    let clean: Vec<String> = model
        .clean_roots()
        .iter()
        .map(|d| path_str(ctx, d))
        .collect();
    if clean.is_empty() {
        out.push_str("clean:\n\t@echo nothing to clean\n\n");
    } else {
        out.push_str(&format!("clean:\n\t-rmdir /s /q {}\n\n", clean.join(" ")));
    }
    match model.application() {
        Some(app) => out.push_str(&format!(
            "check: all\n\t{} --selfcheck\n",
            path_str(
                ctx,
                app.artifact.as_ref().expect("application has artifact")
            )
        )),
        None => out.push_str("check: all\n\t@echo nothing to check\n"),
    }

    out
}

impl Generator for NmakeGenerator {
    fn generate(&self, path: &Path, ctx: &BuildContext, solution: &Solution) -> Result<()> {
        let model = build_model(ctx, solution)?;
        let content = render(ctx, &model);
        write_if_changed(path, &content)?;
        Ok(())
    }
}
