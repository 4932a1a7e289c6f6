//! GNU-make-compatible makefile generation.

use std::path::Path;

use tarn_graph::{PostBuildCommand, Solution};
use tarn_toolchain::{BuildContext, Command, LinkKind};

use crate::error::Result;
use crate::model::{build_model, GenModel, TargetRule};
use crate::util::{shell_join, write_if_changed};
use crate::Generator;

/// Emits one flat-rule GNU makefile for the whole solution.
#[derive(Debug, Default)]
pub struct MakefileGenerator;

/// Replace a command's program with a make variable reference.
fn rule_line(var: &str, command: &Command) -> String {
    format!("\t{var} {}", shell_join(&command.args))
}

fn post_build_lines(out: &mut String, target: &TargetRule) {
    for action in &target.post_build {
        match action {
            PostBuildCommand::Strip { file } => {
                out.push_str(&format!("\t$(STRIP) {}\n", file.display()));
            }
            PostBuildCommand::Delete { path } => {
                out.push_str(&format!("\trm -f {}\n", path.display()));
            }
            PostBuildCommand::CreateDir { path } => {
                out.push_str(&format!("\t@mkdir -p {}\n", path.display()));
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
    out.push_str(&format!(".PHONY: all clean check {}\n\n", names.join(" ")));

    // Phony per-target rules: dependency targets first, then the artifact.
    for target in &model.targets {
        let mut deps: Vec<String> = target.dep_targets.clone();
        if let Some(artifact) = &target.artifact {
            deps.push(artifact.display().to_string());
        }
        out.push_str(&format!("{}: {}\n\n", target.name, deps.join(" ")));
    }

    // Artifact rules.
    for target in &model.targets {
        let (artifact, link) = match (&target.artifact, &target.link_command) {
            (Some(a), Some(l)) => (a, l),
            _ => continue,
        };
        let mut inputs: Vec<String> = target
            .objects
            .iter()
            .map(|o| o.display().to_string())
            .collect();
        inputs.extend(target.extern_libs.iter().map(|l| l.display().to_string()));
        out.push_str(&format!("{}: {}\n", artifact.display(), inputs.join(" ")));
        if let Some(dir) = artifact.parent().filter(|d| !d.as_os_str().is_empty()) {
            out.push_str(&format!("\t@mkdir -p {}\n", dir.display()));
        }
        let var = if target.kind == Some(LinkKind::StaticLibrary) {
            "$(AR)"
        } else {
            "$(LD)"
        };
        out.push_str(&rule_line(var, link));
        out.push('\n');
        post_build_lines(&mut out, target);
        out.push('\n');
    }

    // Object rules, one per output path.
    for object in &model.objects {
        out.push_str(&format!(
            "{}: {}\n",
            object.output.display(),
            object.source.display()
        ));
        if let Some(dir) = object.output.parent().filter(|d| !d.as_os_str().is_empty()) {
            out.push_str(&format!("\t@mkdir -p {}\n", dir.display()));
        }
        out.push_str(&rule_line("$(CC)", &object.command));
        out.push_str("\n\n");
    }

    let clean: Vec<String> = model
        .clean_roots()
        .iter()
        .map(|d| d.display().to_string())
        .collect();
    if clean.is_empty() {
        out.push_str("clean:\n\t@echo nothing to clean\n\n");
    } else {
        out.push_str(&format!("clean:\n\trm -rf {}\n\n", clean.join(" ")));
    }
    match model.application() {
        Some(app) => out.push_str(&format!(
            "check: all\n\t{} --selfcheck\n",
            app.artifact.as_ref().expect("application has artifact").display()
        )),
        None => out.push_str("check: all\n\t@echo nothing to check\n"),
    }

    out
}

#[cfg(test)]
pub(crate) fn render_for_tests(ctx: &BuildContext, solution: &Solution) -> String {
    render(ctx, &build_model(ctx, solution).unwrap())
}

impl Generator for MakefileGenerator {
    fn generate(&self, path: &Path, ctx: &BuildContext, solution: &Solution) -> Result<()> {
        let model = build_model(ctx, solution)?;
        let content = render(ctx, &model);
        write_if_changed(path, &content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::tests::{context, sample_solution};

    #[test]
    fn makefile_has_one_rule_per_target_and_object() {
        let ctx = context();
        let sol = sample_solution();
        let model = build_model(&ctx, &sol).unwrap();
        let text = render(&ctx, &model);

        assert!(text.contains("all: libtarn tarn\n"));
        assert!(text.contains("libtarn: build/linux/lib/libtarn.a\n"));
        // The app's phony rule orders the library target first.
        assert!(text.contains("tarn: libtarn build/linux/bin/tarn\n"));
        assert!(text.contains("build/objs/linux/vm.o: src/vm.c\n"));
        assert!(text.contains("$(AR) rcs build/linux/lib/libtarn.a"));
        assert!(text.contains(".PHONY: all clean check libtarn tarn\n"));
        // Objects are emitted once even though the model saw two plans.
        assert_eq!(text.matches("build/objs/linux/vm.o: ").count(), 1);
    }

    #[test]
    fn clean_covers_solutions_rooted_outside_build() {
        use tarn_graph::{CommonProps, Entity, EntityKind, LinkProps};
        use std::path::PathBuf;

        let mut sol = Solution::new();
        let obj = sol.add_entity(Entity {
            common: CommonProps::named("vm"),
            kind: EntityKind::ObjectFile {
                source: PathBuf::from("src/vm.c"),
                output: PathBuf::from("out/objs/vm.o"),
                pic: false,
            },
        });
        let app = sol.add_entity(Entity {
            common: CommonProps::named("tarn"),
            kind: EntityKind::Application(LinkProps::new(vec![obj], "out/bin/tarn")),
        });
        sol.add_target("tarn", app);

        let ctx = context();
        let text = render(&ctx, &build_model(&ctx, &sol).unwrap());
        assert!(text.contains("clean:\n\trm -rf out/bin out/objs\n"));
    }

    #[test]
    fn regeneration_is_byte_identical_and_skips_rewrite() {
        let ctx = context();
        let sol = sample_solution();
        let model = build_model(&ctx, &sol).unwrap();
        assert_eq!(render(&ctx, &model), render(&ctx, &model));

        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Makefile");
        MakefileGenerator.generate(&path, &ctx, &sol).unwrap();
        let first = std::fs::read_to_string(&path).unwrap();
        // Second generation leaves identical bytes in place.
        assert!(!write_if_changed(&path, &first).unwrap());
        MakefileGenerator.generate(&path, &ctx, &sol).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), first);
    }
}
