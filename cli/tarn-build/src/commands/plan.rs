//! `tarn-build plan` — print the flattened plan for each target.

use anyhow::{bail, Result};
use serde::Serialize;
use tarn_graph::{assemble, build_context, flatten, EntityId, Solution};
use tarn_toolchain::BuildContext;

use crate::manifest::ProjectManifest;

/// One compile step, rendered for export.
#[derive(Debug, Serialize)]
struct CompileView {
    source: String,
    output: String,
    command: String,
}

/// One target's flattened plan, rendered for export.
#[derive(Debug, Serialize)]
struct PlanView {
    target: String,
    dirs: Vec<String>,
    compile_steps: Vec<CompileView>,
    link_command: Option<String>,
}

fn plan_view(
    ctx: &BuildContext,
    solution: &Solution,
    name: &str,
    root: EntityId,
) -> Result<PlanView> {
    let plan = flatten(solution, root)?;
    let compile_steps = plan
        .compile_steps
        .iter()
        .map(|step| CompileView {
            source: step.request.source.display().to_string(),
            output: step.request.output.display().to_string(),
            command: ctx.compiler.compile_command(&step.request).display_line(),
        })
        .collect();
    let link_command = plan
        .link_step
        .as_ref()
        .map(|step| ctx.linker.link_command(&step.request).display_line());
    Ok(PlanView {
        target: name.to_string(),
        dirs: plan.dirs.iter().map(|d| d.display().to_string()).collect(),
        compile_steps,
        link_command,
    })
}

/// Print the plan for one target, or for every target when none is named.
pub fn run(manifest: &ProjectManifest, target: Option<&str>, json: bool) -> Result<()> {
    let config = manifest.to_config()?;
    let ctx = build_context(&config)?;
    let solution = assemble(&ctx, &config, &manifest.modules)?;

    let mut views = Vec::new();
    for t in solution.targets() {
        if let Some(wanted) = target {
            if t.name != wanted {
                continue;
            }
        }
        views.push(plan_view(&ctx, &solution, &t.name, t.root)?);
    }
    if views.is_empty() {
        match target {
            Some(name) => bail!("no target named `{name}`"),
            None => bail!("the solution has no targets"),
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&views)?);
        return Ok(());
    }
    for view in &views {
        println!("target {}", view.target);
        for dir in &view.dirs {
            println!("  dir      {dir}");
        }
        for step in &view.compile_steps {
            println!("  compile  {}", step.command);
        }
        if let Some(link) = &view.link_command {
            println!("  link     {link}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
[project]
name = "plan-test"

[build]
platform = "linux"
toolset = ["gcc", "ld"]

[[module]]
name = "vm"
source = "src/vm.c"

[[module]]
name = "gc"
source = "src/gc.c"
"#;

    #[test]
    fn plan_views_cover_every_target() {
        let manifest = ProjectManifest::from_str(MANIFEST).unwrap();
        let config = manifest.to_config().unwrap();
        let ctx = build_context(&config).unwrap();
        let solution = assemble(&ctx, &config, &manifest.modules).unwrap();

        let views: Vec<PlanView> = solution
            .targets()
            .iter()
            .map(|t| plan_view(&ctx, &solution, &t.name, t.root).unwrap())
            .collect();
        let names: Vec<&str> = views.iter().map(|v| v.target.as_str()).collect();
        assert_eq!(names, vec!["libtarn", "tarn"]);

        // The library plan compiles both core modules.
        assert_eq!(views[0].compile_steps.len(), 2);
        assert!(views[0].link_command.as_ref().unwrap().contains("libtarn"));

        // Views serialize for --json export.
        let json = serde_json::to_string(&views).unwrap();
        assert!(json.contains("\"target\": \"libtarn\"") || json.contains("\"target\":\"libtarn\""));
    }

    #[test]
    fn unknown_target_is_an_error() {
        let manifest = ProjectManifest::from_str(MANIFEST).unwrap();
        assert!(run(&manifest, Some("nonexistent"), false).is_err());
    }
}
