//! `tarn-build build` — assemble the entity graph and execute it directly.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tarn_exec::{ExecPolicy, TargetStatus};
use tarn_graph::{assemble, build_context};

use crate::manifest::ProjectManifest;

/// Run a direct build of every configured target.
pub fn run(
    project_dir: &Path,
    manifest: &ProjectManifest,
    jobs: Option<usize>,
    keep_going: bool,
) -> Result<()> {
    // Entity paths are project-relative; the toolchain runs from the
    // project root.
    std::env::set_current_dir(project_dir)
        .with_context(|| format!("entering {}", project_dir.display()))?;

    let config = manifest.to_config()?;
    let ctx = build_context(&config)?;
    let solution = assemble(&ctx, &config, &manifest.modules)?;

    println!(
        "Building {} {} for {}",
        manifest.project.name, manifest.project.version, ctx.platform.os_id
    );

    let mut policy = ExecPolicy {
        keep_going,
        ..ExecPolicy::default()
    };
    if let Some(jobs) = jobs {
        policy.jobs = jobs.max(1);
    }

    let report = tarn_exec::run(&ctx, &solution, &policy)?;
    for outcome in &report.targets {
        match outcome.status {
            TargetStatus::Built => println!("  built    {}", outcome.name),
            TargetStatus::Skipped => println!("  skipped  {}", outcome.name),
            TargetStatus::Failed => {
                eprintln!("  failed   {}", outcome.name);
                if let Some(detail) = &outcome.detail {
                    eprintln!("{detail}");
                }
            }
        }
    }
    println!("{}", report.summary());

    if !report.success() {
        bail!("build failed");
    }
    Ok(())
}
