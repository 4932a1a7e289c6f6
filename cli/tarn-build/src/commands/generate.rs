//! `tarn-build generate` — serialize the graph to a build-file format.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tarn_emit::{Generator, MakefileGenerator, NmakeGenerator, VisualStudioGenerator};
use tarn_graph::{assemble, build_context};

use crate::manifest::ProjectManifest;

/// Generate build files for the configured solution.
pub fn run(
    project_dir: &Path,
    manifest: &ProjectManifest,
    format: &str,
    out: Option<&Path>,
) -> Result<()> {
    let config = manifest.to_config()?;
    let ctx = build_context(&config)?;
    let solution = assemble(&ctx, &config, &manifest.modules)?;

    let (generator, default_out): (Box<dyn Generator>, &str) = match format {
        "make" => (Box::new(MakefileGenerator), "Makefile"),
        "nmake" => (Box::new(NmakeGenerator), "Makefile.nmake"),
        "vs" => (Box::new(VisualStudioGenerator), "vs"),
        other => bail!("unknown format `{other}` (expected make, nmake or vs)"),
    };
    let out = match out {
        Some(path) => path.to_path_buf(),
        None => project_dir.join(default_out),
    };
    generator
        .generate(&out, &ctx, &solution)
        .with_context(|| format!("writing {}", out.display()))?;

    println!("Generated {} ({format})", out.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
[project]
name = "gen-test"

[build]
platform = "linux"
toolset = ["gcc", "ld"]

[[module]]
name = "vm"
source = "src/vm.c"
"#;

    #[test]
    fn generate_writes_a_makefile() {
        let manifest = ProjectManifest::from_str(MANIFEST).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("Makefile");

        run(dir.path(), &manifest, "make", Some(&out)).unwrap();

        let text = std::fs::read_to_string(&out).unwrap();
        assert!(text.contains("all: "));
        assert!(text.contains("CC = gcc"));
    }

    #[test]
    fn generate_vs_writes_solution_directory() {
        let manifest = ProjectManifest::from_str(MANIFEST).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("vs");

        run(dir.path(), &manifest, "vs", Some(&out)).unwrap();
        assert!(out.join("tarn.sln").is_file());
    }

    #[test]
    fn unknown_format_is_rejected() {
        let manifest = ProjectManifest::from_str(MANIFEST).unwrap();
        let dir = tempfile::tempdir().unwrap();
        assert!(run(dir.path(), &manifest, "xcode", None).is_err());
    }
}
