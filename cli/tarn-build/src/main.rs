//! Tarn build engine CLI.

mod commands;
mod manifest;

use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};

use manifest::ProjectManifest;

#[derive(Parser)]
#[command(name = "tarn-build", version, about = "Build engine for the Tarn language runtime")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build every configured target by invoking the toolchain directly
    Build {
        /// Maximum parallel compile steps (default: all cores)
        #[arg(long)]
        jobs: Option<usize>,
        /// Keep building independent targets after a failure
        #[arg(long)]
        keep_going: bool,
    },
    /// Generate build files instead of building
    Generate {
        /// Output format (make, nmake, vs)
        #[arg(long)]
        format: String,
        /// Output path (a file for make/nmake, a directory for vs)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Print the flattened build plan without running anything
    Plan {
        /// Only this target (all targets if omitted)
        #[arg(long)]
        target: Option<String>,
        /// Emit JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e:#}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let cwd = std::env::current_dir()?;
    let (manifest, project_dir) = load_manifest(&cwd)?;

    match cli.command {
        Commands::Build { jobs, keep_going } => {
            commands::build::run(&project_dir, &manifest, jobs, keep_going)
        }
        Commands::Generate { format, out } => {
            commands::generate::run(&project_dir, &manifest, &format, out.as_deref())
        }
        Commands::Plan { target, json } => commands::plan::run(&manifest, target.as_deref(), json),
    }
}

/// Load the manifest from the current directory upward.
fn load_manifest(cwd: &Path) -> anyhow::Result<(ProjectManifest, PathBuf)> {
    match ProjectManifest::find_and_load(cwd)? {
        Some(found) => Ok(found),
        None => anyhow::bail!(
            "no tarn.toml found in {} or any parent directory",
            cwd.display()
        ),
    }
}
