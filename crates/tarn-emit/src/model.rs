//! The backend-neutral generation model.
//!
//! Flattens every target once and dedups object rules by output path, so
//! a shared object library produces one rule no matter how many targets
//! reach it. Backends only render; they never re-derive graph structure.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tarn_graph::{flatten, PostBuildCommand, Solution};
use tarn_toolchain::{BuildContext, Command, LinkKind};

use crate::error::Result;

/// One object-file rule: output, source, concrete compile command.
#[derive(Debug, Clone)]
pub struct ObjectRule {
    /// Object output path.
    pub output: PathBuf,
    /// Source file.
    pub source: PathBuf,
    /// The full compile command (program + args).
    pub command: Command,
}

/// One top-level target and its link rule.
#[derive(Debug, Clone)]
pub struct TargetRule {
    /// Target name (phony rule / project name).
    pub name: String,
    /// Linked artifact path, absent for plain object groups.
    pub artifact: Option<PathBuf>,
    /// Artifact kind, when linked.
    pub kind: Option<LinkKind>,
    /// Object inputs in first-discovery order.
    pub objects: Vec<PathBuf>,
    /// Pre-built/nested library inputs.
    pub extern_libs: Vec<PathBuf>,
    /// The full link command, when linked.
    pub link_command: Option<Command>,
    /// Post-build actions, in order.
    pub post_build: Vec<PostBuildCommand>,
    /// Names of targets this target depends on.
    pub dep_targets: Vec<String>,
}

/// The complete, deduplicated view a backend renders from.
#[derive(Debug, Clone)]
pub struct GenModel {
    /// Targets in solution registration order.
    pub targets: Vec<TargetRule>,
    /// Object rules in first-discovery order, one per output path.
    pub objects: Vec<ObjectRule>,
    /// Output directories, parents first.
    pub dirs: Vec<PathBuf>,
}

impl GenModel {
    /// The application artifact, when the solution has one.
    pub fn application(&self) -> Option<&TargetRule> {
        self.targets
            .iter()
            .find(|t| t.kind == Some(LinkKind::Application))
    }

    /// Outermost output directories: removing them removes every object
    /// and artifact. Nested dirs fold into their parent, so `clean` rules
    /// stay short wherever the solution is rooted.
    pub fn clean_roots(&self) -> Vec<&Path> {
        let mut roots: Vec<&Path> = Vec::new();
        // `dirs` is sorted, so parents precede their children.
        for dir in &self.dirs {
            if !roots.iter().any(|r| dir.starts_with(r)) {
                roots.push(dir);
            }
        }
        roots
    }
}

/// Build the generation model for a solution.
pub fn build_model(ctx: &BuildContext, solution: &Solution) -> Result<GenModel> {
    // Validate the target graph up front; generation shares the execution
    // backend's cycle rules.
    solution.topological_order()?;

    let mut targets = Vec::new();
    let mut objects: Vec<ObjectRule> = Vec::new();
    let mut seen_objects: HashSet<PathBuf> = HashSet::new();
    let mut dirs: Vec<PathBuf> = Vec::new();
    let mut seen_dirs: HashSet<PathBuf> = HashSet::new();

    for (index, target) in solution.targets().iter().enumerate() {
        let plan = flatten(solution, target.root)?;

        for step in &plan.compile_steps {
            if seen_objects.insert(step.request.output.clone()) {
                objects.push(ObjectRule {
                    output: step.request.output.clone(),
                    source: step.request.source.clone(),
                    command: ctx.compiler.compile_command(&step.request),
                });
            }
        }
        for dir in &plan.dirs {
            if seen_dirs.insert(dir.clone()) {
                dirs.push(dir.clone());
            }
        }

        let entity = solution.entity(target.root)?;
        let post_build = entity
            .link_props()
            .map(|l| l.post_build.clone())
            .unwrap_or_default();

        let dep_targets = solution
            .target_dependencies(index)?
            .into_iter()
            .map(|j| solution.targets()[j].name.clone())
            .collect();

        let (artifact, kind, objects_in, extern_in, link_command) = match &plan.link_step {
            Some(link) => (
                Some(link.request.output.clone()),
                Some(link.request.kind),
                link.request.objects.clone(),
                link.request.extern_libs.clone(),
                Some(ctx.linker.link_command(&link.request)),
            ),
            None => (
                None,
                None,
                plan.compile_steps
                    .iter()
                    .map(|s| s.request.output.clone())
                    .collect(),
                Vec::new(),
                None,
            ),
        };

        targets.push(TargetRule {
            name: target.name.clone(),
            artifact,
            kind,
            objects: objects_in,
            extern_libs: extern_in,
            link_command,
            post_build,
            dep_targets,
        });
    }

    dirs.sort();
    Ok(GenModel {
        targets,
        objects,
        dirs,
    })
}
