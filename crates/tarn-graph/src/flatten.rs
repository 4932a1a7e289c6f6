//! The dependency flattener: entity closure → executable plan.

use std::collections::HashSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tarn_toolchain::{CompileRequest, LinkRequest};

use crate::entity::{EntityId, EntityKind};
use crate::error::{GraphError, Result};
use crate::solution::Solution;

/// One source→object compilation, ready for command construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileStep {
    /// Name of the entity the step belongs to.
    pub entity: String,
    /// The compiler input.
    pub request: CompileRequest,
}

/// The single link action of a plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkStep {
    /// Name of the link-capable entity.
    pub entity: String,
    /// The linker input.
    pub request: LinkRequest,
}

/// Flattened, ready-to-execute actions for one entity's closure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Deduplicated compile steps in first-discovery order.
    pub compile_steps: Vec<CompileStep>,
    /// Output directories to create, parents before children.
    pub dirs: Vec<PathBuf>,
    /// The link step, absent for plain object groups.
    pub link_step: Option<LinkStep>,
}

struct Flattener<'a> {
    solution: &'a Solution,
    // Dedup is keyed by output path, not identity: a shared object library
    // reached through two paths contributes its objects once.
    visited_outputs: HashSet<PathBuf>,
    on_stack: HashSet<EntityId>,
    target_roots: HashSet<EntityId>,
    compile_steps: Vec<CompileStep>,
    objects: Vec<PathBuf>,
    extern_libs: Vec<PathBuf>,
}

impl<'a> Flattener<'a> {
    fn new(solution: &'a Solution) -> Self {
        Self {
            solution,
            visited_outputs: HashSet::new(),
            on_stack: HashSet::new(),
            target_roots: solution.targets().iter().map(|t| t.root).collect(),
            compile_steps: Vec::new(),
            objects: Vec::new(),
            extern_libs: Vec::new(),
        }
    }

    fn visit(&mut self, id: EntityId, root: EntityId) -> Result<()> {
        let entity = self.solution.entity(id)?;
        if self.on_stack.contains(&id) {
            return Err(GraphError::CyclicDependency {
                name: entity.common.name.clone(),
            });
        }
        match &entity.kind {
            EntityKind::ObjectFile {
                source,
                output,
                pic,
            } => {
                if self.visited_outputs.insert(output.clone()) {
                    self.objects.push(output.clone());
                    self.compile_steps.push(CompileStep {
                        entity: entity.common.name.clone(),
                        request: CompileRequest {
                            source: source.clone(),
                            output: output.clone(),
                            includes: entity.common.includes.clone(),
                            definitions: entity.common.definitions.clone(),
                            flags: entity.common.cflags.clone(),
                            optimization: entity.common.optimization,
                            debug: entity.common.debug,
                            standard: entity.common.standard.clone(),
                            pic: *pic,
                        },
                    });
                }
            }
            EntityKind::ObjectLibrary { depends } => {
                self.on_stack.insert(id);
                for &dep in depends {
                    self.visit(dep, root)?;
                }
                self.on_stack.remove(&id);
            }
            EntityKind::ExternalLibrary { output, .. } => {
                if self.visited_outputs.insert(output.clone()) {
                    self.extern_libs.push(output.clone());
                }
            }
            // A nested link-capable entity is a plan boundary: its artifact
            // joins this link line, its own compilation belongs to its own
            // plan (and target-level ordering runs it first). That only
            // holds when some target actually builds the artifact.
            EntityKind::StaticLibrary(link)
            | EntityKind::DynamicLibrary(link)
            | EntityKind::Application(link) => {
                if id == root {
                    self.on_stack.insert(id);
                    for &dep in &link.depends {
                        self.visit(dep, root)?;
                    }
                    self.on_stack.remove(&id);
                } else {
                    if !self.target_roots.contains(&id) {
                        return Err(GraphError::UnresolvedLibrary {
                            name: entity.common.name.clone(),
                        });
                    }
                    if self.visited_outputs.insert(link.output.clone()) {
                        self.extern_libs.push(link.output.clone());
                    }
                }
            }
        }
        Ok(())
    }
}

/// Flatten `root`'s dependency closure into a [`Plan`].
///
/// Depth-first over `depends`; an entity revisited while still on the
/// active stack raises [`GraphError::CyclicDependency`], and a nested
/// library that no registered target builds raises
/// [`GraphError::UnresolvedLibrary`]. Nothing outside the closure is
/// pulled in, and flattening never mutates the solution, so repeated
/// calls yield identical plans.
pub fn flatten(solution: &Solution, root: EntityId) -> Result<Plan> {
    let mut fl = Flattener::new(solution);
    fl.visit(root, root)?;

    let root_entity = solution.entity(root)?;
    let link_step = match (root_entity.link_kind(), root_entity.link_props()) {
        (Some(kind), Some(link)) => Some(LinkStep {
            entity: root_entity.common.name.clone(),
            request: LinkRequest {
                kind,
                output: link.output.clone(),
                objects: fl.objects.clone(),
                extern_libs: fl.extern_libs.clone(),
                ldflags: link.ldflags.clone(),
                libraries: link.libraries.clone(),
                searches: link.searches.clone(),
                statik: link.statik,
            },
        }),
        _ => None,
    };

    // Every distinct output directory, parents before children.
    let mut dirs: Vec<PathBuf> = Vec::new();
    let mut seen_dirs = HashSet::new();
    let outputs = fl
        .compile_steps
        .iter()
        .map(|s| s.request.output.clone())
        .chain(link_step.iter().map(|l| l.request.output.clone()));
    for output in outputs {
        if let Some(parent) = output.parent() {
            if !parent.as_os_str().is_empty() && seen_dirs.insert(parent.to_path_buf()) {
                dirs.push(parent.to_path_buf());
            }
        }
    }
    dirs.sort();

    Ok(Plan {
        compile_steps: fl.compile_steps,
        dirs,
        link_step,
    })
}
