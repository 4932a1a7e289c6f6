//! The solution: entity arena plus named top-level targets.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::entity::{Entity, EntityId};
use crate::error::{GraphError, Result};

/// A named top-level build target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Target name as it appears in generated build files.
    pub name: String,
    /// Root entity of the target.
    pub root: EntityId,
}

/// Entity arena and the ordered set of top-level targets.
///
/// Entities are constructed once and never mutated afterwards; flattening
/// derives separate plans, so re-flattening the same solution is
/// idempotent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Solution {
    entities: Vec<Entity>,
    targets: Vec<Target>,
}

impl Solution {
    /// An empty solution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entity to the arena, returning its handle.
    pub fn add_entity(&mut self, entity: Entity) -> EntityId {
        let id = EntityId(self.entities.len());
        self.entities.push(entity);
        id
    }

    /// Resolve a handle.
    pub fn entity(&self, id: EntityId) -> Result<&Entity> {
        self.entities
            .get(id.0)
            .ok_or(GraphError::UnknownEntity { index: id.0 })
    }

    /// Number of entities in the arena.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Register a top-level target.
    pub fn add_target(&mut self, name: impl Into<String>, root: EntityId) {
        self.targets.push(Target {
            name: name.into(),
            root,
        });
    }

    /// Top-level targets in registration order.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// The set of entities reachable from `root` through `depends`,
    /// including `root` itself. Never pulls in anything outside the
    /// closure.
    pub fn reachable(&self, root: EntityId) -> Result<HashSet<EntityId>> {
        let mut seen = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            for &dep in self.entity(id)?.depends() {
                stack.push(dep);
            }
        }
        Ok(seen)
    }

    /// Order targets so that every target precedes the targets that depend
    /// on it. Deterministic: ties break on registration order. Fails with
    /// [`GraphError::CyclicDependency`] when the target graph has a cycle.
    ///
    /// Target A depends on target B when B's root entity is reachable from
    /// A's root through `depends`.
    pub fn topological_order(&self) -> Result<Vec<usize>> {
        let root_to_index: HashMap<EntityId, usize> = self
            .targets
            .iter()
            .enumerate()
            .map(|(i, t)| (t.root, i))
            .collect();

        // dependents[i] lists targets that depend on target i.
        let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); self.targets.len()];
        let mut in_degree = vec![0usize; self.targets.len()];
        for (i, target) in self.targets.iter().enumerate() {
            let closure = self.reachable(target.root)?;
            for (&root, &j) in &root_to_index {
                if j != i && closure.contains(&root) {
                    dependents[j].push(i);
                    in_degree[i] += 1;
                }
            }
        }

        // Kahn's algorithm with a sorted ready queue for determinism.
        let mut queue: Vec<usize> = (0..self.targets.len())
            .filter(|&i| in_degree[i] == 0)
            .collect();
        queue.sort_unstable_by(|a, b| b.cmp(a));

        let mut order = Vec::with_capacity(self.targets.len());
        while let Some(i) = queue.pop() {
            order.push(i);
            for &j in &dependents[i] {
                in_degree[j] -= 1;
                if in_degree[j] == 0 {
                    queue.push(j);
                }
            }
            queue.sort_unstable_by(|a, b| b.cmp(a));
        }

        if order.len() != self.targets.len() {
            let stuck = (0..self.targets.len())
                .find(|&i| in_degree[i] > 0)
                .unwrap_or(0);
            return Err(GraphError::CyclicDependency {
                name: self.targets[stuck].name.clone(),
            });
        }
        Ok(order)
    }

    /// Direct target-level dependencies of the target at `index`: indices
    /// of targets whose root is reachable from this target's root.
    pub fn target_dependencies(&self, index: usize) -> Result<Vec<usize>> {
        let closure = self.reachable(self.targets[index].root)?;
        Ok(self
            .targets
            .iter()
            .enumerate()
            .filter(|(j, t)| *j != index && closure.contains(&t.root))
            .map(|(j, _)| j)
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::{CommonProps, EntityKind, LinkProps};
    use std::path::PathBuf;

    fn object(sol: &mut Solution, name: &str) -> EntityId {
        sol.add_entity(Entity {
            common: CommonProps::named(name),
            kind: EntityKind::ObjectFile {
                source: PathBuf::from(format!("src/{name}.c")),
                output: PathBuf::from(format!("objs/linux/{name}.o")),
                pic: false,
            },
        })
    }

    fn application(sol: &mut Solution, name: &str, depends: Vec<EntityId>) -> EntityId {
        sol.add_entity(Entity {
            common: CommonProps::named(name),
            kind: EntityKind::Application(LinkProps::new(depends, format!("bin/{name}"))),
        })
    }

    #[test]
    fn reachable_is_the_depends_closure() {
        let mut sol = Solution::new();
        let a = object(&mut sol, "a");
        let b = object(&mut sol, "b");
        let unrelated = object(&mut sol, "c");
        let app = application(&mut sol, "app", vec![a, b]);

        let closure = sol.reachable(app).unwrap();
        assert!(closure.contains(&app));
        assert!(closure.contains(&a));
        assert!(closure.contains(&b));
        assert!(!closure.contains(&unrelated));
    }

    #[test]
    fn topological_order_puts_dependencies_first() {
        let mut sol = Solution::new();
        let core_obj = object(&mut sol, "core");
        let lib = sol.add_entity(Entity {
            common: CommonProps::named("libtarn"),
            kind: EntityKind::StaticLibrary(LinkProps::new(vec![core_obj], "lib/libtarn.a")),
        });
        let app = application(&mut sol, "tarn", vec![lib]);
        // Register the application first so ordering has work to do.
        sol.add_target("tarn", app);
        sol.add_target("libtarn", lib);

        let order = sol.topological_order().unwrap();
        let pos_lib = order.iter().position(|&i| sol.targets()[i].name == "libtarn");
        let pos_app = order.iter().position(|&i| sol.targets()[i].name == "tarn");
        assert!(pos_lib < pos_app);
    }

    #[test]
    fn target_cycle_is_reported() {
        let mut sol = Solution::new();
        // Manufacture X depends on Y, Y depends on X via placeholder links.
        let x = sol.add_entity(Entity {
            common: CommonProps::named("x"),
            kind: EntityKind::Application(LinkProps::new(vec![EntityId(1)], "bin/x")),
        });
        let y = sol.add_entity(Entity {
            common: CommonProps::named("y"),
            kind: EntityKind::Application(LinkProps::new(vec![EntityId(0)], "bin/y")),
        });
        sol.add_target("x", x);
        sol.add_target("y", y);

        let err = sol.topological_order().unwrap_err();
        assert!(matches!(err, GraphError::CyclicDependency { .. }));
    }

    #[test]
    fn order_is_deterministic_for_independent_targets() {
        let mut sol = Solution::new();
        let a = object(&mut sol, "a");
        let b = object(&mut sol, "b");
        let app_a = application(&mut sol, "first", vec![a]);
        let app_b = application(&mut sol, "second", vec![b]);
        sol.add_target("first", app_a);
        sol.add_target("second", app_b);

        // Independent targets keep registration order, run after run.
        assert_eq!(sol.topological_order().unwrap(), vec![0, 1]);
        assert_eq!(sol.topological_order().unwrap(), vec![0, 1]);
    }

    #[test]
    fn unknown_handle_is_an_error() {
        let sol = Solution::new();
        assert!(matches!(
            sol.entity(EntityId(7)),
            Err(GraphError::UnknownEntity { index: 7 })
        ));
    }
}
