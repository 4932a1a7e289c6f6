//! Build entity model and dependency flattener for the Tarn build engine.
//!
//! Entities (object files, object libraries, static/dynamic libraries,
//! applications, external library references) live in an arena owned by a
//! [`Solution`] and are referenced by integer handles. The flattener turns
//! one entity's dependency closure into a [`Plan`]: ordered, deduplicated
//! compile steps, the output directories they need, and at most one link
//! step. Assembly instantiates the whole entity graph from the validated
//! configuration and the module descriptors.

pub mod assemble;
pub mod entity;
pub mod error;
pub mod flatten;
pub mod solution;

pub use assemble::{assemble, build_context};
pub use entity::{
    artifact_file_name, object_output_path, CommonProps, Entity, EntityId, EntityKind, LinkProps,
    PostBuildCommand,
};
pub use error::{GraphError, Result};
pub use flatten::{flatten, CompileStep, LinkStep, Plan};
pub use solution::{Solution, Target};
