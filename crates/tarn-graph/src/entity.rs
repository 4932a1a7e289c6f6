//! The build entity model: one closed variant set, arena handles.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tarn_platform::TargetPlatform;
use tarn_toolchain::{DebugMode, Flag, LinkKind, OptLevel};

/// Handle to an entity inside its owning [`crate::Solution`] arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub usize);

/// Fields shared by every entity variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommonProps {
    /// Entity name (unique within a solution by convention).
    pub name: String,
    /// Include directories.
    pub includes: Vec<PathBuf>,
    /// Preprocessor definitions.
    pub definitions: Vec<String>,
    /// Compiler flags: project-wide flags first, entity-specific last, so
    /// modules can override project defaults.
    pub cflags: Vec<Flag>,
    /// Optimization level.
    pub optimization: OptLevel,
    /// Debug mode.
    pub debug: DebugMode,
    /// Language dialect token, if pinned.
    pub standard: Option<String>,
}

impl CommonProps {
    /// Minimal props with just a name; builders fill in the rest.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            includes: Vec::new(),
            definitions: Vec::new(),
            cflags: Vec::new(),
            optimization: OptLevel::Off,
            debug: DebugMode::Off,
            standard: None,
        }
    }
}

/// An ordered auxiliary action run after an entity's primary action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostBuildCommand {
    /// Strip symbols from a produced file.
    Strip {
        /// File to strip.
        file: PathBuf,
    },
    /// Delete a file.
    Delete {
        /// Path to delete.
        path: PathBuf,
    },
    /// Create a directory (and parents).
    CreateDir {
        /// Directory to create.
        path: PathBuf,
    },
}

/// Link-capable entity fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkProps {
    /// Direct dependencies.
    pub depends: Vec<EntityId>,
    /// Output artifact path.
    pub output: PathBuf,
    /// Linker flags.
    pub ldflags: Vec<Flag>,
    /// Named system libraries.
    pub libraries: Vec<String>,
    /// Library search directories.
    pub searches: Vec<PathBuf>,
    /// Prefer static linking of system libraries.
    pub statik: bool,
    /// Actions run after a successful link.
    pub post_build: Vec<PostBuildCommand>,
}

impl LinkProps {
    /// Props with only dependencies and an output set.
    pub fn new(depends: Vec<EntityId>, output: impl Into<PathBuf>) -> Self {
        Self {
            depends,
            output: output.into(),
            ldflags: Vec::new(),
            libraries: Vec::new(),
            searches: Vec::new(),
            statik: false,
            post_build: Vec::new(),
        }
    }
}

/// The closed set of entity variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    /// One source file compiling to one object file.
    ObjectFile {
        /// Source path.
        source: PathBuf,
        /// Object output path (platform-namespaced, deterministic).
        output: PathBuf,
        /// Position-independent code (dynamic-library member).
        pic: bool,
    },
    /// A named group of objects, not yet linked. Lets one module's objects
    /// feed both a builtin link and a standalone dynamic library.
    ObjectLibrary {
        /// Member objects and nested groups.
        depends: Vec<EntityId>,
    },
    /// Archive of objects.
    StaticLibrary(LinkProps),
    /// Loadable shared library.
    DynamicLibrary(LinkProps),
    /// Executable application.
    Application(LinkProps),
    /// A pre-built library referenced by path, never compiled here.
    ExternalLibrary {
        /// Library file path.
        output: PathBuf,
        /// Whether the reference is to a static archive.
        statik: bool,
    },
}

/// One node of the build graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    /// Shared fields.
    pub common: CommonProps,
    /// Variant payload.
    pub kind: EntityKind,
}

impl Entity {
    /// Direct dependencies, empty for leaves.
    pub fn depends(&self) -> &[EntityId] {
        match &self.kind {
            EntityKind::ObjectLibrary { depends } => depends,
            EntityKind::StaticLibrary(link)
            | EntityKind::DynamicLibrary(link)
            | EntityKind::Application(link) => &link.depends,
            EntityKind::ObjectFile { .. } | EntityKind::ExternalLibrary { .. } => &[],
        }
    }

    /// The artifact this entity produces, if any.
    pub fn output(&self) -> Option<&Path> {
        match &self.kind {
            EntityKind::ObjectFile { output, .. } | EntityKind::ExternalLibrary { output, .. } => {
                Some(output)
            }
            EntityKind::StaticLibrary(link)
            | EntityKind::DynamicLibrary(link)
            | EntityKind::Application(link) => Some(&link.output),
            EntityKind::ObjectLibrary { .. } => None,
        }
    }

    /// The link-step kind, for link-capable entities.
    pub fn link_kind(&self) -> Option<LinkKind> {
        match &self.kind {
            EntityKind::StaticLibrary(_) => Some(LinkKind::StaticLibrary),
            EntityKind::DynamicLibrary(_) => Some(LinkKind::DynamicLibrary),
            EntityKind::Application(_) => Some(LinkKind::Application),
            _ => None,
        }
    }

    /// The link props, for link-capable entities.
    pub fn link_props(&self) -> Option<&LinkProps> {
        match &self.kind {
            EntityKind::StaticLibrary(link)
            | EntityKind::DynamicLibrary(link)
            | EntityKind::Application(link) => Some(link),
            _ => None,
        }
    }
}

/// Compute the object output path for a source file.
///
/// The result is `objs_dir/<os_id>[/shared]/<source relative to base_dir>`
/// with the extension swapped for the platform's object suffix. The os-id
/// namespace guarantees that the same source never collides across
/// platforms; the `shared` namespace separates PIC re-specializations.
pub fn object_output_path(
    platform: &TargetPlatform,
    source: &Path,
    base_dir: &Path,
    objs_dir: &Path,
    pic: bool,
) -> PathBuf {
    let relative = source.strip_prefix(base_dir).unwrap_or(source);
    let mut out = objs_dir.join(&platform.os_id);
    if pic {
        out.push("shared");
    }
    out.push(relative);
    let stem = out
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    out.set_file_name(format!("{}{}", stem, platform.obj_suffix));
    out
}

/// Platform-conventional file name for a linked artifact.
pub fn artifact_file_name(platform: &TargetPlatform, name: &str, kind: LinkKind) -> String {
    match (kind, platform.base) {
        (LinkKind::StaticLibrary, tarn_platform::OsBase::Unix) => {
            format!("lib{}{}", name, platform.static_lib_suffix)
        }
        (LinkKind::StaticLibrary, tarn_platform::OsBase::Windows) => {
            format!("{}{}", name, platform.static_lib_suffix)
        }
        (LinkKind::DynamicLibrary, tarn_platform::OsBase::Unix) => {
            format!("lib{}{}", name, platform.dll_suffix)
        }
        (LinkKind::DynamicLibrary, tarn_platform::OsBase::Windows) => {
            format!("{}{}", name, platform.dll_suffix)
        }
        (LinkKind::Application, _) => format!("{}{}", name, platform.exe_suffix),
    }
}
