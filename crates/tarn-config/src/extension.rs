//! Extension selections and module descriptors.
//!
//! An extension is a named group of runtime modules that is either compiled
//! into the application (builtin), built as a loadable shared library
//! (dynamic), or left out entirely (excluded).

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tarn_toolchain::Flag;

use crate::error::{ConfigError, Result};

/// How a selected extension is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExtensionMode {
    /// Compiled into the main application (`+` prefix).
    Builtin,
    /// Built as a separately loadable dynamic library (`*` prefix).
    Dynamic,
    /// Not built at all (`-` prefix).
    Excluded,
}

/// One extension selection from the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionSelection {
    /// Build mode.
    pub mode: ExtensionMode,
    /// Extension name.
    pub name: String,
    /// Names of the modules the extension is composed of.
    pub modules: Vec<String>,
}

impl ExtensionSelection {
    /// Parse a selection token of the form `+name`, `*name` or `-name`.
    ///
    /// The module list follows the token in the configuration syntax and is
    /// supplied separately by the caller.
    pub fn parse(token: &str, modules: Vec<String>) -> Result<Self> {
        let mut chars = token.chars();
        let mode = match chars.next() {
            Some('+') => ExtensionMode::Builtin,
            Some('*') => ExtensionMode::Dynamic,
            Some('-') => ExtensionMode::Excluded,
            _ => {
                return Err(ConfigError::MalformedExtension {
                    token: token.to_string(),
                })
            }
        };
        let name: String = chars.collect();
        if name.is_empty() {
            return Err(ConfigError::MalformedExtension {
                token: token.to_string(),
            });
        }
        Ok(Self {
            mode,
            name,
            modules,
        })
    }
}

/// A dependency file of a module, optionally with per-file tagged flags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleFile {
    /// Source file path.
    pub path: PathBuf,
    /// Extra flags applied only when compiling this file.
    #[serde(default)]
    pub flags: Vec<Flag>,
}

impl ModuleFile {
    /// A file with no per-file flags.
    pub fn plain(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            flags: Vec::new(),
        }
    }
}

/// Descriptor for one runtime module: its sources and build inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSpec {
    /// Module name (unique within the project).
    pub name: String,
    /// Primary source file.
    pub source: PathBuf,
    /// Extra dependency files, each optionally carrying per-file flags.
    #[serde(default)]
    pub files: Vec<ModuleFile>,
    /// Module-specific include directories.
    #[serde(default)]
    pub includes: Vec<PathBuf>,
    /// Module-specific preprocessor definitions.
    #[serde(default)]
    pub definitions: Vec<String>,
    /// System libraries the module needs at link time.
    #[serde(default)]
    pub libraries: Vec<String>,
}

impl ModuleSpec {
    /// All source files of the module: the primary source then the extras.
    pub fn all_files(&self) -> Vec<ModuleFile> {
        let mut files = vec![ModuleFile::plain(self.source.clone())];
        files.extend(self.files.iter().cloned());
        files
    }
}
