//! Invocation records and the compile/link request inputs.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::flag::{DebugMode, Flag, OptLevel};

/// A concrete process invocation: program, ordered arguments, working dir.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Command {
    /// Program to execute.
    pub program: PathBuf,
    /// Ordered argument vector, excluding the program itself.
    pub args: Vec<String>,
    /// Working directory, or the caller's if absent.
    pub cwd: Option<PathBuf>,
}

impl Command {
    /// A command with no working-directory override.
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            cwd: None,
        }
    }

    /// Render as a single shell-style line for diagnostics and build files.
    pub fn display_line(&self) -> String {
        let mut line = self.program.display().to_string();
        for arg in &self.args {
            line.push(' ');
            if arg.contains(' ') {
                line.push('"');
                line.push_str(arg);
                line.push('"');
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

/// Everything a compiler needs to turn one source file into one object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompileRequest {
    /// Source file path.
    pub source: PathBuf,
    /// Object file output path.
    pub output: PathBuf,
    /// Include directories, in order.
    pub includes: Vec<PathBuf>,
    /// Preprocessor definitions (`NAME` or `NAME=VALUE`).
    pub definitions: Vec<String>,
    /// Extra flags (projected per family at command construction).
    pub flags: Vec<Flag>,
    /// Optimization level.
    pub optimization: OptLevel,
    /// Debug mode.
    pub debug: DebugMode,
    /// Language dialect token (e.g., "c99"), if pinned.
    pub standard: Option<String>,
    /// Whether position-independent code is required (dynamic library member).
    pub pic: bool,
}

/// What kind of artifact a link step produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkKind {
    /// Archive of objects (`ar` / `lib`).
    StaticLibrary,
    /// Shared/dynamic library.
    DynamicLibrary,
    /// Executable application.
    Application,
}

/// Everything a linker needs to produce one artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRequest {
    /// Artifact kind.
    pub kind: LinkKind,
    /// Output artifact path.
    pub output: PathBuf,
    /// Object files, in first-discovery order (order-sensitive linkers).
    pub objects: Vec<PathBuf>,
    /// Pre-built library files appended after the objects.
    pub extern_libs: Vec<PathBuf>,
    /// Extra linker flags (projected per family).
    pub ldflags: Vec<Flag>,
    /// Named system libraries (`-lNAME` / `NAME.lib`).
    pub libraries: Vec<String>,
    /// Library search directories.
    pub searches: Vec<PathBuf>,
    /// Whether to prefer static linking of system libraries.
    pub statik: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_line_quotes_spaces() {
        let cmd = Command::new(
            "gcc",
            vec!["-DVERSION=tarn 1.0".to_string(), "-c".to_string()],
        );
        assert_eq!(cmd.display_line(), "gcc \"-DVERSION=tarn 1.0\" -c");
    }
}
