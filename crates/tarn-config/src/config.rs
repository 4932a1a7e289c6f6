//! The build configuration record and its raw manifest forms.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tarn_toolchain::{DebugMode, Flag, OptLevel};

use crate::error::{ConfigError, Result};
use crate::extension::ExtensionSelection;

/// One toolset entry: a tool token with an optional executable override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToolSelection {
    /// Bare token, default executable (e.g., `"gcc"`).
    Token(String),
    /// Token plus an explicit executable path.
    Detailed {
        /// Tool token (`gcc`, `clang`, `cl`, `ld`, `llvm-link`, `link`,
        /// `strip`, `tcc`).
        tool: String,
        /// Executable path override.
        path: PathBuf,
    },
}

impl ToolSelection {
    /// The tool token.
    pub fn token(&self) -> &str {
        match self {
            ToolSelection::Token(t) => t,
            ToolSelection::Detailed { tool, .. } => tool,
        }
    }

    /// The path override, if any.
    pub fn path_override(&self) -> Option<&PathBuf> {
        match self {
            ToolSelection::Token(_) => None,
            ToolSelection::Detailed { path, .. } => Some(path),
        }
    }
}

/// The `optimize` value as it appears in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawOptimize {
    /// `false` disables optimization; `true` means level 2.
    Enabled(bool),
    /// Numeric level `0..=4`.
    Level(i64),
    /// `"s"` optimizes for size.
    Token(String),
}

impl RawOptimize {
    /// Validate into the engine-level optimization level.
    pub fn resolve(&self) -> Result<OptLevel> {
        match self {
            RawOptimize::Enabled(false) => Ok(OptLevel::Off),
            RawOptimize::Enabled(true) => Ok(OptLevel::Level(2)),
            RawOptimize::Level(n @ 0..=4) => Ok(OptLevel::Level(*n as u8)),
            RawOptimize::Level(n) => Err(ConfigError::InvalidOptimize {
                value: n.to_string(),
            }),
            RawOptimize::Token(s) if s == "s" => Ok(OptLevel::Size),
            RawOptimize::Token(s) => Err(ConfigError::InvalidOptimize { value: s.clone() }),
        }
    }
}

/// The `debug` value as it appears in the manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawDebug {
    /// `true` is a full debug build, `false` none.
    Enabled(bool),
    /// A named mode: `symbols`, `sanitize`, `callgrind`, `asserts`.
    Token(String),
}

impl RawDebug {
    /// Validate into the engine-level debug mode.
    pub fn resolve(&self) -> Result<DebugMode> {
        match self {
            RawDebug::Enabled(false) => Ok(DebugMode::Off),
            RawDebug::Enabled(true) => Ok(DebugMode::Full),
            RawDebug::Token(s) => match s.as_str() {
                "symbols" => Ok(DebugMode::Symbols),
                "sanitize" => Ok(DebugMode::Sanitize),
                "callgrind" => Ok(DebugMode::Callgrind),
                "asserts" => Ok(DebugMode::Asserts),
                _ => Err(ConfigError::InvalidDebug { value: s.clone() }),
            },
        }
    }
}

/// The validated configuration record consumed by the engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Target OS identifier (resolved against the platform registry).
    pub os_id: String,
    /// Ordered toolset selection.
    pub toolset: Vec<ToolSelection>,
    /// Optimization level.
    pub optimize: OptLevel,
    /// Debug mode.
    pub debug: DebugMode,
    /// Language dialect token, if pinned.
    #[serde(default)]
    pub standard: Option<String>,
    /// Prefer static linking.
    #[serde(default, rename = "static")]
    pub statik: bool,
    /// Stricter per-family warning sets.
    #[serde(default)]
    pub rigorous: bool,
    /// Build the libffi-backed foreign-function extension.
    #[serde(default)]
    pub with_ffi: bool,
    /// Embed tcc for the self-hosting feature.
    #[serde(default)]
    pub with_tcc: bool,
    /// Extension selections (builtin / dynamic / excluded).
    #[serde(default)]
    pub extensions: Vec<ExtensionSelection>,
    /// Project-wide preprocessor definitions.
    #[serde(default)]
    pub definitions: Vec<String>,
    /// Project-wide include directories.
    #[serde(default)]
    pub includes: Vec<PathBuf>,
    /// Project-wide compiler flags (applied before entity flags).
    #[serde(default)]
    pub cflags: Vec<Flag>,
    /// Project-wide system libraries.
    #[serde(default)]
    pub libraries: Vec<String>,
    /// Project-wide linker flags.
    #[serde(default)]
    pub ldflags: Vec<Flag>,
}

impl BuildConfig {
    /// The stricter warning set implied by `rigorous`, as tagged flags so
    /// each family only sees its own syntax.
    pub fn rigorous_flags() -> Vec<Flag> {
        use tarn_toolchain::Family;
        vec![
            Flag::tagged(Family::Gnu, "-Wall"),
            Flag::tagged(Family::Gnu, "-Wextra"),
            Flag::tagged(Family::Gnu, "-Werror"),
            Flag::tagged(Family::Msc, "/W4"),
            Flag::tagged(Family::Msc, "/WX"),
        ]
    }

    /// Effective project-wide compiler flags: configured flags, then the
    /// rigorous set when enabled.
    pub fn effective_cflags(&self) -> Vec<Flag> {
        let mut flags = self.cflags.clone();
        if self.rigorous {
            flags.extend(Self::rigorous_flags());
        }
        flags
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optimize_resolution() {
        assert_eq!(RawOptimize::Enabled(false).resolve().unwrap(), OptLevel::Off);
        assert_eq!(
            RawOptimize::Level(3).resolve().unwrap(),
            OptLevel::Level(3)
        );
        assert_eq!(
            RawOptimize::Token("s".into()).resolve().unwrap(),
            OptLevel::Size
        );
        assert!(RawOptimize::Level(5).resolve().is_err());
        assert!(RawOptimize::Token("fast".into()).resolve().is_err());
    }

    #[test]
    fn debug_resolution() {
        assert_eq!(RawDebug::Enabled(true).resolve().unwrap(), DebugMode::Full);
        assert_eq!(
            RawDebug::Token("symbols".into()).resolve().unwrap(),
            DebugMode::Symbols
        );
        assert_eq!(
            RawDebug::Token("callgrind".into()).resolve().unwrap(),
            DebugMode::Callgrind
        );
        assert!(RawDebug::Token("verbose".into()).resolve().is_err());
    }

    #[test]
    fn tool_selection_accessors() {
        let bare = ToolSelection::Token("gcc".into());
        assert_eq!(bare.token(), "gcc");
        assert!(bare.path_override().is_none());

        let detailed = ToolSelection::Detailed {
            tool: "cl".into(),
            path: PathBuf::from("C:/msvc/cl.exe"),
        };
        assert_eq!(detailed.token(), "cl");
        assert_eq!(
            detailed.path_override().unwrap(),
            &PathBuf::from("C:/msvc/cl.exe")
        );
    }

    #[test]
    fn rigorous_flags_are_family_tagged() {
        use tarn_toolchain::{project_flags, Family};
        let flags = BuildConfig::rigorous_flags();
        let gnu = project_flags(Family::Gnu, &flags);
        assert_eq!(gnu, vec!["-Wall", "-Wextra", "-Werror"]);
        let msc = project_flags(Family::Msc, &flags);
        assert_eq!(msc, vec!["/W4", "/WX"]);
    }
}
