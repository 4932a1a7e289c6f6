//! Platform suffix conventions and the registry lookup.

use serde::{Deserialize, Serialize};

use crate::error::{PlatformError, Result};

/// Broad OS family a platform belongs to.
///
/// Drives path and command-line conventions that do not vary within a
/// family (slash direction in generated files, archive tooling, etc.).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OsBase {
    /// Linux, the BSDs, Darwin, Solaris-likes, Haiku.
    Unix,
    /// Windows proper and MinGW/Cygwin layered environments.
    Windows,
}

/// Filename conventions for one target operating system.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TargetPlatform {
    /// OS identifier (e.g., "linux", "darwin", "windows").
    pub os_id: String,
    /// OS family tag.
    pub base: OsBase,
    /// Object file suffix, including the dot.
    pub obj_suffix: String,
    /// Static library suffix.
    pub static_lib_suffix: String,
    /// Dynamic/shared library suffix.
    pub dll_suffix: String,
    /// Executable suffix (empty on Unix).
    pub exe_suffix: String,
}

impl TargetPlatform {
    fn unix(os_id: &str, dll_suffix: &str) -> Self {
        Self {
            os_id: os_id.to_string(),
            base: OsBase::Unix,
            obj_suffix: ".o".to_string(),
            static_lib_suffix: ".a".to_string(),
            dll_suffix: dll_suffix.to_string(),
            exe_suffix: String::new(),
        }
    }

    fn windows(os_id: &str) -> Self {
        Self {
            os_id: os_id.to_string(),
            base: OsBase::Windows,
            obj_suffix: ".obj".to_string(),
            static_lib_suffix: ".lib".to_string(),
            dll_suffix: ".dll".to_string(),
            exe_suffix: ".exe".to_string(),
        }
    }

    /// Whether this platform uses backslash path separators in generated
    /// build files.
    pub fn uses_backslash_paths(&self) -> bool {
        self.base == OsBase::Windows && self.os_id != "mingw" && self.os_id != "cygwin"
    }
}

/// Known OS identifiers, in registry order.
const KNOWN_OS_IDS: &[&str] = &[
    "linux",
    "darwin",
    "freebsd",
    "netbsd",
    "openbsd",
    "dragonfly",
    "sunos",
    "haiku",
    "windows",
    "mingw",
    "cygwin",
];

/// Resolve an OS identifier to its platform conventions.
///
/// Fails with [`PlatformError::UnknownPlatform`] if the identifier is not
/// in the registry.
pub fn lookup(os_id: &str) -> Result<TargetPlatform> {
    let platform = match os_id {
        "linux" | "freebsd" | "netbsd" | "openbsd" | "dragonfly" | "sunos" | "haiku" => {
            TargetPlatform::unix(os_id, ".so")
        }
        "darwin" => TargetPlatform::unix(os_id, ".dylib"),
        "windows" => TargetPlatform::windows(os_id),
        // MinGW and Cygwin build Windows artifacts with Unix-style tooling.
        "mingw" | "cygwin" => TargetPlatform {
            os_id: os_id.to_string(),
            base: OsBase::Windows,
            obj_suffix: ".o".to_string(),
            static_lib_suffix: ".a".to_string(),
            dll_suffix: ".dll".to_string(),
            exe_suffix: ".exe".to_string(),
        },
        _ => {
            return Err(PlatformError::UnknownPlatform {
                os_id: os_id.to_string(),
                known: KNOWN_OS_IDS.join(", "),
            })
        }
    };
    Ok(platform)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linux_conventions() {
        let p = lookup("linux").unwrap();
        assert_eq!(p.base, OsBase::Unix);
        assert_eq!(p.obj_suffix, ".o");
        assert_eq!(p.static_lib_suffix, ".a");
        assert_eq!(p.dll_suffix, ".so");
        assert_eq!(p.exe_suffix, "");
        assert!(!p.uses_backslash_paths());
    }

    #[test]
    fn darwin_dylib() {
        let p = lookup("darwin").unwrap();
        assert_eq!(p.base, OsBase::Unix);
        assert_eq!(p.dll_suffix, ".dylib");
    }

    #[test]
    fn windows_conventions() {
        let p = lookup("windows").unwrap();
        assert_eq!(p.base, OsBase::Windows);
        assert_eq!(p.obj_suffix, ".obj");
        assert_eq!(p.static_lib_suffix, ".lib");
        assert_eq!(p.dll_suffix, ".dll");
        assert_eq!(p.exe_suffix, ".exe");
        assert!(p.uses_backslash_paths());
    }

    #[test]
    fn mingw_mixes_families() {
        let p = lookup("mingw").unwrap();
        assert_eq!(p.base, OsBase::Windows);
        assert_eq!(p.obj_suffix, ".o");
        assert_eq!(p.exe_suffix, ".exe");
        assert!(!p.uses_backslash_paths());
    }

    #[test]
    fn unknown_platform_lists_known_ids() {
        let err = lookup("plan9").unwrap_err();
        match err {
            PlatformError::UnknownPlatform { os_id, known } => {
                assert_eq!(os_id, "plan9");
                assert!(known.contains("linux"));
                assert!(known.contains("windows"));
            }
        }
    }
}
