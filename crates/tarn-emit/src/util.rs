//! Shared helpers for the generator backends.

use std::path::Path;

use crate::error::{EmitError, Result};

/// Write `content` to `path` only when it differs from what is on disk.
///
/// Returns whether the file was written. Keeping unchanged files untouched
/// lets the downstream build tool skip re-reading them.
pub fn write_if_changed(path: &Path, content: &str) -> Result<bool> {
    if let Ok(existing) = std::fs::read_to_string(path) {
        if existing == content {
            return Ok(false);
        }
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|source| EmitError::Write {
                path: path.display().to_string(),
                source,
            })?;
        }
    }
    std::fs::write(path, content).map_err(|source| EmitError::Write {
        path: path.display().to_string(),
        source,
    })?;
    Ok(true)
}

/// Render a path with backslash separators for Windows-native tools.
pub fn backslashed(path: &Path) -> String {
    path.display().to_string().replace('/', "\\")
}

/// Join command arguments into one rule line, quoting embedded spaces.
pub fn shell_join(args: &[String]) -> String {
    args.iter()
        .map(|arg| {
            if arg.contains(' ') {
                format!("\"{arg}\"")
            } else {
                arg.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Deterministic GUID for a project name (FNV-1a over the name, formatted
/// as a registry-style GUID). Stable across runs so regenerated solutions
/// stay byte-identical.
pub fn project_guid(name: &str) -> String {
    let mut hash_a: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in name.bytes() {
        hash_a ^= u64::from(byte);
        hash_a = hash_a.wrapping_mul(0x0000_0100_0000_01b3);
    }
    let mut hash_b: u64 = hash_a;
    for byte in name.bytes().rev() {
        hash_b ^= u64::from(byte);
        hash_b = hash_b.wrapping_mul(0x0000_0100_0000_01b3);
    }
    format!(
        "{{{:08X}-{:04X}-{:04X}-{:04X}-{:012X}}}",
        (hash_a >> 32) as u32,
        (hash_a >> 16) as u16,
        hash_a as u16,
        (hash_b >> 48) as u16,
        hash_b & 0xFFFF_FFFF_FFFF
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn write_skips_unchanged_content() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("Makefile");
        assert!(write_if_changed(&path, "all:\n").unwrap());
        assert!(!write_if_changed(&path, "all:\n").unwrap());
        assert!(write_if_changed(&path, "all: tarn\n").unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "all: tarn\n");
    }

    #[test]
    fn write_creates_parent_dirs() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("vs/tarn.vcxproj");
        assert!(write_if_changed(&path, "<Project/>").unwrap());
        assert!(path.exists());
    }

    #[test]
    fn backslash_rendering() {
        assert_eq!(
            backslashed(&PathBuf::from("build/objs/windows/vm.obj")),
            "build\\objs\\windows\\vm.obj"
        );
    }

    #[test]
    fn guids_are_stable_and_distinct() {
        assert_eq!(project_guid("tarn"), project_guid("tarn"));
        assert_ne!(project_guid("tarn"), project_guid("libtarn"));
        let guid = project_guid("tarn");
        assert_eq!(guid.len(), 38);
        assert!(guid.starts_with('{') && guid.ends_with('}'));
    }
}
