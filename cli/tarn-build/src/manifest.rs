//! `tarn.toml` manifest parsing and resolution into the validated
//! configuration record.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;
use tarn_config::{BuildConfig, ExtensionSelection, ModuleSpec, RawDebug, RawOptimize, ToolSelection};
use tarn_toolchain::{DebugMode, Flag, OptLevel};

/// The top-level manifest structure for a Tarn project.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectManifest {
    /// Project metadata (required).
    pub project: ProjectSection,
    /// Build configuration.
    pub build: BuildSection,
    /// Runtime module descriptors.
    #[serde(default, rename = "module")]
    pub modules: Vec<ModuleSpec>,
    /// Extension selections.
    #[serde(default, rename = "extension")]
    pub extensions: Vec<ExtensionEntry>,
}

/// Project metadata section.
#[derive(Debug, Clone, Deserialize)]
pub struct ProjectSection {
    /// Project name (required).
    pub name: String,
    /// Project version.
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "0.1.0".to_string()
}

/// The `[build]` section, in raw manifest form.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct BuildSection {
    /// Target OS identifier (required).
    pub platform: String,
    /// Toolset selection, in order: compiler, linker, optional tools.
    #[serde(default)]
    pub toolset: Vec<ToolSelection>,
    /// Optimization: `true`/`false`, a level `0..=4`, or `"s"`.
    #[serde(default)]
    pub optimize: Option<RawOptimize>,
    /// Debug: `true`/`false` or a named mode.
    #[serde(default)]
    pub debug: Option<RawDebug>,
    /// Language dialect token.
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
    /// Project-wide preprocessor definitions.
    #[serde(default)]
    pub definitions: Vec<String>,
    /// Project-wide include directories.
    #[serde(default)]
    pub includes: Vec<PathBuf>,
    /// Project-wide compiler flags.
    #[serde(default)]
    pub cflags: Vec<Flag>,
    /// Project-wide system libraries.
    #[serde(default)]
    pub libraries: Vec<String>,
    /// Project-wide linker flags.
    #[serde(default)]
    pub ldflags: Vec<Flag>,
}

/// One `[[extension]]` entry: a selection token plus its module list.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtensionEntry {
    /// Selection token: `+name` builtin, `*name` dynamic, `-name` excluded.
    pub select: String,
    /// Names of the modules the extension is composed of.
    #[serde(default)]
    pub modules: Vec<String>,
}

impl ProjectManifest {
    /// Search upward from `start_dir` for a `tarn.toml` file, parse and
    /// return it along with the directory it was found in.
    pub fn find_and_load(start_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut dir = start_dir.to_path_buf();
        loop {
            let candidate = dir.join("tarn.toml");
            if candidate.is_file() {
                let content = std::fs::read_to_string(&candidate)
                    .with_context(|| format!("reading {}", candidate.display()))?;
                let manifest: ProjectManifest = toml::from_str(&content)
                    .with_context(|| format!("parsing {}", candidate.display()))?;
                return Ok(Some((manifest, dir)));
            }
            if !dir.pop() {
                break;
            }
        }
        Ok(None)
    }

    /// Parse a manifest from a TOML string.
    #[cfg(test)]
    pub fn from_str(s: &str) -> Result<Self> {
        toml::from_str(s).context("parsing tarn.toml")
    }

    /// Resolve the raw manifest into the validated configuration record.
    ///
    /// Optimization defaults to level 2, debug to off.
    pub fn to_config(&self) -> Result<BuildConfig> {
        let optimize = match &self.build.optimize {
            Some(raw) => raw.resolve()?,
            None => OptLevel::Level(2),
        };
        let debug = match &self.build.debug {
            Some(raw) => raw.resolve()?,
            None => DebugMode::Off,
        };
        let extensions = self
            .extensions
            .iter()
            .map(|e| ExtensionSelection::parse(&e.select, e.modules.clone()))
            .collect::<tarn_config::Result<Vec<_>>>()?;

        Ok(BuildConfig {
            os_id: self.build.platform.clone(),
            toolset: self.build.toolset.clone(),
            optimize,
            debug,
            standard: self.build.standard.clone(),
            statik: self.build.statik,
            rigorous: self.build.rigorous,
            with_ffi: self.build.with_ffi,
            with_tcc: self.build.with_tcc,
            extensions,
            definitions: self.build.definitions.clone(),
            includes: self.build.includes.clone(),
            cflags: self.build.cflags.clone(),
            libraries: self.build.libraries.clone(),
            ldflags: self.build.ldflags.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tarn_config::ExtensionMode;
    use tarn_toolchain::Family;

    #[test]
    fn parse_full_manifest() {
        let toml_str = r#"
[project]
name = "tarn"
version = "0.4.0"

[build]
platform = "linux"
toolset = ["gcc", "ld", "strip"]
optimize = 3
debug = "symbols"
standard = "c11"
rigorous = true
definitions = ["TARN_TRACE"]
includes = ["include"]
cflags = [{ plain = "-pthread" }, { tagged = { family = "gnu", text = "-rdynamic" } }]
libraries = ["m"]

[[module]]
name = "vm"
source = "src/vm.c"

[[extension]]
select = "+json"
modules = ["json"]

[[extension]]
select = "*sockets"
modules = ["sockets"]
"#;
        let manifest = ProjectManifest::from_str(toml_str).unwrap();
        assert_eq!(manifest.project.name, "tarn");
        assert_eq!(manifest.project.version, "0.4.0");
        assert_eq!(manifest.modules.len(), 1);
        assert_eq!(manifest.modules[0].name, "vm");

        let config = manifest.to_config().unwrap();
        assert_eq!(config.os_id, "linux");
        assert_eq!(config.toolset.len(), 3);
        assert_eq!(config.optimize, OptLevel::Level(3));
        assert_eq!(config.debug, DebugMode::Symbols);
        assert!(config.rigorous);
        assert_eq!(config.definitions, vec!["TARN_TRACE"]);
        assert_eq!(
            config.cflags,
            vec![
                Flag::plain("-pthread"),
                Flag::tagged(Family::Gnu, "-rdynamic"),
            ]
        );
        assert_eq!(config.extensions.len(), 2);
        assert_eq!(config.extensions[0].mode, ExtensionMode::Builtin);
        assert_eq!(config.extensions[1].mode, ExtensionMode::Dynamic);
        assert_eq!(config.extensions[1].name, "sockets");
    }

    #[test]
    fn parse_minimal_manifest_with_defaults() {
        let toml_str = r#"
[project]
name = "minimal"

[build]
platform = "linux"
toolset = ["gcc", "ld"]
"#;
        let manifest = ProjectManifest::from_str(toml_str).unwrap();
        assert_eq!(manifest.project.version, "0.1.0");
        let config = manifest.to_config().unwrap();
        assert_eq!(config.optimize, OptLevel::Level(2));
        assert_eq!(config.debug, DebugMode::Off);
        assert!(!config.statik);
        assert!(config.extensions.is_empty());
    }

    #[test]
    fn detailed_tool_selection_with_path() {
        let toml_str = r#"
[project]
name = "paths"

[build]
platform = "linux"
toolset = [{ tool = "gcc", path = "/opt/cross/bin/gcc" }, "ld"]
"#;
        let manifest = ProjectManifest::from_str(toml_str).unwrap();
        let config = manifest.to_config().unwrap();
        assert_eq!(config.toolset[0].token(), "gcc");
        assert_eq!(
            config.toolset[0].path_override().unwrap(),
            &PathBuf::from("/opt/cross/bin/gcc")
        );
        assert!(config.toolset[1].path_override().is_none());
    }

    #[test]
    fn malformed_extension_token_is_rejected() {
        let toml_str = r#"
[project]
name = "bad"

[build]
platform = "linux"
toolset = ["gcc", "ld"]

[[extension]]
select = "json"
"#;
        let manifest = ProjectManifest::from_str(toml_str).unwrap();
        assert!(manifest.to_config().is_err());
    }

    #[test]
    fn reject_invalid_toml() {
        assert!(ProjectManifest::from_str("this is not valid toml [[[").is_err());
    }

    #[test]
    fn find_and_load_walks_up() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("tarn.toml"),
            "[project]\nname = \"parent\"\n[build]\nplatform = \"linux\"\n",
        )
        .unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();

        let (manifest, found_dir) = ProjectManifest::find_and_load(&nested).unwrap().unwrap();
        assert_eq!(manifest.project.name, "parent");
        assert_eq!(found_dir, dir.path());
    }
}
