//! Auxiliary tools: strip and the embedded tcc preprocessor.
//!
//! These attach to a build independently of the compiler/linker pair and
//! are exempt from pairing validation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::command::Command;

/// Identity of an auxiliary tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ToolId {
    /// Symbol stripper for release artifacts.
    Strip,
    /// Embeddable Tiny C Compiler, used to preprocess the runtime header
    /// into a literal-encodable blob for the self-hosting feature.
    Tcc,
}

/// An auxiliary tool descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tool {
    /// Which tool this is.
    pub id: ToolId,
    /// Executable path; defaults to the bare token, overridable.
    pub path: PathBuf,
}

impl Tool {
    /// The strip tool.
    pub fn strip() -> Self {
        Self {
            id: ToolId::Strip,
            path: PathBuf::from("strip"),
        }
    }

    /// The embedded tcc.
    pub fn tcc() -> Self {
        Self {
            id: ToolId::Tcc,
            path: PathBuf::from("tcc"),
        }
    }

    /// Override the executable path.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Strip symbols from `file` in place. Only meaningful for [`ToolId::Strip`].
    pub fn strip_command(&self, file: &Path) -> Command {
        Command::new(self.path.clone(), vec![file.display().to_string()])
    }

    /// Preprocess `header` into a flattened single file at `output`.
    /// Only meaningful for [`ToolId::Tcc`].
    pub fn preprocess_command(&self, header: &Path, output: &Path) -> Command {
        Command::new(
            self.path.clone(),
            vec![
                "-E".to_string(),
                "-P".to_string(),
                header.display().to_string(),
                "-o".to_string(),
                output.display().to_string(),
            ],
        )
    }
}

/// Parse an auxiliary-tool toolset token.
pub fn tool_from_token(token: &str, path_override: Option<&Path>) -> Option<Tool> {
    let tool = match token {
        "strip" => Tool::strip(),
        "tcc" => Tool::tcc(),
        _ => return None,
    };
    Some(match path_override {
        Some(p) => tool.with_path(p),
        None => tool,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_command_shape() {
        let cmd = Tool::strip().strip_command(Path::new("bin/tarn"));
        assert_eq!(cmd.program, PathBuf::from("strip"));
        assert_eq!(cmd.args, vec!["bin/tarn"]);
    }

    #[test]
    fn tcc_preprocess_shape() {
        let cmd = Tool::tcc()
            .preprocess_command(Path::new("include/tarn.h"), Path::new("gen/tarn_blob.h"));
        assert_eq!(
            cmd.args,
            vec!["-E", "-P", "include/tarn.h", "-o", "gen/tarn_blob.h"]
        );
    }

    #[test]
    fn token_parsing() {
        assert_eq!(tool_from_token("strip", None).unwrap().id, ToolId::Strip);
        let t = tool_from_token("tcc", Some(Path::new("vendor/tcc"))).unwrap();
        assert_eq!(t.path, PathBuf::from("vendor/tcc"));
        assert!(tool_from_token("objcopy", None).is_none());
    }
}
