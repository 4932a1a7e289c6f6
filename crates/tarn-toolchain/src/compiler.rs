//! Compiler descriptors and per-family compile command construction.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::command::{Command, CompileRequest};
use crate::flag::{project_flags, Family};

/// Identity of a known compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CompilerId {
    Gcc,
    Clang,
    Cl,
}

impl CompilerId {
    /// The toolset token / default executable name.
    pub fn token(&self) -> &'static str {
        match self {
            CompilerId::Gcc => "gcc",
            CompilerId::Clang => "clang",
            CompilerId::Cl => "cl",
        }
    }
}

/// A concrete compiler: identity, executable path and family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Compiler {
    /// Which compiler this is.
    pub id: CompilerId,
    /// Executable path; defaults to the bare token, overridable.
    pub path: PathBuf,
    /// Command-line syntax family.
    pub family: Family,
}

impl Compiler {
    /// GNU gcc.
    pub fn gcc() -> Self {
        Self {
            id: CompilerId::Gcc,
            path: PathBuf::from("gcc"),
            family: Family::Gnu,
        }
    }

    /// LLVM clang (gnu-compatible driver syntax).
    pub fn clang() -> Self {
        Self {
            id: CompilerId::Clang,
            path: PathBuf::from("clang"),
            family: Family::Gnu,
        }
    }

    /// MSVC cl.
    pub fn cl() -> Self {
        Self {
            id: CompilerId::Cl,
            path: PathBuf::from("cl"),
            family: Family::Msc,
        }
    }

    /// Override the executable path.
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Human-readable name for diagnostics.
    pub fn name(&self) -> &'static str {
        self.id.token()
    }

    /// Build the compile command for one source→object request.
    ///
    /// Argument order is fixed per family so repeated construction from the
    /// same request is identical: dialect, optimization, debug, PIC,
    /// includes, definitions, projected extra flags, then output and source.
    pub fn compile_command(&self, req: &CompileRequest) -> Command {
        let mut args = Vec::new();
        match self.family {
            Family::Gnu | Family::Tcc => {
                args.push("-c".to_string());
                if let Some(std) = &req.standard {
                    args.push(format!("-std={std}"));
                }
                if let Some(opt) = req.optimization.render(self.family) {
                    args.push(opt);
                }
                args.extend(req.debug.render(self.family));
                if !req.debug.wants_asserts() {
                    args.push("-DNDEBUG".to_string());
                }
                if req.pic {
                    args.push("-fPIC".to_string());
                }
                for inc in &req.includes {
                    args.push(format!("-I{}", inc.display()));
                }
                for def in &req.definitions {
                    args.push(format!("-D{def}"));
                }
                args.extend(project_flags(self.family, &req.flags));
                args.push("-o".to_string());
                args.push(req.output.display().to_string());
                args.push(req.source.display().to_string());
            }
            Family::Msc => {
                args.push("/nologo".to_string());
                args.push("/c".to_string());
                if let Some(std) = &req.standard {
                    args.push(format!("/std:{std}"));
                }
                if let Some(opt) = req.optimization.render(self.family) {
                    args.push(opt);
                }
                args.extend(req.debug.render(self.family));
                if !req.debug.wants_asserts() {
                    args.push("/DNDEBUG".to_string());
                }
                // PIC is implicit under MSVC.
                for inc in &req.includes {
                    args.push(format!("/I{}", inc.display()));
                }
                for def in &req.definitions {
                    args.push(format!("/D{def}"));
                }
                args.extend(project_flags(self.family, &req.flags));
                args.push(format!("/Fo{}", req.output.display()));
                args.push(req.source.display().to_string());
            }
        }
        Command::new(self.path.clone(), args)
    }
}

/// Parse a compiler toolset token.
pub fn compiler_from_token(token: &str, path_override: Option<&Path>) -> Option<Compiler> {
    let compiler = match token {
        "gcc" => Compiler::gcc(),
        "clang" => Compiler::clang(),
        "cl" => Compiler::cl(),
        _ => return None,
    };
    Some(match path_override {
        Some(p) => compiler.with_path(p),
        None => compiler,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::{DebugMode, Flag, OptLevel};

    fn request() -> CompileRequest {
        CompileRequest {
            source: PathBuf::from("src/core/vm.c"),
            output: PathBuf::from("objs/linux/core/vm.o"),
            includes: vec![PathBuf::from("include")],
            definitions: vec!["TARN_CORE".to_string()],
            flags: vec![
                Flag::tagged(Family::Gnu, "-Wall"),
                Flag::tagged(Family::Msc, "/W4"),
            ],
            optimization: OptLevel::Level(2),
            debug: DebugMode::Off,
            standard: Some("c99".to_string()),
            pic: false,
        }
    }

    #[test]
    fn gnu_compile_command_shape() {
        let cmd = Compiler::gcc().compile_command(&request());
        assert_eq!(cmd.program, PathBuf::from("gcc"));
        assert_eq!(
            cmd.args,
            vec![
                "-c",
                "-std=c99",
                "-O2",
                "-DNDEBUG",
                "-Iinclude",
                "-DTARN_CORE",
                "-Wall",
                "-o",
                "objs/linux/core/vm.o",
                "src/core/vm.c",
            ]
        );
    }

    #[test]
    fn msc_compile_command_shape() {
        let cmd = Compiler::cl().compile_command(&request());
        assert_eq!(
            cmd.args,
            vec![
                "/nologo",
                "/c",
                "/std:c99",
                "/O2",
                "/DNDEBUG",
                "/Iinclude",
                "/DTARN_CORE",
                "/W4",
                "/Foobjs/linux/core/vm.o",
                "src/core/vm.c",
            ]
        );
    }

    #[test]
    fn pic_only_emitted_for_gnu() {
        let mut req = request();
        req.pic = true;
        let gnu = Compiler::clang().compile_command(&req);
        assert!(gnu.args.contains(&"-fPIC".to_string()));
        let msc = Compiler::cl().compile_command(&req);
        assert!(!msc.args.iter().any(|a| a.contains("fPIC")));
    }

    #[test]
    fn debug_build_keeps_asserts() {
        let mut req = request();
        req.debug = DebugMode::Full;
        let cmd = Compiler::gcc().compile_command(&req);
        assert!(cmd.args.contains(&"-g".to_string()));
        assert!(!cmd.args.contains(&"-DNDEBUG".to_string()));
    }

    #[test]
    fn token_parsing() {
        assert_eq!(
            compiler_from_token("clang", None).unwrap().id,
            CompilerId::Clang
        );
        let c = compiler_from_token("gcc", Some(Path::new("/opt/bin/gcc-13"))).unwrap();
        assert_eq!(c.path, PathBuf::from("/opt/bin/gcc-13"));
        assert!(compiler_from_token("icc", None).is_none());
    }

    #[test]
    fn identical_request_identical_command() {
        let a = Compiler::gcc().compile_command(&request());
        let b = Compiler::gcc().compile_command(&request());
        assert_eq!(a, b);
    }
}
