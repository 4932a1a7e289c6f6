//! Linker descriptors, compiler/linker pairing, link command construction.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::command::{Command, LinkKind, LinkRequest};
use crate::compiler::{Compiler, CompilerId};
use crate::error::{Result, ToolchainError};
use crate::flag::{project_flags, Family};

/// Identity of a known linker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkerId {
    Ld,
    LlvmLink,
    Link,
}

impl LinkerId {
    /// The toolset token / default executable name.
    pub fn token(&self) -> &'static str {
        match self {
            LinkerId::Ld => "ld",
            LinkerId::LlvmLink => "llvm-link",
            LinkerId::Link => "link",
        }
    }
}

/// A concrete linker: identity, executable path, family and archiver.
///
/// The archiver handles [`LinkKind::StaticLibrary`] requests; it rides along
/// with the linker because the two are always family-matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Linker {
    /// Which linker this is.
    pub id: LinkerId,
    /// Executable path; defaults to the bare token, overridable.
    pub path: PathBuf,
    /// Command-line syntax family.
    pub family: Family,
    /// Archiver executable for static libraries (`ar` / `lib`).
    pub archiver_path: PathBuf,
}

impl Linker {
    /// GNU ld.
    pub fn ld() -> Self {
        Self {
            id: LinkerId::Ld,
            path: PathBuf::from("ld"),
            family: Family::Gnu,
            archiver_path: PathBuf::from("ar"),
        }
    }

    /// LLVM bitcode linker, paired with clang.
    pub fn llvm_link() -> Self {
        Self {
            id: LinkerId::LlvmLink,
            path: PathBuf::from("llvm-link"),
            family: Family::Gnu,
            archiver_path: PathBuf::from("llvm-ar"),
        }
    }

    /// MSVC link.
    pub fn link() -> Self {
        Self {
            id: LinkerId::Link,
            path: PathBuf::from("link"),
            family: Family::Msc,
            archiver_path: PathBuf::from("lib"),
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

    /// Build the link (or archive) command for one request.
    ///
    /// Objects come first in first-discovery order, then external library
    /// files, then search paths and named libraries; some linkers resolve
    /// symbols left to right, so this order is part of the contract.
    pub fn link_command(&self, req: &LinkRequest) -> Command {
        match (self.family, req.kind) {
            (Family::Gnu | Family::Tcc, LinkKind::StaticLibrary) => {
                let mut args = vec!["rcs".to_string(), req.output.display().to_string()];
                args.extend(req.objects.iter().map(|o| o.display().to_string()));
                Command::new(self.archiver_path.clone(), args)
            }
            (Family::Msc, LinkKind::StaticLibrary) => {
                let mut args = vec![
                    "/nologo".to_string(),
                    format!("/OUT:{}", req.output.display()),
                ];
                args.extend(req.objects.iter().map(|o| o.display().to_string()));
                Command::new(self.archiver_path.clone(), args)
            }
            (Family::Gnu | Family::Tcc, kind) => {
                let mut args = Vec::new();
                if kind == LinkKind::DynamicLibrary {
                    args.push("-shared".to_string());
                }
                if req.statik && kind == LinkKind::Application {
                    args.push("-static".to_string());
                }
                args.push("-o".to_string());
                args.push(req.output.display().to_string());
                args.extend(req.objects.iter().map(|o| o.display().to_string()));
                args.extend(req.extern_libs.iter().map(|l| l.display().to_string()));
                for dir in &req.searches {
                    args.push(format!("-L{}", dir.display()));
                }
                args.extend(project_flags(self.family, &req.ldflags));
                for lib in &req.libraries {
                    args.push(format!("-l{lib}"));
                }
                Command::new(self.path.clone(), args)
            }
            (Family::Msc, kind) => {
                let mut args = vec!["/nologo".to_string()];
                if kind == LinkKind::DynamicLibrary {
                    args.push("/DLL".to_string());
                }
                args.push(format!("/OUT:{}", req.output.display()));
                args.extend(req.objects.iter().map(|o| o.display().to_string()));
                args.extend(req.extern_libs.iter().map(|l| l.display().to_string()));
                for dir in &req.searches {
                    args.push(format!("/LIBPATH:{}", dir.display()));
                }
                args.extend(project_flags(self.family, &req.ldflags));
                for lib in &req.libraries {
                    args.push(format!("{lib}.lib"));
                }
                Command::new(self.path.clone(), args)
            }
        }
    }
}

/// Check that a compiler and linker belong together.
///
/// Valid pairings: gcc↔ld, clang↔{ld, llvm-link}, cl↔link. Anything else
/// fails [`ToolchainError::IncompatibleToolchain`] naming both tools.
/// Auxiliary tools (strip, tcc) attach independently and are not checked.
pub fn validate_pair(compiler: &Compiler, linker: &Linker) -> Result<()> {
    let ok = match compiler.id {
        CompilerId::Gcc => linker.id == LinkerId::Ld,
        CompilerId::Clang => matches!(linker.id, LinkerId::Ld | LinkerId::LlvmLink),
        CompilerId::Cl => linker.id == LinkerId::Link,
    };
    if ok {
        Ok(())
    } else {
        Err(ToolchainError::IncompatibleToolchain {
            compiler: compiler.name().to_string(),
            linker: linker.name().to_string(),
        })
    }
}

/// Parse a linker toolset token.
pub fn linker_from_token(token: &str, path_override: Option<&Path>) -> Option<Linker> {
    let linker = match token {
        "ld" => Linker::ld(),
        "llvm-link" => Linker::llvm_link(),
        "link" => Linker::link(),
        _ => return None,
    };
    Some(match path_override {
        Some(p) => linker.with_path(p),
        None => linker,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flag::Flag;

    fn request(kind: LinkKind) -> LinkRequest {
        LinkRequest {
            kind,
            output: PathBuf::from("bin/tarn"),
            objects: vec![PathBuf::from("objs/a.o"), PathBuf::from("objs/b.o")],
            extern_libs: vec![PathBuf::from("/usr/lib/libpthread.a")],
            ldflags: vec![Flag::tagged(Family::Gnu, "-rdynamic")],
            libraries: vec!["m".to_string()],
            searches: vec![PathBuf::from("/usr/local/lib")],
            statik: false,
        }
    }

    #[test]
    fn pairings() {
        assert!(validate_pair(&Compiler::gcc(), &Linker::ld()).is_ok());
        assert!(validate_pair(&Compiler::clang(), &Linker::ld()).is_ok());
        assert!(validate_pair(&Compiler::clang(), &Linker::llvm_link()).is_ok());
        assert!(validate_pair(&Compiler::cl(), &Linker::link()).is_ok());

        let err = validate_pair(&Compiler::cl(), &Linker::ld()).unwrap_err();
        match err {
            ToolchainError::IncompatibleToolchain { compiler, linker } => {
                assert_eq!(compiler, "cl");
                assert_eq!(linker, "ld");
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(validate_pair(&Compiler::gcc(), &Linker::llvm_link()).is_err());
    }

    #[test]
    fn gnu_application_link_order() {
        let cmd = Linker::ld().link_command(&request(LinkKind::Application));
        assert_eq!(
            cmd.args,
            vec![
                "-o",
                "bin/tarn",
                "objs/a.o",
                "objs/b.o",
                "/usr/lib/libpthread.a",
                "-L/usr/local/lib",
                "-rdynamic",
                "-lm",
            ]
        );
    }

    #[test]
    fn gnu_shared_library_gets_shared_flag() {
        let cmd = Linker::ld().link_command(&request(LinkKind::DynamicLibrary));
        assert_eq!(cmd.args[0], "-shared");
    }

    #[test]
    fn gnu_static_library_uses_archiver() {
        let cmd = Linker::ld().link_command(&request(LinkKind::StaticLibrary));
        assert_eq!(cmd.program, PathBuf::from("ar"));
        assert_eq!(cmd.args, vec!["rcs", "bin/tarn", "objs/a.o", "objs/b.o"]);
    }

    #[test]
    fn msc_link_shapes() {
        let cmd = Linker::link().link_command(&request(LinkKind::DynamicLibrary));
        assert_eq!(cmd.args[0], "/nologo");
        assert_eq!(cmd.args[1], "/DLL");
        assert!(cmd.args.contains(&"/OUT:bin/tarn".to_string()));
        assert!(cmd.args.contains(&"/LIBPATH:/usr/local/lib".to_string()));
        assert!(cmd.args.contains(&"m.lib".to_string()));
        // The gnu-tagged ldflag is dropped by projection.
        assert!(!cmd.args.contains(&"-rdynamic".to_string()));

        let arch = Linker::link().link_command(&request(LinkKind::StaticLibrary));
        assert_eq!(arch.program, PathBuf::from("lib"));
    }

    #[test]
    fn static_application_on_gnu() {
        let mut req = request(LinkKind::Application);
        req.statik = true;
        let cmd = Linker::ld().link_command(&req);
        assert_eq!(cmd.args[0], "-static");
    }
}
