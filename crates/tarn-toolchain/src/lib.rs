//! Toolchain descriptors and flag projection for the Tarn build engine.
//!
//! Models heterogeneous compilers (gcc, clang, cl) and linkers (ld,
//! llvm-link, link) behind one flag vocabulary. A flag is either plain
//! (applies everywhere) or tagged with the toolchain family it belongs to;
//! projection resolves a mixed flag list into the concrete argument list
//! for the active family. Command construction turns compile and link
//! requests into ordered argument vectors per family.

pub mod command;
pub mod compiler;
pub mod context;
pub mod error;
pub mod flag;
pub mod linker;
pub mod tool;

pub use command::{Command, CompileRequest, LinkKind, LinkRequest};
pub use compiler::{Compiler, CompilerId};
pub use context::BuildContext;
pub use error::{Result, ToolchainError};
pub use flag::{project_flags, DebugMode, Family, Flag, OptLevel};
pub use linker::{validate_pair, Linker, LinkerId};
pub use tool::{Tool, ToolId};
