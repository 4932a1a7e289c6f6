//! Build-file generator backends for the Tarn build engine.
//!
//! Each backend serializes the same flattened build graph into one
//! ecosystem's native project format: a GNU makefile, an NMake makefile,
//! or a Visual Studio solution with one project per linked target. Flags
//! are rendered through the same projection engine direct execution uses,
//! so a generated build and a direct build are flag-identical. Output is
//! deterministic: regenerating from the same graph is byte-identical, and
//! an unchanged file is never rewritten.

pub mod error;
pub mod makefile;
pub mod model;
pub mod nmake;
pub mod util;
pub mod vstudio;

use std::path::Path;

use tarn_graph::Solution;
use tarn_toolchain::BuildContext;

pub use error::{EmitError, Result};
pub use makefile::MakefileGenerator;
pub use nmake::NmakeGenerator;
pub use vstudio::VisualStudioGenerator;

/// A build-file generator backend.
pub trait Generator {
    /// Serialize `solution` to `path` (a file for the makefile backends, a
    /// directory for Visual Studio).
    fn generate(&self, path: &Path, ctx: &BuildContext, solution: &Solution) -> Result<()>;
}
