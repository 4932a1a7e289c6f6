//! The build context: platform plus validated toolchain selection.
//!
//! Constructed once by the caller and threaded explicitly through entity
//! construction, flattening, execution and generation. There is no
//! process-wide mutable toolchain state.

use tarn_platform::TargetPlatform;

use crate::compiler::Compiler;
use crate::error::Result;
use crate::linker::{validate_pair, Linker};
use crate::tool::Tool;

/// Resolved platform and toolchain for one build invocation. Read-only.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Target platform conventions.
    pub platform: TargetPlatform,
    /// The active compiler.
    pub compiler: Compiler,
    /// The active linker (family-validated against the compiler).
    pub linker: Linker,
    /// Symbol stripper, if selected.
    pub strip: Option<Tool>,
    /// Embedded tcc, if the self-hosting feature is enabled.
    pub tcc: Option<Tool>,
}

impl BuildContext {
    /// Assemble a context, validating the compiler/linker pairing up front.
    pub fn new(platform: TargetPlatform, compiler: Compiler, linker: Linker) -> Result<Self> {
        validate_pair(&compiler, &linker)?;
        Ok(Self {
            platform,
            compiler,
            linker,
            strip: None,
            tcc: None,
        })
    }

    /// Attach the strip tool.
    pub fn with_strip(mut self, tool: Tool) -> Self {
        self.strip = Some(tool);
        self
    }

    /// Attach the embedded tcc.
    pub fn with_tcc(mut self, tool: Tool) -> Self {
        self.tcc = Some(tool);
        self
    }
}
