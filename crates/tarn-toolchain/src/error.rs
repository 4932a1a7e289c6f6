//! Error types for toolchain selection and command construction.

/// Errors that can occur during toolchain operations.
#[derive(Debug, thiserror::Error)]
pub enum ToolchainError {
    /// The selected compiler and linker belong to incompatible families.
    #[error("incompatible toolchain: compiler '{compiler}' cannot be paired with linker '{linker}'")]
    IncompatibleToolchain {
        /// Name of the selected compiler.
        compiler: String,
        /// Name of the selected linker.
        linker: String,
    },

    /// A toolset token did not name a known tool.
    #[error("unknown tool: '{token}'")]
    UnknownTool {
        /// The offending token.
        token: String,
    },
}

/// Result type for toolchain operations.
pub type Result<T> = std::result::Result<T, ToolchainError>;
