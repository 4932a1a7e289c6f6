//! Errors for entity construction, flattening and solution ordering.

/// Errors that can occur while building or flattening the entity graph.
#[derive(Debug, thiserror::Error)]
pub enum GraphError {
    /// An entity was revisited while still on the active traversal stack,
    /// or the target graph has no topological order.
    #[error("cyclic dependency involving '{name}'")]
    CyclicDependency {
        /// Name of an entity or target on the cycle.
        name: String,
    },

    /// A handle did not resolve inside the owning solution.
    #[error("unknown entity handle {index}")]
    UnknownEntity {
        /// The raw handle value.
        index: usize,
    },

    /// A nested link-capable entity is consumed as a library, but no
    /// registered target builds its artifact.
    #[error("'{name}' is linked as a library but no target builds it")]
    UnresolvedLibrary {
        /// Name of the library entity.
        name: String,
    },

    /// The toolset selects no compiler or no linker.
    #[error("toolset is missing a {role}")]
    IncompleteToolset {
        /// "compiler" or "linker".
        role: &'static str,
    },

    /// Platform lookup failed.
    #[error(transparent)]
    Platform(#[from] tarn_platform::PlatformError),

    /// Toolchain selection or pairing failed.
    #[error(transparent)]
    Toolchain(#[from] tarn_toolchain::ToolchainError),

    /// The consumed configuration was invalid.
    #[error(transparent)]
    Config(#[from] tarn_config::ConfigError),
}

/// Result type for graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
