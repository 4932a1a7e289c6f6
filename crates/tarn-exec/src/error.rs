//! Execution failures, attributed to the owning entity.

/// Errors surfaced by the execution backend.
#[derive(Debug, thiserror::Error)]
pub enum ExecError {
    /// A compile step failed; carries the concrete command line and the
    /// captured toolchain output.
    #[error("compiling '{entity}' failed\n  command: {command}\n{output}")]
    CompileFailure {
        /// Owning entity name.
        entity: String,
        /// The command line that ran.
        command: String,
        /// Captured stderr/stdout.
        output: String,
    },

    /// The link step failed.
    #[error("linking '{entity}' failed\n  command: {command}\n{output}")]
    LinkFailure {
        /// Owning entity name.
        entity: String,
        /// The command line that ran.
        command: String,
        /// Captured stderr/stdout.
        output: String,
    },

    /// A post-build command failed; the rest of that entity's pipeline is
    /// aborted, already-completed siblings are not rolled back.
    #[error("post-build for '{entity}' failed: {detail}")]
    PostBuildFailure {
        /// Owning entity name.
        entity: String,
        /// What went wrong.
        detail: String,
    },

    /// A process could not be spawned at all.
    #[error("failed to spawn '{program}': {source}")]
    Spawn {
        /// The program that failed to start.
        program: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Creating an output directory failed.
    #[error("failed to create directory '{dir}': {source}")]
    CreateDir {
        /// The directory.
        dir: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Graph-level failure (cycles, unknown handles); fatal before any
    /// process spawns.
    #[error(transparent)]
    Graph(#[from] tarn_graph::GraphError),
}

/// Result type for execution operations.
pub type Result<T> = std::result::Result<T, ExecError>;
