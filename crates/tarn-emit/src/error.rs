//! Generator errors.

/// Errors that can occur while generating build files.
#[derive(Debug, thiserror::Error)]
pub enum EmitError {
    /// Writing a generated file failed.
    #[error("failed to write '{path}': {source}")]
    Write {
        /// The target path.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// Graph-level failure while flattening the solution.
    #[error(transparent)]
    Graph(#[from] tarn_graph::GraphError),
}

/// Result type for generator operations.
pub type Result<T> = std::result::Result<T, EmitError>;
