//! Configuration errors. All of these are fatal before any build step runs.

/// Errors in the consumed configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// An extension selection token was not `+name`, `*name` or `-name`.
    #[error("malformed extension selection: '{token}' (expected '+name', '*name' or '-name')")]
    MalformedExtension {
        /// The offending token.
        token: String,
    },

    /// The optimize value was outside `0..=4`, `"s"` or `false`.
    #[error("invalid optimize value: {value}")]
    InvalidOptimize {
        /// Rendering of the rejected value.
        value: String,
    },

    /// The debug value was not a known mode.
    #[error("invalid debug value: {value}")]
    InvalidDebug {
        /// Rendering of the rejected value.
        value: String,
    },

    /// An extension selection named a module with no descriptor.
    #[error("extension '{extension}' references unknown module '{module}'")]
    UnknownModule {
        /// The selecting extension.
        extension: String,
        /// The unresolved module name.
        module: String,
    },
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
