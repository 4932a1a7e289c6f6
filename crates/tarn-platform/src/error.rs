//! Error types for platform lookup.

/// Errors that can occur while resolving a target platform.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    /// The OS identifier is not in the registry.
    #[error("unknown platform: '{os_id}' (known: {known})")]
    UnknownPlatform {
        /// The identifier that failed to resolve.
        os_id: String,
        /// Comma-separated list of known identifiers.
        known: String,
    },
}

/// Result type for platform operations.
pub type Result<T> = std::result::Result<T, PlatformError>;
