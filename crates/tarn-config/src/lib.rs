//! The validated configuration record consumed by the Tarn build engine.
//!
//! The CLI (or any other front end) parses arguments and the project
//! manifest into a [`BuildConfig`]; everything downstream treats that
//! record as already validated. Extension selections and module
//! descriptors describe the optional runtime extensions and the files
//! they are built from.

pub mod config;
pub mod error;
pub mod extension;

pub use config::{BuildConfig, RawDebug, RawOptimize, ToolSelection};
pub use error::{ConfigError, Result};
pub use extension::{ExtensionMode, ExtensionSelection, ModuleFile, ModuleSpec};
