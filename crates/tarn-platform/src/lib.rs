//! Target platform registry for the Tarn build engine.
//!
//! Maps an OS identifier to the filename conventions of that platform
//! (object, static library, dynamic library and executable suffixes) plus
//! an OS-family tag. Resolved once per build and read-only thereafter.

pub mod error;
pub mod platform;

pub use error::{PlatformError, Result};
pub use platform::{lookup, OsBase, TargetPlatform};
