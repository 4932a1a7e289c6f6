//! Direct execution backend for the Tarn build engine.
//!
//! Walks a solution in dependency order and invokes toolchain commands.
//! Compile steps within one target run on a bounded worker pool; the link
//! step is a join barrier over them and over every dependency target.
//! Spawned processes are never retried: exit code and captured stderr
//! define success.

pub mod error;
pub mod pool;
pub mod process;
pub mod report;
pub mod runner;

pub use error::{ExecError, Result};
pub use process::{run_command, ProcessOutput};
pub use report::{BuildReport, TargetOutcome, TargetStatus};
pub use runner::{run, run_post_build, ExecPolicy};
