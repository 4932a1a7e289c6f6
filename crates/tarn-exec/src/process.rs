//! Process spawning with captured output.
//!
//! The single "run a command" primitive; compile, link and post-build
//! steps all go through it.

use std::io;

use tarn_toolchain::Command;

/// Captured result of one spawned process.
#[derive(Debug, Clone)]
pub struct ProcessOutput {
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl ProcessOutput {
    /// Stderr, falling back to stdout when stderr is empty (cl prints
    /// diagnostics to stdout).
    pub fn diagnostics(&self) -> &str {
        if self.stderr.trim().is_empty() {
            &self.stdout
        } else {
            &self.stderr
        }
    }
}

/// Spawn a command, wait for it, capture its output. No retry, no timeout.
pub fn run_command(command: &Command) -> io::Result<ProcessOutput> {
    let mut proc = std::process::Command::new(&command.program);
    proc.args(&command.args);
    if let Some(cwd) = &command.cwd {
        proc.current_dir(cwd);
    }
    let output = proc.output()?;
    Ok(ProcessOutput {
        success: output.status.success(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}
