//! The build report: per-target outcomes and run statistics.

use serde::Serialize;

/// Final state of one target after a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TargetStatus {
    /// All steps succeeded.
    Built,
    /// A compile, link or post-build step failed.
    Failed,
    /// Not attempted: a dependency failed, or the run stopped early.
    Skipped,
}

/// Outcome of one target.
#[derive(Debug, Clone, Serialize)]
pub struct TargetOutcome {
    /// Target name.
    pub name: String,
    /// Final status.
    pub status: TargetStatus,
    /// Failure detail, for failed targets.
    pub detail: Option<String>,
}

/// Statistics and outcomes for one execution run.
#[derive(Debug, Clone, Serialize)]
pub struct BuildReport {
    /// Per-target outcomes, in execution order.
    pub targets: Vec<TargetOutcome>,
    /// Total compile steps executed.
    pub compile_count: usize,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

impl BuildReport {
    /// Whether every target was built (nothing failed or skipped).
    pub fn success(&self) -> bool {
        self.targets
            .iter()
            .all(|t| t.status == TargetStatus::Built)
    }

    /// Count of targets with the given status.
    pub fn count(&self, status: TargetStatus) -> usize {
        self.targets.iter().filter(|t| t.status == status).count()
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        format!(
            "{} built, {} failed, {} skipped ({} compile steps, {} ms)",
            self.count(TargetStatus::Built),
            self.count(TargetStatus::Failed),
            self.count(TargetStatus::Skipped),
            self.compile_count,
            self.duration_ms
        )
    }
}
