use std::time::Duration;

use crate::migration::MigrationMetadata;

/// Outcome of executing a [`MigrationBatch`](super::MigrationBatch).
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    pub(crate) reverted: Vec<MigrationMetadata>,
    pub(crate) applied: Vec<MigrationMetadata>,
    pub(crate) elapsed: Duration,
    pub(crate) completed: bool,
}

impl ExecutionReport {
    /// Migrations reverted, in execution order.
    pub fn reverted(&self) -> &[MigrationMetadata] {
        &self.reverted
    }

    /// Migrations applied, in execution order.
    pub fn applied(&self) -> &[MigrationMetadata] {
        &self.applied
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Whether every step ran; `false` when a predicate stopped the batch.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Number of steps that ran.
    pub fn count(&self) -> usize {
        self.reverted.len() + self.applied.len()
    }
}
