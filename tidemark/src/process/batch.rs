use std::sync::Arc;
use std::time::Instant;

use super::{ExecutionReport, MigrationStep};
use crate::common::Direction;
use crate::errors::{ErrorKind, FailedStep, TidemarkError, TidemarkResult};
use crate::migration::MigrationMetadata;
use crate::provider::TransactionScope;
use crate::versioning::Versioning;

/// Planned, ordered set of steps executed in one run.
///
/// # Purpose
/// A batch is an immutable plan: down steps in descending timestamp order
/// followed by up steps in ascending order, together with the versioning store
/// the plan was computed against. Executing consumes it.
///
/// # Execution
/// Steps run strictly one after another, each on its own connection inside its
/// own transaction:
///
/// 1. the step's commands are compiled and run
/// 2. the transaction commits
/// 3. the step is recorded in the versioning store
///
/// The first failure rolls back that step's transaction and stops the batch.
/// Steps before it stay committed and recorded; the returned error names the
/// failing migration and direction through
/// [`TidemarkError::failed_step`]. A step that committed but could not be
/// recorded stops the batch with a versioning store error naming that step.
pub struct MigrationBatch {
    down_steps: Vec<MigrationStep>,
    up_steps: Vec<MigrationStep>,
    versioning: Option<Arc<dyn Versioning>>,
}

impl MigrationBatch {
    pub(crate) fn new(
        down_steps: Vec<MigrationStep>,
        up_steps: Vec<MigrationStep>,
        versioning: Arc<dyn Versioning>,
    ) -> Self {
        MigrationBatch {
            down_steps,
            up_steps,
            versioning: Some(versioning),
        }
    }

    /// The batch with nothing to do.
    pub fn empty() -> Self {
        MigrationBatch {
            down_steps: Vec::new(),
            up_steps: Vec::new(),
            versioning: None,
        }
    }

    pub fn count(&self) -> usize {
        self.down_steps.len() + self.up_steps.len()
    }

    pub fn count_up(&self) -> usize {
        self.up_steps.len()
    }

    pub fn count_down(&self) -> usize {
        self.down_steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Steps in execution order.
    pub fn steps(&self) -> impl Iterator<Item = &MigrationStep> {
        self.down_steps.iter().chain(self.up_steps.iter())
    }

    /// Executes every step.
    pub fn execute(self) -> TidemarkResult<ExecutionReport> {
        self.execute_while(|_| true)
    }

    /// Executes steps for as long as `predicate` returns `true` for the next
    /// one. A stopped batch reports [`ExecutionReport::is_completed`] as
    /// `false`; the remaining steps are dropped.
    pub fn execute_while<P>(self, mut predicate: P) -> TidemarkResult<ExecutionReport>
    where
        P: FnMut(&MigrationStep) -> bool,
    {
        let mut report = ExecutionReport {
            completed: true,
            ..ExecutionReport::default()
        };
        if self.is_empty() {
            log::info!("No migrations to execute");
            return Ok(report);
        }

        log::info!(
            "Executing {} (up: {}, down: {}) migration(s)",
            self.count(),
            self.count_up(),
            self.count_down()
        );

        let versioning = self.versioning.ok_or_else(|| {
            TidemarkError::new("Migration batch has no versioning store", ErrorKind::InternalError)
        })?;

        let start = Instant::now();
        for step in self.down_steps.into_iter().chain(self.up_steps) {
            if !predicate(&step) {
                log::info!("Stopping before migration {}", step.metadata());
                report.completed = false;
                break;
            }

            let direction = step.direction();
            let metadata = Self::execute_step(step, versioning.as_ref())?;
            match direction {
                Direction::Up => report.applied.push(metadata),
                Direction::Down => report.reverted.push(metadata),
            }
        }

        report.elapsed = start.elapsed();
        log::debug!("Executed {} migration(s) in {:?}", report.count(), report.elapsed);
        Ok(report)
    }

    fn execute_step(
        step: MigrationStep,
        versioning: &dyn Versioning,
    ) -> TidemarkResult<MigrationMetadata> {
        let start = Instant::now();
        let direction = step.direction();
        let failed = FailedStep {
            timestamp: step.metadata().timestamp(),
            name: step.metadata().name().to_string(),
            direction,
        };
        match direction {
            Direction::Up => log::info!("Applying migration {}", step.metadata()),
            Direction::Down => log::info!("Reverting migration {}", step.metadata()),
        }

        let (metadata, mut scope) = Self::commit_step(step).map_err(|cause| {
            log::error!("Migration {} failed: {}", failed, cause);
            TidemarkError::step_failed(failed.clone(), cause)
        })?;

        let recorded = match direction {
            Direction::Up => versioning.record_applied(&metadata, scope.connection()),
            Direction::Down => versioning.record_reverted(&metadata, scope.connection()),
        };
        recorded.map_err(|cause| {
            log::error!("Migration {} committed but could not be recorded: {}", failed, cause);
            TidemarkError::step_not_recorded(failed, cause)
        })?;

        log::debug!("Migration {} took {:?}", metadata, start.elapsed());
        Ok(metadata)
    }

    fn commit_step(step: MigrationStep) -> TidemarkResult<(MigrationMetadata, TransactionScope)> {
        let mut scope = TransactionScope::begin(step.connect()?)?;
        let metadata = step.apply(scope.connection())?;
        scope.commit()?;
        Ok((metadata, scope))
    }
}
