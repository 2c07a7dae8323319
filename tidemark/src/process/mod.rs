//! Planning and executing migration batches.
//!
//! The [`BatchPlanner`] compares the known migrations with a [`Versioning`]
//! store and produces a [`MigrationBatch`]: down steps in descending timestamp
//! order followed by up steps in ascending order. Executing the batch runs
//! every [`MigrationStep`] in its own transaction and records it in the store
//! after that transaction commits.
//!
//! [`Versioning`]: crate::versioning::Versioning

mod batch;
mod planner;
mod report;
mod step;

pub use batch::MigrationBatch;
pub use planner::BatchPlanner;
pub use report::ExecutionReport;
pub use step::MigrationStep;
