//! Applied-state tracking.
//!
//! The planner asks a [`Versioning`] store which migrations are applied and the
//! executor tells it about every step that committed. [`DbVersion`] is the
//! default store and keeps one row per applied migration in a version table of
//! the target database.

mod db_version;

pub use db_version::DbVersion;

use crate::errors::TidemarkResult;
use crate::migration::MigrationMetadata;
use crate::provider::Connection;

/// Records which migrations are applied.
///
/// The record methods are called once the step's transaction has committed and
/// receive the step's connection, now outside any transaction. A step that
/// fails or does not commit is never recorded. Both are idempotent.
pub trait Versioning: Send + Sync {
    fn is_contained(&self, metadata: &MigrationMetadata) -> TidemarkResult<bool>;

    /// Marks a migration as applied after its up step committed.
    fn record_applied(
        &self,
        metadata: &MigrationMetadata,
        connection: &mut dyn Connection,
    ) -> TidemarkResult<()>;

    /// Marks a migration as no longer applied after its down step committed.
    fn record_reverted(
        &self,
        metadata: &MigrationMetadata,
        connection: &mut dyn Connection,
    ) -> TidemarkResult<()>;
}

/// External record of migrations already present in a database that predates
/// the version table.
///
/// Consulted once, the first time the default store is used on such a
/// database, to seed it.
pub trait Bootstrapping: Send + Sync {
    fn is_contained(&self, metadata: &MigrationMetadata) -> TidemarkResult<bool>;
}

impl<F> Bootstrapping for F
where
    F: Fn(&MigrationMetadata) -> bool + Send + Sync,
{
    fn is_contained(&self, metadata: &MigrationMetadata) -> TidemarkResult<bool> {
        Ok(self(metadata))
    }
}
