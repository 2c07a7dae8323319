use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::errors::{ErrorKind, TidemarkError, TidemarkResult};
use crate::schema::Database;

/// A unit of schema change that can only be applied.
pub trait Migration: Send + Sync {
    /// Records the changes that bring the schema up to this migration.
    fn up(&self, db: &Database) -> TidemarkResult<()>;
}

/// A migration that can also be undone.
pub trait ReversibleMigration: Migration {
    /// Records the changes that undo [`Migration::up`].
    fn down(&self, db: &Database) -> TidemarkResult<()>;
}

/// Logic of a migration, tagged with its revert capability.
///
/// The planner checks [`supports_revert`](MigrationDefinition::supports_revert)
/// before it builds any down step.
#[derive(Clone)]
pub enum MigrationDefinition {
    Irreversible(Arc<dyn Migration>),
    Reversible(Arc<dyn ReversibleMigration>),
}

impl MigrationDefinition {
    pub fn irreversible<M: Migration + 'static>(migration: M) -> Self {
        MigrationDefinition::Irreversible(Arc::new(migration))
    }

    pub fn reversible<M: ReversibleMigration + 'static>(migration: M) -> Self {
        MigrationDefinition::Reversible(Arc::new(migration))
    }

    pub fn supports_revert(&self) -> bool {
        matches!(self, MigrationDefinition::Reversible(_))
    }

    pub fn up(&self, db: &Database) -> TidemarkResult<()> {
        match self {
            MigrationDefinition::Irreversible(migration) => migration.up(db),
            MigrationDefinition::Reversible(migration) => migration.up(db),
        }
    }

    /// Records the revert changes.
    ///
    /// # Errors
    ///
    /// Returns an irreversible-migration error for apply-only definitions.
    pub fn down(&self, db: &Database) -> TidemarkResult<()> {
        match self {
            MigrationDefinition::Reversible(migration) => migration.down(db),
            MigrationDefinition::Irreversible(_) => Err(TidemarkError::new(
                "Migration does not support reverting",
                ErrorKind::IrreversibleMigration,
            )),
        }
    }
}

impl Debug for MigrationDefinition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationDefinition::Irreversible(_) => write!(f, "Irreversible"),
            MigrationDefinition::Reversible(_) => write!(f, "Reversible"),
        }
    }
}
