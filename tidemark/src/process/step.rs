use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::common::Direction;
use crate::errors::TidemarkResult;
use crate::migration::{MigrationDefinition, MigrationMetadata};
use crate::provider::{Connection, ConnectionInfo, Provider};
use crate::schema::{Database, MigrationContext, RootCommand};

/// One migration bound to a provider, a target database and a direction.
///
/// Steps are created by the [`BatchPlanner`](super::BatchPlanner) and consumed
/// by [`apply`](MigrationStep::apply), so each runs at most once. A step does
/// not touch the versioning store.
pub struct MigrationStep {
    metadata: MigrationMetadata,
    definition: MigrationDefinition,
    direction: Direction,
    connection_info: ConnectionInfo,
    provider: Arc<dyn Provider>,
}

impl MigrationStep {
    pub fn new(
        metadata: MigrationMetadata,
        definition: MigrationDefinition,
        direction: Direction,
        connection_info: ConnectionInfo,
        provider: Arc<dyn Provider>,
    ) -> Self {
        MigrationStep {
            metadata,
            definition,
            direction,
            connection_info,
            provider,
        }
    }

    pub fn metadata(&self) -> &MigrationMetadata {
        &self.metadata
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn connection_info(&self) -> &ConnectionInfo {
        &self.connection_info
    }

    /// Opens a connection to the step's target database.
    pub fn connect(&self) -> TidemarkResult<Box<dyn Connection>> {
        self.provider.connect(self.connection_info.connection_string())
    }

    /// Runs the migration's up or down logic and carries out the recorded
    /// commands on `connection`, in recording order.
    ///
    /// # Errors
    ///
    /// Returns the first error of the migration logic, of command validation,
    /// of compilation or of the backend. Statements already run are left to
    /// the caller's transaction.
    pub fn apply(self, connection: &mut dyn Connection) -> TidemarkResult<MigrationMetadata> {
        let db = Database::new(MigrationContext::new(
            self.provider.invariant_name(),
            self.direction,
        ));
        match self.direction {
            Direction::Up => self.definition.up(&db)?,
            Direction::Down => self.definition.down(&db)?,
        }

        for command in db.into_commands()? {
            match command {
                RootCommand::Schema(command) => {
                    for statement in self.provider.compile(&command)? {
                        connection.execute(&statement)?;
                    }
                }
                RootCommand::Callback(callback) => callback(&mut *connection)?,
            }
        }
        Ok(self.metadata)
    }
}

impl Debug for MigrationStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MigrationStep")
            .field("metadata", &self.metadata)
            .field("direction", &self.direction)
            .field("connection_info", &self.connection_info)
            .finish()
    }
}
