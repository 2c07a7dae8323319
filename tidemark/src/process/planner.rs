use itertools::Itertools;
use std::sync::Arc;

use super::{MigrationBatch, MigrationStep};
use crate::common::{Direction, Timestamp};
use crate::errors::{ErrorKind, TidemarkError, TidemarkResult};
use crate::migration::{MigrationEntry, MigrationMetadata};
use crate::provider::{ConnectionInfo, Provider};
use crate::versioning::Versioning;

/// Computes the steps needed to bring a database to a target timestamp.
///
/// Planning only reads the versioning store. Every error it returns is raised
/// before any batch exists, so nothing has touched the database.
pub struct BatchPlanner {
    connection_info: ConnectionInfo,
    provider: Arc<dyn Provider>,
    versioning: Arc<dyn Versioning>,
}

impl BatchPlanner {
    pub fn new(
        connection_info: ConnectionInfo,
        provider: Arc<dyn Provider>,
        versioning: Arc<dyn Versioning>,
    ) -> Self {
        BatchPlanner {
            connection_info,
            provider,
            versioning,
        }
    }

    /// Plans the batch reaching `target`; [`Timestamp::MAX`] applies everything
    /// pending.
    ///
    /// - up steps: timestamp at most `target` and not applied, ascending
    /// - down steps: timestamp above `target` and applied, descending
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::ConfigurationError`] if two migrations share a timestamp
    /// - [`ErrorKind::IrreversibleMigration`] if a down step would be needed
    ///   for a migration that cannot be reverted
    /// - [`ErrorKind::VersioningStoreError`] if the store cannot be queried
    pub fn plan(&self, migrations: Vec<MigrationEntry>, target: Timestamp) -> TidemarkResult<MigrationBatch> {
        if let Some(duplicate) = migrations
            .iter()
            .map(|entry| entry.metadata.timestamp())
            .duplicates()
            .next()
        {
            log::error!("Several migrations share timestamp {}", duplicate.value());
            return Err(TidemarkError::new(
                &format!("Several migrations share timestamp {}", duplicate.value()),
                ErrorKind::ConfigurationError,
            ));
        }

        let mut up = Vec::new();
        let mut down = Vec::new();
        for entry in migrations {
            let contained = self.is_contained(&entry.metadata)?;
            let timestamp = entry.metadata.timestamp();
            if timestamp <= target && !contained {
                up.push(entry);
            } else if timestamp > target && contained {
                down.push(entry);
            }
        }

        let irreversible: Vec<String> = down
            .iter()
            .filter(|entry| !entry.definition.supports_revert())
            .map(|entry| entry.metadata.to_string())
            .collect();
        if !irreversible.is_empty() {
            log::error!(
                "Cannot migrate to {}: irreversible migration(s) {} are applied",
                target,
                irreversible.join(", ")
            );
            return Err(TidemarkError::new(
                &format!(
                    "Cannot migrate to {}: irreversible migration(s) {} are applied",
                    target,
                    irreversible.join(", ")
                ),
                ErrorKind::IrreversibleMigration,
            ));
        }

        log::info!(
            "Found {} (up: {}, down: {}) applicable migration(s)",
            up.len() + down.len(),
            up.len(),
            down.len()
        );

        if up.is_empty() && down.is_empty() {
            return Ok(MigrationBatch::empty());
        }

        let down_steps = down
            .into_iter()
            .sorted_by_key(|entry| std::cmp::Reverse(entry.metadata.timestamp()))
            .map(|entry| self.step(entry, Direction::Down))
            .collect();
        let up_steps = up
            .into_iter()
            .sorted_by_key(|entry| entry.metadata.timestamp())
            .map(|entry| self.step(entry, Direction::Up))
            .collect();

        Ok(MigrationBatch::new(down_steps, up_steps, self.versioning.clone()))
    }

    fn is_contained(&self, metadata: &MigrationMetadata) -> TidemarkResult<bool> {
        self.versioning.is_contained(metadata).map_err(|err| {
            if err.kind() == &ErrorKind::VersioningStoreError {
                err
            } else {
                TidemarkError::new_with_cause(
                    &format!("Failed to look up migration {}", metadata),
                    ErrorKind::VersioningStoreError,
                    err,
                )
            }
        })
    }

    fn step(&self, entry: MigrationEntry, direction: Direction) -> MigrationStep {
        MigrationStep::new(
            entry.metadata,
            entry.definition,
            direction,
            self.connection_info.clone(),
            self.provider.clone(),
        )
    }
}
