use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::{Migration, MigrationDefinition, MigrationExport, MigrationMetadata, ReversibleMigration};
use crate::common::Timestamp;
use crate::errors::{ErrorKind, TidemarkError, TidemarkResult};

/// A known migration: its identity and its logic.
#[derive(Debug, Clone)]
pub struct MigrationEntry {
    pub metadata: MigrationMetadata,
    pub definition: MigrationDefinition,
}

impl MigrationEntry {
    pub fn new(metadata: MigrationMetadata, definition: MigrationDefinition) -> Self {
        MigrationEntry {
            metadata,
            definition,
        }
    }
}

/// Supplies the set of known migrations. Order is irrelevant; timestamps must
/// be unique.
pub trait MigrationSource {
    fn migrations(&self) -> TidemarkResult<Vec<MigrationEntry>>;
}

impl MigrationSource for Vec<MigrationEntry> {
    fn migrations(&self) -> TidemarkResult<Vec<MigrationEntry>> {
        Ok(self.clone())
    }
}

/// Explicitly registered migrations, kept in timestamp order.
///
/// Clones share the same registry.
#[derive(Clone, Default)]
pub struct MigrationRegistry {
    entries: Arc<RwLock<BTreeMap<Timestamp, MigrationEntry>>>,
}

impl MigrationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an apply-only migration.
    pub fn register<M: Migration + MigrationExport + 'static>(&self, migration: M) -> TidemarkResult<()> {
        self.register_with(M::metadata(), MigrationDefinition::irreversible(migration))
    }

    /// Registers a migration that can be reverted.
    pub fn register_reversible<M: ReversibleMigration + MigrationExport + 'static>(
        &self,
        migration: M,
    ) -> TidemarkResult<()> {
        self.register_with(M::metadata(), MigrationDefinition::reversible(migration))
    }

    /// Registers a definition under explicit metadata.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the name is empty, the timestamp is
    /// the [`Timestamp::MAX`] sentinel or another migration already uses it.
    pub fn register_with(
        &self,
        metadata: MigrationMetadata,
        definition: MigrationDefinition,
    ) -> TidemarkResult<()> {
        if metadata.name().trim().is_empty() {
            log::error!("Migration name cannot be empty");
            return Err(TidemarkError::new(
                "Migration name cannot be empty",
                ErrorKind::ConfigurationError,
            ));
        }

        if metadata.timestamp().is_max() {
            log::error!("Migration {} uses the reserved maximum timestamp", metadata.name());
            return Err(TidemarkError::new(
                &format!(
                    "Migration {} uses the reserved maximum timestamp",
                    metadata.name()
                ),
                ErrorKind::ConfigurationError,
            ));
        }

        let mut entries = self.entries.write();
        if let Some(existing) = entries.get(&metadata.timestamp()) {
            log::error!(
                "Migrations {} and {} share timestamp {}",
                existing.metadata.name(),
                metadata.name(),
                metadata.timestamp().value()
            );
            return Err(TidemarkError::new(
                &format!(
                    "Migrations {} and {} share timestamp {}",
                    existing.metadata.name(),
                    metadata.name(),
                    metadata.timestamp().value()
                ),
                ErrorKind::ConfigurationError,
            ));
        }

        log::debug!("Registered migration {}", metadata);
        entries.insert(metadata.timestamp(), MigrationEntry::new(metadata, definition));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Metadata of every registered migration, ascending.
    pub fn metadata(&self) -> Vec<MigrationMetadata> {
        self.entries
            .read()
            .values()
            .map(|entry| entry.metadata.clone())
            .collect()
    }
}

impl MigrationSource for MigrationRegistry {
    fn migrations(&self) -> TidemarkResult<Vec<MigrationEntry>> {
        Ok(self.entries.read().values().cloned().collect())
    }
}
