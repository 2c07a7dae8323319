//! Caller-facing entry point.

use std::sync::Arc;

use crate::common::Timestamp;
use crate::errors::TidemarkResult;
use crate::migration::{MigrationEntry, MigrationMetadata, MigrationSource};
use crate::migrator_builder::MigratorBuilder;
use crate::migrator_config::{MigratorConfig, VersioningStrategy};
use crate::process::{BatchPlanner, ExecutionReport, MigrationBatch};
use crate::provider::{ConnectionInfo, Provider, TransactionScope};
use crate::versioning::{Bootstrapping, DbVersion, Versioning};

/// Plans and runs migrations against one target database.
///
/// # Purpose
/// `Migrator` ties a [`MigrationSource`] to the configured target database:
/// it resolves the provider, loads the versioning store and hands both to the
/// [`BatchPlanner`]. Each `fetch_*` call reloads the applied state, so a
/// migrator can be reused across runs.
///
/// # Usage
/// ```rust,ignore
/// let migrator = Migrator::new("shop.db", "sqlite")?;
/// migrator.migrate_all(&registry)?;
///
/// let batch = migrator.fetch_migrations_to(&registry, Timestamp::new(20240101000000))?;
/// println!("{} step(s) to run", batch.count());
/// batch.execute()?;
/// ```
///
/// Clones share the same configuration.
#[derive(Clone)]
pub struct Migrator {
    config: MigratorConfig,
}

impl Migrator {
    /// Creates a migrator for the given database using a provider registered
    /// by default.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the connection info is invalid or the
    /// provider is not registered.
    pub fn new(connection_string: &str, provider_name: &str) -> TidemarkResult<Migrator> {
        MigratorBuilder::new()
            .connection(connection_string, provider_name)
            .build()
    }

    pub fn builder() -> MigratorBuilder {
        MigratorBuilder::new()
    }

    pub(crate) fn with_config(config: MigratorConfig) -> Self {
        Migrator { config }
    }

    pub fn config(&self) -> &MigratorConfig {
        &self.config
    }

    /// Applies every pending migration.
    pub fn migrate_all(&self, source: &dyn MigrationSource) -> TidemarkResult<ExecutionReport> {
        self.fetch_pending_migrations(source)?.execute()
    }

    /// Brings the database to `target`, applying or reverting as needed.
    pub fn migrate_to(
        &self,
        source: &dyn MigrationSource,
        target: Timestamp,
    ) -> TidemarkResult<ExecutionReport> {
        self.fetch_migrations_to(source, target)?.execute()
    }

    /// Plans, without executing, every pending migration.
    pub fn fetch_pending_migrations(&self, source: &dyn MigrationSource) -> TidemarkResult<MigrationBatch> {
        self.fetch_migrations_to(source, Timestamp::MAX)
    }

    /// Plans, without executing, the batch reaching `target`.
    ///
    /// With custom bootstrapping configured, a database without a version
    /// table is seeded first; this is the only write planning performs.
    pub fn fetch_migrations_to(
        &self,
        source: &dyn MigrationSource,
        target: Timestamp,
    ) -> TidemarkResult<MigrationBatch> {
        let info = self.config.connection_info()?;
        let provider = self.config.providers().resolve(&info)?;
        let migrations = source.migrations()?;
        let versioning = self.initialize_versioning(&info, &provider, &migrations, true)?;

        log::debug!("Planning migrations of {} to {}", info, target);
        BatchPlanner::new(info, provider, versioning).plan(migrations, target)
    }

    /// Replaces the version table with a custom store.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if custom bootstrapping is configured.
    pub fn use_custom_versioning<V: Versioning + 'static>(&self, versioning: V) -> TidemarkResult<()> {
        self.config.use_custom_versioning(Arc::new(versioning))
    }

    /// Seeds a new version table from an external record.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if custom versioning is configured.
    pub fn use_custom_bootstrapping<B: Bootstrapping + 'static>(&self, bootstrapping: B) -> TidemarkResult<()> {
        self.config.use_custom_bootstrapping(Arc::new(bootstrapping))
    }

    /// Known migrations the active versioning store reports as applied,
    /// ascending. Never bootstraps.
    pub fn applied_migrations(&self, source: &dyn MigrationSource) -> TidemarkResult<Vec<MigrationMetadata>> {
        let info = self.config.connection_info()?;
        let provider = self.config.providers().resolve(&info)?;
        let migrations = source.migrations()?;
        let versioning = self.initialize_versioning(&info, &provider, &migrations, false)?;

        let mut applied = Vec::new();
        for entry in migrations {
            if versioning.is_contained(&entry.metadata)? {
                applied.push(entry.metadata);
            }
        }
        applied.sort_by_key(|metadata| metadata.timestamp());
        Ok(applied)
    }

    fn initialize_versioning(
        &self,
        info: &ConnectionInfo,
        provider: &Arc<dyn Provider>,
        migrations: &[MigrationEntry],
        bootstrap: bool,
    ) -> TidemarkResult<Arc<dyn Versioning>> {
        let bootstrapping = match self.config.versioning_strategy() {
            VersioningStrategy::Custom(versioning) => return Ok(versioning),
            VersioningStrategy::Bootstrapped(bootstrapping) if bootstrap => Some(bootstrapping),
            _ => None,
        };

        let mut connection = provider.connect(info.connection_string())?;
        let db_version = DbVersion::load(
            provider.clone(),
            connection.as_mut(),
            &self.config.version_table(),
        )?;

        if let Some(bootstrapping) = bootstrapping {
            if db_version.is_empty() {
                let mut present = Vec::new();
                for entry in migrations {
                    if bootstrapping.is_contained(&entry.metadata)? {
                        present.push(entry.metadata.clone());
                    }
                }

                log::info!(
                    "Bootstrapping version table {} with {} migration(s)",
                    db_version.table_name(),
                    present.len()
                );
                let mut scope = TransactionScope::begin(connection)?;
                db_version.update_to_include(&present, scope.connection())?;
                scope.commit()?;
            }
        }

        Ok(Arc::new(db_version))
    }
}
