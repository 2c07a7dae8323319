use std::sync::Arc;

use crate::errors::{TidemarkError, TidemarkResult};
use crate::migrator::Migrator;
use crate::migrator_config::MigratorConfig;
use crate::provider::{ConnectionInfo, Provider};
use crate::versioning::{Bootstrapping, Versioning};

/// Builder for creating and configuring a [`Migrator`].
///
/// `MigratorBuilder` provides a fluent API for configuring a migrator before
/// using it. It follows the builder pattern and captures errors during
/// configuration, returning the first one from [`build`](MigratorBuilder::build).
///
/// # Examples
///
/// ```rust,ignore
/// let migrator = Migrator::builder()
///     .register_provider(SqliteProvider::new())
///     .connection("shop.db", "sqlite")
///     .version_table("schema_versions")
///     .build()?;
///
/// migrator.migrate_all(&registry)?;
/// ```
pub struct MigratorBuilder {
    config: MigratorConfig,
    error: Option<TidemarkError>,
}

impl Default for MigratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MigratorBuilder {
    pub fn new() -> Self {
        MigratorBuilder {
            config: MigratorConfig::new(),
            error: None,
        }
    }

    fn capture(&mut self, result: TidemarkResult<()>) {
        if self.error.is_none() {
            if let Err(e) = result {
                self.error = Some(e);
            }
        }
    }

    /// Sets the target database and the invariant name of its provider.
    pub fn connection(mut self, connection_string: &str, provider_name: &str) -> Self {
        let result = self
            .config
            .set_connection_info(ConnectionInfo::new(connection_string, provider_name));
        self.capture(result);
        self
    }

    /// Sets the name of the version table used by the default store.
    pub fn version_table(mut self, table: &str) -> Self {
        let result = self.config.set_version_table(table);
        self.capture(result);
        self
    }

    /// Registers a provider in addition to the built-in in-memory one.
    pub fn register_provider<P: Provider + 'static>(mut self, provider: P) -> Self {
        let result = self.config.register_provider(Arc::new(provider));
        self.capture(result);
        self
    }

    /// Replaces the version table with a custom store.
    ///
    /// Cannot be combined with [`custom_bootstrapping`](MigratorBuilder::custom_bootstrapping).
    pub fn custom_versioning<V: Versioning + 'static>(mut self, versioning: V) -> Self {
        let result = self.config.use_custom_versioning(Arc::new(versioning));
        self.capture(result);
        self
    }

    /// Seeds a new version table from an external record of applied
    /// migrations.
    pub fn custom_bootstrapping<B: Bootstrapping + 'static>(mut self, bootstrapping: B) -> Self {
        let result = self.config.use_custom_bootstrapping(Arc::new(bootstrapping));
        self.capture(result);
        self
    }

    /// Builds the migrator.
    ///
    /// # Errors
    ///
    /// Returns the first error captured while configuring, or a configuration
    /// error if no connection is set or its provider is not registered.
    pub fn build(self) -> TidemarkResult<Migrator> {
        if let Some(error) = self.error {
            return Err(error);
        }

        let info = self.config.connection_info()?;
        self.config.providers().resolve(&info)?;
        Ok(Migrator::with_config(self.config))
    }
}
