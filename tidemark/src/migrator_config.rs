//! Configuration management for a [`Migrator`](crate::migrator::Migrator).

use parking_lot::RwLock;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::common::DEFAULT_VERSION_TABLE;
use crate::errors::{ErrorKind, TidemarkError, TidemarkResult};
use crate::provider::{ConnectionInfo, Provider, ProviderFactory};
use crate::versioning::{Bootstrapping, Versioning};

/// Which store the planner asks about applied migrations.
///
/// Custom versioning and custom bootstrapping share this one slot, so at most
/// one of them can be configured.
#[derive(Clone, Default)]
pub enum VersioningStrategy {
    /// The version table of the target database.
    #[default]
    Default,
    /// A caller-supplied store replacing the version table.
    Custom(Arc<dyn Versioning>),
    /// The version table, seeded from an external record the first time it is
    /// created.
    Bootstrapped(Arc<dyn Bootstrapping>),
}

impl Debug for VersioningStrategy {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VersioningStrategy::Default => write!(f, "Default"),
            VersioningStrategy::Custom(_) => write!(f, "Custom"),
            VersioningStrategy::Bootstrapped(_) => write!(f, "Bootstrapped"),
        }
    }
}

/// Public interface for migrator configuration.
///
/// Clones share the same settings.
///
/// # Examples
///
/// ```rust,ignore
/// let config = MigratorConfig::new();
/// config.set_connection_info(ConnectionInfo::new("shop.db", "sqlite"))?;
/// config.register_provider(Arc::new(SqliteProvider::new()))?;
/// config.set_version_table("schema_versions")?;
/// ```
#[derive(Clone)]
pub struct MigratorConfig {
    /// The pointer to implementation. Uses Arc for cheap cloning and thread safety.
    inner: Arc<MigratorConfigInner>,
}

impl Default for MigratorConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MigratorConfig {
    /// Creates a configuration with the default version table and the
    /// in-memory provider registered.
    pub fn new() -> Self {
        MigratorConfig {
            inner: Arc::new(MigratorConfigInner::new()),
        }
    }

    /// Returns the target database.
    ///
    /// # Errors
    ///
    /// Returns error if no connection info is configured.
    pub fn connection_info(&self) -> TidemarkResult<ConnectionInfo> {
        self.inner.connection_info()
    }

    /// Sets the target database.
    ///
    /// # Errors
    ///
    /// Returns error if the connection string or the provider name is empty.
    pub fn set_connection_info(&self, connection_info: ConnectionInfo) -> TidemarkResult<()> {
        self.inner.set_connection_info(connection_info)
    }

    /// Returns the name of the version table used by the default store.
    pub fn version_table(&self) -> String {
        self.inner.version_table.read().clone()
    }

    /// Sets the name of the version table used by the default store.
    ///
    /// # Errors
    ///
    /// Returns error if the name is empty.
    pub fn set_version_table(&self, table: &str) -> TidemarkResult<()> {
        self.inner.set_version_table(table)
    }

    /// Returns the registered providers.
    pub fn providers(&self) -> &ProviderFactory {
        &self.inner.providers
    }

    /// Registers a provider under its invariant name.
    ///
    /// # Errors
    ///
    /// Returns error if another provider already uses the name.
    pub fn register_provider(&self, provider: Arc<dyn Provider>) -> TidemarkResult<()> {
        self.inner.providers.register(provider)
    }

    /// Returns the configured versioning strategy.
    pub fn versioning_strategy(&self) -> VersioningStrategy {
        self.inner.strategy.read().clone()
    }

    /// Replaces the version table with a custom store.
    ///
    /// # Errors
    ///
    /// Returns error if custom bootstrapping is already configured.
    pub fn use_custom_versioning(&self, versioning: Arc<dyn Versioning>) -> TidemarkResult<()> {
        self.inner.use_custom_versioning(versioning)
    }

    /// Seeds a version table that does not exist yet from `bootstrapping`.
    ///
    /// # Errors
    ///
    /// Returns error if custom versioning is already configured.
    pub fn use_custom_bootstrapping(&self, bootstrapping: Arc<dyn Bootstrapping>) -> TidemarkResult<()> {
        self.inner.use_custom_bootstrapping(bootstrapping)
    }
}

/// Private implementation of migrator configuration.
struct MigratorConfigInner {
    connection_info: RwLock<Option<ConnectionInfo>>,
    version_table: RwLock<String>,
    providers: ProviderFactory,
    strategy: RwLock<VersioningStrategy>,
}

impl MigratorConfigInner {
    fn new() -> Self {
        MigratorConfigInner {
            connection_info: RwLock::new(None),
            version_table: RwLock::new(DEFAULT_VERSION_TABLE.to_string()),
            providers: ProviderFactory::new(),
            strategy: RwLock::new(VersioningStrategy::Default),
        }
    }

    fn connection_info(&self) -> TidemarkResult<ConnectionInfo> {
        match self.connection_info.read().as_ref() {
            Some(info) => Ok(info.clone()),
            None => {
                log::error!("No connection info configured");
                Err(TidemarkError::new(
                    "No connection info configured",
                    ErrorKind::ConfigurationError,
                ))
            }
        }
    }

    fn set_connection_info(&self, connection_info: ConnectionInfo) -> TidemarkResult<()> {
        if connection_info.connection_string().trim().is_empty() {
            log::error!("Connection string cannot be empty");
            return Err(TidemarkError::new(
                "Connection string cannot be empty",
                ErrorKind::ConfigurationError,
            ));
        }

        if connection_info.provider_name().trim().is_empty() {
            log::error!("Provider name cannot be empty");
            return Err(TidemarkError::new(
                "Provider name cannot be empty",
                ErrorKind::ConfigurationError,
            ));
        }

        *self.connection_info.write() = Some(connection_info);
        Ok(())
    }

    fn set_version_table(&self, table: &str) -> TidemarkResult<()> {
        if table.trim().is_empty() {
            log::error!("Version table name cannot be empty");
            return Err(TidemarkError::new(
                "Version table name cannot be empty",
                ErrorKind::ConfigurationError,
            ));
        }

        *self.version_table.write() = table.to_string();
        Ok(())
    }

    fn use_custom_versioning(&self, versioning: Arc<dyn Versioning>) -> TidemarkResult<()> {
        let mut strategy = self.strategy.write();
        if matches!(*strategy, VersioningStrategy::Bootstrapped(_)) {
            log::error!("Either use custom versioning or custom bootstrapping");
            return Err(TidemarkError::new(
                "Either use custom versioning or custom bootstrapping",
                ErrorKind::ConfigurationError,
            ));
        }

        *strategy = VersioningStrategy::Custom(versioning);
        Ok(())
    }

    fn use_custom_bootstrapping(&self, bootstrapping: Arc<dyn Bootstrapping>) -> TidemarkResult<()> {
        let mut strategy = self.strategy.write();
        if matches!(*strategy, VersioningStrategy::Custom(_)) {
            log::error!("Either use custom versioning or custom bootstrapping");
            return Err(TidemarkError::new(
                "Either use custom versioning or custom bootstrapping",
                ErrorKind::ConfigurationError,
            ));
        }

        *strategy = VersioningStrategy::Bootstrapped(bootstrapping);
        Ok(())
    }
}
