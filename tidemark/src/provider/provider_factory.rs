use dashmap::DashMap;
use std::sync::Arc;

use super::{Connection, ConnectionInfo, Provider};
use crate::common::MEMORY_PROVIDER;
use crate::errors::{ErrorKind, TidemarkError, TidemarkResult};
use crate::memory::MemoryProvider;

/// Registry of providers keyed by invariant name.
///
/// A new factory already knows the in-memory provider under
/// [`MEMORY_PROVIDER`]. Clones share the same registry.
#[derive(Clone)]
pub struct ProviderFactory {
    providers: Arc<DashMap<String, Arc<dyn Provider>>>,
}

impl Default for ProviderFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderFactory {
    pub fn new() -> Self {
        let providers: DashMap<String, Arc<dyn Provider>> = DashMap::new();
        providers.insert(MEMORY_PROVIDER.to_string(), Arc::new(MemoryProvider::new()));
        ProviderFactory {
            providers: Arc::new(providers),
        }
    }

    /// Registers a provider under its invariant name.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the name is empty or already taken.
    pub fn register(&self, provider: Arc<dyn Provider>) -> TidemarkResult<()> {
        let name = provider.invariant_name().to_string();
        if name.trim().is_empty() {
            log::error!("Provider invariant name cannot be empty");
            return Err(TidemarkError::new(
                "Provider invariant name cannot be empty",
                ErrorKind::ConfigurationError,
            ));
        }

        if self.providers.contains_key(&name) {
            log::error!("Provider {} is already registered", name);
            return Err(TidemarkError::new(
                &format!("Provider {} is already registered", name),
                ErrorKind::ConfigurationError,
            ));
        }

        log::debug!("Registered provider {}", name);
        self.providers.insert(name, provider);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.providers.contains_key(name)
    }

    /// Invariant names of all registered providers, sorted.
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.providers.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// Resolves the provider a connection info refers to.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if no provider is registered under the
    /// requested name.
    pub fn get(&self, name: &str) -> TidemarkResult<Arc<dyn Provider>> {
        match self.providers.get(name) {
            Some(provider) => Ok(provider.value().clone()),
            None => {
                log::error!("No provider registered under {}", name);
                Err(TidemarkError::new(
                    &format!("No provider registered under {}", name),
                    ErrorKind::ConfigurationError,
                ))
            }
        }
    }

    pub fn resolve(&self, info: &ConnectionInfo) -> TidemarkResult<Arc<dyn Provider>> {
        self.get(info.provider_name())
    }

    /// Opens a connection described by `info`.
    pub fn connect(&self, info: &ConnectionInfo) -> TidemarkResult<Box<dyn Connection>> {
        self.resolve(info)?.connect(info.connection_string())
    }
}
