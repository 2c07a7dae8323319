use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::{Arc, LazyLock};

use super::catalog::Catalog;
use crate::common::Value;
use crate::errors::{ErrorKind, TidemarkError, TidemarkResult};

static DATABASES: LazyLock<DashMap<String, MemoryDatabase>> = LazyLock::new(DashMap::new);

/// Named in-memory database shared by every connection opened with its name.
///
/// Besides backing [`MemoryConnection`](super::MemoryConnection)s it offers a
/// small inspection API, used mostly by tests to look at the effect of a
/// migration run and to seed rows before one.
///
/// ```rust,ignore
/// let db = MemoryDatabase::open("shop");
/// assert!(db.has_table("Customers"));
/// assert_eq!(db.columns("Customers"), Some(vec!["Id".to_string(), "Name".to_string()]));
/// ```
#[derive(Clone)]
pub struct MemoryDatabase {
    name: String,
    catalog: Arc<RwLock<Catalog>>,
}

impl MemoryDatabase {
    /// Returns the database registered under `name`, creating an empty one on
    /// first use.
    pub fn open(name: &str) -> MemoryDatabase {
        DATABASES
            .entry(name.to_string())
            .or_insert_with(|| {
                log::debug!("Creating in-memory database {}", name);
                MemoryDatabase {
                    name: name.to_string(),
                    catalog: Arc::new(RwLock::new(Catalog::default())),
                }
            })
            .clone()
    }

    /// Forgets the database registered under `name`. Open handles keep
    /// working on their copy.
    pub fn remove(name: &str) -> bool {
        DATABASES.remove(name).is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.catalog.read().table(table).is_some()
    }

    pub fn table_names(&self) -> Vec<String> {
        self.catalog.read().table_names()
    }

    /// Column names of `table` in definition order.
    pub fn columns(&self, table: &str) -> Option<Vec<String>> {
        self.catalog
            .read()
            .table(table)
            .map(|t| t.columns().map(|c| c.name.clone()).collect())
    }

    pub fn row_count(&self, table: &str) -> Option<usize> {
        self.catalog.read().table(table).map(|t| t.row_count())
    }

    /// Values of `column` in `table`, in insertion order.
    pub fn values(&self, table: &str, column: &str) -> TidemarkResult<Vec<Value>> {
        let catalog = self.catalog.read();
        let found = catalog.table(table).ok_or_else(|| {
            TidemarkError::new(&format!("no such table: {}", table), ErrorKind::ProviderError)
        })?;
        found.values(table, column)
    }

    /// Inserts a row outside of any transaction.
    pub fn insert_row(&self, table: &str, values: &[(&str, Value)]) -> TidemarkResult<()> {
        let values: Vec<(String, Value)> = values
            .iter()
            .map(|(column, value)| (column.to_string(), value.clone()))
            .collect();
        self.catalog.write().insert_row(table, &values)
    }

    pub(crate) fn snapshot(&self) -> Catalog {
        self.catalog.read().clone()
    }

    pub(crate) fn replace(&self, catalog: Catalog) {
        *self.catalog.write() = catalog;
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&Catalog) -> R) -> R {
        f(&self.catalog.read())
    }

    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut Catalog) -> R) -> R {
        f(&mut self.catalog.write())
    }
}
