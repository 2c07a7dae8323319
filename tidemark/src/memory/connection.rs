use super::catalog::Catalog;
use super::{MemoryDatabase, MemoryStatement};
use crate::common::Value;
use crate::errors::{ErrorKind, TidemarkError, TidemarkResult};
use crate::provider::Connection;

/// Connection to a [`MemoryDatabase`].
///
/// Outside a transaction every statement is applied to the shared catalog
/// directly. Inside one, statements see and change a private snapshot that is
/// published on commit and discarded on rollback.
pub struct MemoryConnection {
    database: MemoryDatabase,
    transaction: Option<Catalog>,
}

impl MemoryConnection {
    pub fn new(database: MemoryDatabase) -> Self {
        MemoryConnection {
            database,
            transaction: None,
        }
    }

    pub fn database(&self) -> &MemoryDatabase {
        &self.database
    }

    pub fn in_transaction(&self) -> bool {
        self.transaction.is_some()
    }
}

impl Connection for MemoryConnection {
    fn begin(&mut self) -> TidemarkResult<()> {
        if self.transaction.is_some() {
            return Err(TidemarkError::new(
                "A transaction is already active",
                ErrorKind::InvalidOperation,
            ));
        }
        self.transaction = Some(self.database.snapshot());
        Ok(())
    }

    fn commit(&mut self) -> TidemarkResult<()> {
        match self.transaction.take() {
            Some(catalog) => {
                self.database.replace(catalog);
                Ok(())
            }
            None => Err(TidemarkError::new(
                "No active transaction to commit",
                ErrorKind::InvalidOperation,
            )),
        }
    }

    fn rollback(&mut self) -> TidemarkResult<()> {
        self.transaction = None;
        Ok(())
    }

    fn execute(&mut self, statement: &str) -> TidemarkResult<u64> {
        log::debug!("Executing on {}: {}", self.database.name(), statement);
        let decoded = MemoryStatement::decode(statement)?;
        match self.transaction.as_mut() {
            Some(catalog) => catalog.apply(&decoded),
            None => self.database.write(|catalog| catalog.apply(&decoded)),
        }
    }

    fn query(&mut self, statement: &str) -> TidemarkResult<Vec<Vec<Value>>> {
        let decoded = MemoryStatement::decode(statement)?;
        match self.transaction.as_ref() {
            Some(catalog) => catalog.query(&decoded),
            None => self.database.read(|catalog| catalog.query(&decoded)),
        }
    }
}
