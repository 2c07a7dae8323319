use super::{MemoryConnection, MemoryDatabase, MemoryStatement};
use crate::common::{Value, MEMORY_PROVIDER};
use crate::errors::{ErrorKind, TidemarkError, TidemarkResult};
use crate::provider::{Connection, Provider};
use crate::schema::SchemaCommand;

/// Provider for [`MemoryDatabase`]s. The connection string is the database
/// name.
#[derive(Debug, Clone, Default)]
pub struct MemoryProvider;

impl MemoryProvider {
    pub fn new() -> Self {
        MemoryProvider
    }
}

impl Provider for MemoryProvider {
    fn invariant_name(&self) -> &str {
        MEMORY_PROVIDER
    }

    fn connect(&self, connection_string: &str) -> TidemarkResult<Box<dyn Connection>> {
        if connection_string.trim().is_empty() {
            return Err(TidemarkError::new(
                "Memory connection string must name a database",
                ErrorKind::ProviderError,
            ));
        }
        Ok(Box::new(MemoryConnection::new(MemoryDatabase::open(
            connection_string,
        ))))
    }

    fn compile(&self, command: &SchemaCommand) -> TidemarkResult<Vec<String>> {
        Ok(vec![MemoryStatement::Schema(command.clone()).encode()?])
    }

    fn table_exists(&self, table: &str) -> TidemarkResult<String> {
        MemoryStatement::TableExists {
            table: table.to_string(),
        }
        .encode()
    }

    fn select_values(&self, table: &str, column: &str) -> TidemarkResult<String> {
        MemoryStatement::Select {
            table: table.to_string(),
            column: column.to_string(),
        }
        .encode()
    }

    fn insert_value(&self, table: &str, column: &str, value: &Value) -> TidemarkResult<String> {
        MemoryStatement::Insert {
            table: table.to_string(),
            column: column.to_string(),
            value: value.clone(),
        }
        .encode()
    }

    fn delete_value(&self, table: &str, column: &str, value: &Value) -> TidemarkResult<String> {
        MemoryStatement::Delete {
            table: table.to_string(),
            column: column.to_string(),
            value: value.clone(),
        }
        .encode()
    }
}
