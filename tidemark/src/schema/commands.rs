use serde::{Deserialize, Serialize};

use crate::common::{DbType, Value};
use crate::errors::TidemarkResult;
use crate::provider::Connection;

/// Definition of a column created by `CREATE TABLE` or `ADD COLUMN`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDefinition {
    pub name: String,
    pub db_type: DbType,
    pub nullable: bool,
    pub primary_key: bool,
    pub size: Option<u32>,
    pub identity: bool,
    pub default_value: Option<Value>,
}

impl ColumnDefinition {
    pub fn new(name: &str, db_type: DbType, nullable: bool) -> Self {
        ColumnDefinition {
            name: name.to_string(),
            db_type,
            nullable,
            primary_key: false,
            size: None,
            identity: false,
            default_value: None,
        }
    }

    pub(crate) fn primary_key(name: &str, db_type: DbType) -> Self {
        ColumnDefinition {
            primary_key: true,
            ..ColumnDefinition::new(name, db_type, false)
        }
    }
}

/// Snapshot of one entry of the root command list, handed to providers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SchemaCommand {
    CreateTable {
        table: String,
        columns: Vec<ColumnDefinition>,
    },
    AlterTable {
        table: String,
        operations: Vec<TableOperation>,
    },
    /// Provider-specific statement passed through verbatim.
    Sql(String),
}

impl SchemaCommand {
    /// Name of the table the command targets, if any.
    pub fn table_name(&self) -> Option<&str> {
        match self {
            SchemaCommand::CreateTable { table, .. } => Some(table),
            SchemaCommand::AlterTable { table, .. } => Some(table),
            SchemaCommand::Sql(_) => None,
        }
    }
}

/// Operation recorded on an existing table, in insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum TableOperation {
    /// Add a column. A temporary default fills existing rows and is dropped
    /// again once the column exists.
    AddColumn {
        column: ColumnDefinition,
        temporary_default: Option<Value>,
    },
    Rename {
        new_name: String,
    },
    AlterColumn {
        column: String,
        operations: Vec<ColumnOperation>,
    },
    Drop,
}

/// Operation recorded on an existing column, in insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnOperation {
    Rename { new_name: String },
    DropDefaultConstraint,
    Drop,
}

/// Imperative migration logic run against the step's connection.
pub type Callback = Box<dyn FnOnce(&mut dyn Connection) -> TidemarkResult<()> + Send>;

/// Entry of a materialized command list, in the order the migration recorded it.
pub enum RootCommand {
    /// Declarative command compiled by the provider.
    Schema(SchemaCommand),
    /// Imperative logic run directly against the connection.
    Callback(Callback),
}

impl std::fmt::Debug for RootCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RootCommand::Schema(command) => f.debug_tuple("Schema").field(command).finish(),
            RootCommand::Callback(_) => write!(f, "Callback(<fn>)"),
        }
    }
}
