use tidemark::common::{DbType, Value};
use tidemark::errors::{ErrorKind, TidemarkError, TidemarkResult};
use tidemark::provider::{Connection, Provider};
use tidemark::schema::{ColumnDefinition, ColumnOperation, SchemaCommand, TableOperation};

use crate::connection::SqliteConnection;
use crate::SQLITE_PROVIDER;

/// Compiles schema commands to SQLite DDL.
///
/// # Type mapping
///
/// | DbType                             | SQLite                         |
/// |------------------------------------|--------------------------------|
/// | Boolean, Byte, Int16/32/64         | `INTEGER`                      |
/// | Decimal                            | `NUMERIC`, `NUMERIC(size)`     |
/// | Double                             | `REAL`                         |
/// | String, AnsiString                 | `TEXT`, `VARCHAR(size)`        |
/// | Date, DateTime, Guid               | `TEXT`                         |
/// | Binary                             | `BLOB`                         |
///
/// An identity column must be the single integer primary key of its table and
/// becomes `INTEGER PRIMARY KEY AUTOINCREMENT`.
#[derive(Debug, Clone, Default)]
pub struct SqliteProvider;

impl SqliteProvider {
    pub fn new() -> Self {
        SqliteProvider
    }
}

fn unsupported(message: &str) -> TidemarkError {
    log::error!("{}", message);
    TidemarkError::new(message, ErrorKind::UnsupportedOperation)
}

fn quote(identifier: &str) -> String {
    format!("\"{}\"", identifier.replace('"', "\"\""))
}

fn literal(value: &Value) -> TidemarkResult<String> {
    match value {
        Value::Null => Ok("NULL".to_string()),
        Value::Bool(value) => Ok(if *value { "1" } else { "0" }.to_string()),
        Value::Integer(value) => Ok(value.to_string()),
        Value::Float(value) if value.is_finite() => Ok(value.to_string()),
        Value::Float(value) => Err(unsupported(&format!(
            "SQLite cannot store the literal {}",
            value
        ))),
        Value::Text(value) => Ok(format!("'{}'", value.replace('\'', "''"))),
    }
}

fn is_integer(db_type: DbType) -> bool {
    matches!(
        db_type,
        DbType::Boolean | DbType::Byte | DbType::Int16 | DbType::Int32 | DbType::Int64
    )
}

fn column_type(column: &ColumnDefinition) -> String {
    match (column.db_type, column.size) {
        (db_type, _) if is_integer(db_type) => "INTEGER".to_string(),
        (DbType::Decimal, Some(size)) => format!("NUMERIC({})", size),
        (DbType::Decimal, None) => "NUMERIC".to_string(),
        (DbType::Double, _) => "REAL".to_string(),
        (DbType::String | DbType::AnsiString, Some(size)) => format!("VARCHAR({})", size),
        (DbType::Binary, _) => "BLOB".to_string(),
        _ => "TEXT".to_string(),
    }
}

fn column_sql(column: &ColumnDefinition, inline_key: bool) -> TidemarkResult<String> {
    let mut sql = format!("{} {}", quote(&column.name), column_type(column));
    if inline_key {
        sql.push_str(" PRIMARY KEY AUTOINCREMENT");
    }
    if !column.nullable {
        sql.push_str(" NOT NULL");
    }
    if let Some(default) = &column.default_value {
        sql.push_str(" DEFAULT ");
        sql.push_str(&literal(default)?);
    }
    Ok(sql)
}

fn create_table(table: &str, columns: &[ColumnDefinition]) -> TidemarkResult<String> {
    if columns.is_empty() {
        return Err(TidemarkError::new(
            &format!("Table {} must have at least one column", table),
            ErrorKind::ValidationError,
        ));
    }

    let keys: Vec<&ColumnDefinition> = columns.iter().filter(|c| c.primary_key).collect();
    let identity = match columns.iter().find(|c| c.identity) {
        None => None,
        Some(column)
            if keys.len() == 1 && keys[0].name == column.name && is_integer(column.db_type) =>
        {
            Some(column.name.as_str())
        }
        Some(column) => {
            return Err(unsupported(&format!(
                "SQLite identity column {} must be the only integer primary key of {}",
                column.name, table
            )))
        }
    };

    let mut definitions = Vec::with_capacity(columns.len() + 1);
    for column in columns {
        definitions.push(column_sql(column, identity == Some(column.name.as_str()))?);
    }
    if identity.is_none() && !keys.is_empty() {
        let names: Vec<String> = keys.iter().map(|c| quote(&c.name)).collect();
        definitions.push(format!("PRIMARY KEY ({})", names.join(", ")));
    }

    Ok(format!(
        "CREATE TABLE {} ({})",
        quote(table),
        definitions.join(", ")
    ))
}

fn alter_table(table: &str, operations: &[TableOperation]) -> TidemarkResult<Vec<String>> {
    let mut table = table.to_string();
    let mut statements = Vec::with_capacity(operations.len());

    for operation in operations {
        match operation {
            TableOperation::AddColumn {
                temporary_default: Some(_),
                column,
            } => {
                return Err(unsupported(&format!(
                    "SQLite cannot drop the temporary default of column {}.{}",
                    table, column.name
                )))
            }
            TableOperation::AddColumn { column, .. } => {
                if column.primary_key || column.identity {
                    return Err(unsupported(&format!(
                        "SQLite cannot add key column {} to existing table {}",
                        column.name, table
                    )));
                }
                statements.push(format!(
                    "ALTER TABLE {} ADD COLUMN {}",
                    quote(&table),
                    column_sql(column, false)?
                ));
            }
            TableOperation::Rename { new_name } => {
                statements.push(format!(
                    "ALTER TABLE {} RENAME TO {}",
                    quote(&table),
                    quote(new_name)
                ));
                table = new_name.clone();
            }
            TableOperation::AlterColumn { column, operations } => {
                let mut column = column.clone();
                for operation in operations {
                    match operation {
                        ColumnOperation::Rename { new_name } => {
                            statements.push(format!(
                                "ALTER TABLE {} RENAME COLUMN {} TO {}",
                                quote(&table),
                                quote(&column),
                                quote(new_name)
                            ));
                            column = new_name.clone();
                        }
                        ColumnOperation::DropDefaultConstraint => {
                            return Err(unsupported(&format!(
                                "SQLite cannot drop the default constraint of column {}.{}",
                                table, column
                            )))
                        }
                        ColumnOperation::Drop => statements.push(format!(
                            "ALTER TABLE {} DROP COLUMN {}",
                            quote(&table),
                            quote(&column)
                        )),
                    }
                }
            }
            TableOperation::Drop => statements.push(format!("DROP TABLE {}", quote(&table))),
        }
    }
    Ok(statements)
}

impl Provider for SqliteProvider {
    fn invariant_name(&self) -> &str {
        SQLITE_PROVIDER
    }

    fn connect(&self, connection_string: &str) -> TidemarkResult<Box<dyn Connection>> {
        if connection_string.trim().is_empty() {
            return Err(TidemarkError::new(
                "SQLite connection string must be a database path",
                ErrorKind::ProviderError,
            ));
        }
        Ok(Box::new(SqliteConnection::open(connection_string)?))
    }

    fn compile(&self, command: &SchemaCommand) -> TidemarkResult<Vec<String>> {
        match command {
            SchemaCommand::CreateTable { table, columns } => Ok(vec![create_table(table, columns)?]),
            SchemaCommand::AlterTable { table, operations } => alter_table(table, operations),
            SchemaCommand::Sql(statement) => Ok(vec![statement.clone()]),
        }
    }

    fn table_exists(&self, table: &str) -> TidemarkResult<String> {
        Ok(format!(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name = {}",
            literal(&Value::from(table))?
        ))
    }

    fn select_values(&self, table: &str, column: &str) -> TidemarkResult<String> {
        Ok(format!("SELECT {} FROM {}", quote(column), quote(table)))
    }

    fn insert_value(&self, table: &str, column: &str, value: &Value) -> TidemarkResult<String> {
        Ok(format!(
            "INSERT INTO {} ({}) VALUES ({})",
            quote(table),
            quote(column),
            literal(value)?
        ))
    }

    fn delete_value(&self, table: &str, column: &str, value: &Value) -> TidemarkResult<String> {
        Ok(format!(
            "DELETE FROM {} WHERE {} = {}",
            quote(table),
            quote(column),
            literal(value)?
        ))
    }
}
