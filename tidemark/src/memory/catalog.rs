use im::{OrdMap, Vector};

use super::MemoryStatement;
use crate::common::Value;
use crate::errors::{ErrorKind, TidemarkError, TidemarkResult};
use crate::schema::{ColumnDefinition, ColumnOperation, SchemaCommand, TableOperation};

type Row = OrdMap<String, Value>;

fn provider_error(message: String) -> TidemarkError {
    TidemarkError::new(&message, ErrorKind::ProviderError)
}

fn no_such_table(table: &str) -> TidemarkError {
    provider_error(format!("no such table: {}", table))
}

#[derive(Clone)]
pub(crate) struct MemoryTable {
    columns: Vector<ColumnDefinition>,
    rows: Vector<Row>,
}

impl MemoryTable {
    pub(crate) fn columns(&self) -> impl Iterator<Item = &ColumnDefinition> {
        self.columns.iter()
    }

    pub(crate) fn row_count(&self) -> usize {
        self.rows.len()
    }

    fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    fn column(&self, table: &str, name: &str) -> TidemarkResult<&ColumnDefinition> {
        self.column_index(name)
            .and_then(|index| self.columns.get(index))
            .ok_or_else(|| provider_error(format!("no such column: {}.{}", table, name)))
    }

    pub(crate) fn values(&self, table: &str, column: &str) -> TidemarkResult<Vec<Value>> {
        self.column(table, column)?;
        Ok(self
            .rows
            .iter()
            .map(|row| row.get(column).cloned().unwrap_or(Value::Null))
            .collect())
    }

    fn add_column(
        &mut self,
        table: &str,
        column: &ColumnDefinition,
        temporary_default: Option<&Value>,
    ) -> TidemarkResult<()> {
        if self.column_index(&column.name).is_some() {
            return Err(provider_error(format!(
                "duplicate column name: {}.{}",
                table, column.name
            )));
        }

        let fill = temporary_default
            .or(column.default_value.as_ref())
            .cloned()
            .unwrap_or(Value::Null);
        if !column.nullable && fill.is_null() && !self.rows.is_empty() {
            return Err(provider_error(format!(
                "Cannot add NOT NULL column {} without a default to non-empty table {}",
                column.name, table
            )));
        }

        for row in self.rows.iter_mut() {
            row.insert(column.name.clone(), fill.clone());
        }
        self.columns.push_back(column.clone());
        Ok(())
    }

    fn alter_column(&mut self, table: &str, name: &str, operations: &[ColumnOperation]) -> TidemarkResult<()> {
        let mut current = name.to_string();
        for operation in operations {
            let index = self
                .column_index(&current)
                .ok_or_else(|| provider_error(format!("no such column: {}.{}", table, current)))?;

            match operation {
                ColumnOperation::Rename { new_name } => {
                    if self.column_index(new_name).is_some() {
                        return Err(provider_error(format!(
                            "duplicate column name: {}.{}",
                            table, new_name
                        )));
                    }
                    if let Some(column) = self.columns.get_mut(index) {
                        column.name = new_name.clone();
                    }
                    for row in self.rows.iter_mut() {
                        if let Some(value) = row.remove(&current) {
                            row.insert(new_name.clone(), value);
                        }
                    }
                    current = new_name.clone();
                }
                ColumnOperation::DropDefaultConstraint => match self.columns.get_mut(index) {
                    Some(column) if column.default_value.is_some() => column.default_value = None,
                    _ => {
                        return Err(provider_error(format!(
                            "Column {}.{} has no default constraint",
                            table, current
                        )))
                    }
                },
                ColumnOperation::Drop => {
                    self.columns.remove(index);
                    for row in self.rows.iter_mut() {
                        row.remove(&current);
                    }
                }
            }
        }
        Ok(())
    }

    fn insert_row(&mut self, table: &str, values: &[(String, Value)]) -> TidemarkResult<()> {
        for (column, _) in values {
            self.column(table, column)?;
        }

        let mut row = Row::new();
        for column in self.columns.iter() {
            let supplied = values
                .iter()
                .find(|(name, _)| *name == column.name)
                .map(|(_, value)| value.clone());

            let value = match supplied {
                Some(value) => value,
                None if column.identity => Value::Integer(self.next_identity(table, &column.name)?),
                None => column.default_value.clone().unwrap_or(Value::Null),
            };

            if value.is_null() && !column.nullable {
                return Err(provider_error(format!(
                    "NOT NULL constraint failed: {}.{}",
                    table, column.name
                )));
            }
            row.insert(column.name.clone(), value);
        }

        let key: Vec<&ColumnDefinition> = self.columns.iter().filter(|c| c.primary_key).collect();
        if !key.is_empty()
            && self
                .rows
                .iter()
                .any(|existing| key.iter().all(|c| existing.get(&c.name) == row.get(&c.name)))
        {
            return Err(provider_error(format!(
                "UNIQUE constraint failed: {}",
                table
            )));
        }

        self.rows.push_back(row);
        Ok(())
    }

    fn next_identity(&self, table: &str, column: &str) -> TidemarkResult<i64> {
        self.rows
            .iter()
            .filter_map(|row| row.get(column).and_then(Value::as_integer))
            .max()
            .unwrap_or(0)
            .checked_add(1)
            .ok_or_else(|| provider_error(format!("identity {}.{} is exhausted", table, column)))
    }

    fn delete(&mut self, table: &str, column: &str, value: &Value) -> TidemarkResult<u64> {
        self.column(table, column)?;
        let before = self.rows.len();
        self.rows.retain(|row| row.get(column) != Some(value));
        Ok((before - self.rows.len()) as u64)
    }
}

/// Tables of one in-memory database.
///
/// Cloning is cheap; a transaction works on a clone and replaces the shared
/// catalog on commit.
#[derive(Clone, Default)]
pub(crate) struct Catalog {
    tables: OrdMap<String, MemoryTable>,
}

impl Catalog {
    pub(crate) fn table(&self, name: &str) -> Option<&MemoryTable> {
        self.tables.get(name)
    }

    pub(crate) fn table_names(&self) -> Vec<String> {
        self.tables.keys().cloned().collect()
    }

    fn table_mut(&mut self, name: &str) -> TidemarkResult<&mut MemoryTable> {
        self.tables.get_mut(name).ok_or_else(|| no_such_table(name))
    }

    /// Applies a mutating statement. A failing statement leaves the catalog
    /// unchanged.
    pub(crate) fn apply(&mut self, statement: &MemoryStatement) -> TidemarkResult<u64> {
        let backup = self.tables.clone();
        let result = self.apply_statement(statement);
        if result.is_err() {
            self.tables = backup;
        }
        result
    }

    fn apply_statement(&mut self, statement: &MemoryStatement) -> TidemarkResult<u64> {
        match statement {
            MemoryStatement::Schema(command) => {
                self.apply_command(command)?;
                Ok(0)
            }
            MemoryStatement::Insert {
                table,
                column,
                value,
            } => {
                self.insert_row(table, &[(column.clone(), value.clone())])?;
                Ok(1)
            }
            MemoryStatement::Delete {
                table,
                column,
                value,
            } => self.table_mut(table)?.delete(table, column, value),
            MemoryStatement::TableExists { .. } | MemoryStatement::Select { .. } => Err(
                TidemarkError::new("Queries cannot be executed", ErrorKind::InvalidOperation),
            ),
        }
    }

    pub(crate) fn insert_row(&mut self, table: &str, values: &[(String, Value)]) -> TidemarkResult<()> {
        self.table_mut(table)?.insert_row(table, values)
    }

    pub(crate) fn query(&self, statement: &MemoryStatement) -> TidemarkResult<Vec<Vec<Value>>> {
        match statement {
            MemoryStatement::TableExists { table } => {
                if self.tables.contains_key(table) {
                    Ok(vec![vec![Value::Text(table.clone())]])
                } else {
                    Ok(vec![])
                }
            }
            MemoryStatement::Select { table, column } => {
                let values = self
                    .table(table)
                    .ok_or_else(|| no_such_table(table))?
                    .values(table, column)?;
                Ok(values.into_iter().map(|value| vec![value]).collect())
            }
            _ => Err(TidemarkError::new(
                "Statement does not yield rows",
                ErrorKind::InvalidOperation,
            )),
        }
    }

    fn apply_command(&mut self, command: &SchemaCommand) -> TidemarkResult<()> {
        match command {
            SchemaCommand::CreateTable { table, columns } => self.create_table(table, columns),
            SchemaCommand::AlterTable { table, operations } => self.alter_table(table, operations),
            SchemaCommand::Sql(sql) => Err(TidemarkError::new(
                &format!("The memory provider cannot run SQL: {}", sql),
                ErrorKind::UnsupportedOperation,
            )),
        }
    }

    fn create_table(&mut self, table: &str, columns: &[ColumnDefinition]) -> TidemarkResult<()> {
        if self.tables.contains_key(table) {
            return Err(provider_error(format!("table {} already exists", table)));
        }
        if columns.is_empty() {
            return Err(provider_error(format!(
                "table {} must have at least one column",
                table
            )));
        }

        let mut created = MemoryTable {
            columns: Vector::new(),
            rows: Vector::new(),
        };
        for column in columns {
            created.add_column(table, column, None)?;
        }
        self.tables.insert(table.to_string(), created);
        Ok(())
    }

    fn alter_table(&mut self, table: &str, operations: &[TableOperation]) -> TidemarkResult<()> {
        let mut current = table.to_string();
        for operation in operations {
            match operation {
                TableOperation::AddColumn {
                    column,
                    temporary_default,
                } => {
                    self.table_mut(&current)?
                        .add_column(&current, column, temporary_default.as_ref())?;
                }
                TableOperation::Rename { new_name } => {
                    if self.tables.contains_key(new_name) {
                        return Err(provider_error(format!("table {} already exists", new_name)));
                    }
                    let renamed = self
                        .tables
                        .remove(&current)
                        .ok_or_else(|| no_such_table(&current))?;
                    self.tables.insert(new_name.clone(), renamed);
                    current = new_name.clone();
                }
                TableOperation::AlterColumn { column, operations } => {
                    self.table_mut(&current)?
                        .alter_column(&current, column, operations)?;
                }
                TableOperation::Drop => {
                    self.tables
                        .remove(&current)
                        .ok_or_else(|| no_such_table(&current))?;
                }
            }
        }
        Ok(())
    }
}
