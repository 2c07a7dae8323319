use parking_lot::Mutex;
use std::sync::Arc;

use super::commands::{ColumnDefinition, ColumnOperation, TableOperation};
use super::database::ErrorSlot;
use super::table::{ExistingTable, NewTable};
use crate::common::{DbType, Value};
use crate::errors::{ErrorKind, TidemarkError};

fn check_size(errors: &ErrorSlot, column: &ColumnDefinition) {
    if !column.db_type.is_sized() {
        errors.record(TidemarkError::new(
            &format!(
                "Column {} of type {} does not take a size",
                column.name, column.db_type
            ),
            ErrorKind::ValidationError,
        ));
    }
}

/// Column being defined as part of a `CREATE TABLE` command.
///
/// Modifiers apply to this column; the `with_*` methods continue with the next
/// column of the same table.
#[derive(Clone)]
pub struct NewColumn {
    table: NewTable,
    column: Arc<Mutex<ColumnDefinition>>,
    errors: ErrorSlot,
}

impl NewColumn {
    pub(crate) fn new(table: NewTable, column: Arc<Mutex<ColumnDefinition>>, errors: ErrorSlot) -> Self {
        NewColumn {
            table,
            column,
            errors,
        }
    }

    pub fn of_size(self, size: u32) -> Self {
        {
            let mut column = self.column.lock();
            check_size(&self.errors, &column);
            column.size = Some(size);
        }
        self
    }

    pub fn as_identity(self) -> Self {
        self.column.lock().identity = true;
        self
    }

    pub fn having_default(self, value: impl Into<Value>) -> Self {
        self.column.lock().default_value = Some(value.into());
        self
    }

    pub fn with_primary_key_column(&self, name: &str, db_type: DbType) -> NewColumn {
        self.table.with_primary_key_column(name, db_type)
    }

    pub fn with_not_nullable_column(&self, name: &str, db_type: DbType) -> NewColumn {
        self.table.with_not_nullable_column(name, db_type)
    }

    pub fn with_nullable_column(&self, name: &str, db_type: DbType) -> NewColumn {
        self.table.with_nullable_column(name, db_type)
    }

    pub fn table(&self) -> NewTable {
        self.table.clone()
    }
}

pub(crate) struct AddColumnNode {
    column: ColumnDefinition,
    temporary_default: Option<Value>,
}

impl AddColumnNode {
    pub(crate) fn new(column: ColumnDefinition) -> Self {
        AddColumnNode {
            column,
            temporary_default: None,
        }
    }

    pub(crate) fn snapshot(&self) -> TableOperation {
        TableOperation::AddColumn {
            column: self.column.clone(),
            temporary_default: self.temporary_default.clone(),
        }
    }
}

/// Column added to an existing table.
#[derive(Clone)]
pub struct AddedColumn {
    table: ExistingTable,
    node: Arc<Mutex<AddColumnNode>>,
    errors: ErrorSlot,
}

impl AddedColumn {
    pub(crate) fn new(table: ExistingTable, node: Arc<Mutex<AddColumnNode>>, errors: ErrorSlot) -> Self {
        AddedColumn {
            table,
            node,
            errors,
        }
    }

    pub fn of_size(self, size: u32) -> Self {
        {
            let mut node = self.node.lock();
            check_size(&self.errors, &node.column);
            node.column.size = Some(size);
        }
        self
    }

    /// Keeps `value` as the column's permanent default.
    pub fn having_default(self, value: impl Into<Value>) -> Self {
        self.node.lock().column.default_value = Some(value.into());
        self
    }

    /// Fills existing rows with `value`; the default is dropped once the column
    /// has been added.
    pub fn with_temporary_default(self, value: impl Into<Value>) -> Self {
        self.node.lock().temporary_default = Some(value.into());
        self
    }

    pub fn add_column(&self, name: &str, db_type: DbType) -> AddedColumn {
        self.table.add_column(name, db_type)
    }

    pub fn add_nullable_column(&self, name: &str, db_type: DbType) -> AddedColumn {
        self.table.add_nullable_column(name, db_type)
    }

    pub fn table(&self) -> ExistingTable {
        self.table.clone()
    }
}

pub(crate) struct AlterColumnNode {
    name: String,
    operations: Vec<ColumnOperation>,
}

struct ExistingColumnInner {
    node: Mutex<AlterColumnNode>,
    errors: ErrorSlot,
}

/// Handle on the alter command of an existing column.
#[derive(Clone)]
pub struct ExistingColumn {
    inner: Arc<ExistingColumnInner>,
}

impl ExistingColumn {
    pub(crate) fn new(name: &str, errors: ErrorSlot) -> Self {
        ExistingColumn {
            inner: Arc::new(ExistingColumnInner {
                node: Mutex::new(AlterColumnNode {
                    name: name.to_string(),
                    operations: Vec::new(),
                }),
                errors,
            }),
        }
    }

    pub fn name(&self) -> String {
        self.inner.node.lock().name.clone()
    }

    pub fn rename(&self, new_name: &str) -> ExistingColumn {
        self.inner.errors.check_name("Column", new_name);
        self.push(ColumnOperation::Rename {
            new_name: new_name.to_string(),
        })
    }

    pub fn drop_default_constraint(&self) -> ExistingColumn {
        self.push(ColumnOperation::DropDefaultConstraint)
    }

    pub fn drop_column(&self) {
        self.push(ColumnOperation::Drop);
    }

    /// Whether both handles refer to the same alter command.
    pub fn same_as(&self, other: &ExistingColumn) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn push(&self, operation: ColumnOperation) -> ExistingColumn {
        self.inner.node.lock().operations.push(operation);
        self.clone()
    }

    pub(crate) fn snapshot(&self) -> Option<TableOperation> {
        let node = self.inner.node.lock();
        if node.operations.is_empty() {
            return None;
        }
        Some(TableOperation::AlterColumn {
            column: node.name.clone(),
            operations: node.operations.clone(),
        })
    }
}
