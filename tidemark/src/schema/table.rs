use parking_lot::Mutex;
use std::sync::Arc;

use super::ad_hoc::AdHocCollection;
use super::column::{AddColumnNode, AddedColumn, AlterColumnNode, ExistingColumn, NewColumn};
use super::commands::{ColumnDefinition, SchemaCommand, TableOperation};
use super::database::ErrorSlot;
use crate::common::DbType;

pub(crate) struct CreateTableNode {
    name: String,
    columns: Vec<Arc<Mutex<ColumnDefinition>>>,
}

impl CreateTableNode {
    pub(crate) fn snapshot(&self) -> SchemaCommand {
        SchemaCommand::CreateTable {
            table: self.name.clone(),
            columns: self.columns.iter().map(|c| c.lock().clone()).collect(),
        }
    }
}

/// Handle on a `CREATE TABLE` command.
#[derive(Clone)]
pub struct NewTable {
    node: Arc<Mutex<CreateTableNode>>,
    errors: ErrorSlot,
}

impl NewTable {
    pub(crate) fn new(name: &str, errors: ErrorSlot) -> Self {
        NewTable {
            node: Arc::new(Mutex::new(CreateTableNode {
                name: name.to_string(),
                columns: Vec::new(),
            })),
            errors,
        }
    }

    pub(crate) fn node(&self) -> Arc<Mutex<CreateTableNode>> {
        self.node.clone()
    }

    pub fn name(&self) -> String {
        self.node.lock().name.clone()
    }

    pub fn with_primary_key_column(&self, name: &str, db_type: DbType) -> NewColumn {
        self.push(ColumnDefinition::primary_key(name, db_type))
    }

    pub fn with_not_nullable_column(&self, name: &str, db_type: DbType) -> NewColumn {
        self.push(ColumnDefinition::new(name, db_type, false))
    }

    pub fn with_nullable_column(&self, name: &str, db_type: DbType) -> NewColumn {
        self.push(ColumnDefinition::new(name, db_type, true))
    }

    fn push(&self, column: ColumnDefinition) -> NewColumn {
        self.errors.check_name("Column", &column.name);
        let column = Arc::new(Mutex::new(column));
        self.node.lock().columns.push(column.clone());
        NewColumn::new(self.clone(), column, self.errors.clone())
    }
}

pub(crate) enum TableOpNode {
    AddColumn(Arc<Mutex<AddColumnNode>>),
    Rename(String),
    AlterColumn(ExistingColumn),
    Drop,
}

pub(crate) struct AlterTableNode {
    name: String,
    operations: Vec<TableOpNode>,
}

struct ExistingTableInner {
    node: Arc<Mutex<AlterTableNode>>,
    columns: AdHocCollection<ExistingColumn>,
    errors: ErrorSlot,
}

/// Handle on the alter command of an existing table.
///
/// Obtained from [`Database::table`](super::Database::table). Clones share the
/// same command; [`ExistingTable::same_as`] tells whether two handles do.
#[derive(Clone)]
pub struct ExistingTable {
    inner: Arc<ExistingTableInner>,
}

impl ExistingTable {
    pub(crate) fn new(name: &str, errors: ErrorSlot) -> Self {
        let node = Arc::new(Mutex::new(AlterTableNode {
            name: name.to_string(),
            operations: Vec::new(),
        }));

        let columns = {
            let node = node.clone();
            let errors = errors.clone();
            AdHocCollection::new(move |column: &str| {
                errors.check_name("Column", column);
                let existing = ExistingColumn::new(column, errors.clone());
                node.lock()
                    .operations
                    .push(TableOpNode::AlterColumn(existing.clone()));
                existing
            })
        };

        ExistingTable {
            inner: Arc::new(ExistingTableInner {
                node,
                columns,
                errors,
            }),
        }
    }

    pub fn name(&self) -> String {
        self.inner.node.lock().name.clone()
    }

    /// Adds a non-nullable column. Tables with rows need a default, see
    /// [`AddedColumn::with_temporary_default`].
    pub fn add_column(&self, name: &str, db_type: DbType) -> AddedColumn {
        self.push_column(ColumnDefinition::new(name, db_type, false))
    }

    pub fn add_nullable_column(&self, name: &str, db_type: DbType) -> AddedColumn {
        self.push_column(ColumnDefinition::new(name, db_type, true))
    }

    pub fn rename(&self, new_name: &str) -> ExistingTable {
        self.inner.errors.check_name("Table", new_name);
        self.inner
            .node
            .lock()
            .operations
            .push(TableOpNode::Rename(new_name.to_string()));
        self.clone()
    }

    /// Returns the alter command of a column, creating it on first access.
    pub fn column(&self, name: &str) -> ExistingColumn {
        self.inner.columns.get(name)
    }

    pub fn columns(&self) -> &AdHocCollection<ExistingColumn> {
        &self.inner.columns
    }

    pub fn drop_table(&self) {
        self.inner.node.lock().operations.push(TableOpNode::Drop);
    }

    /// Whether both handles refer to the same alter command.
    pub fn same_as(&self, other: &ExistingTable) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    fn push_column(&self, column: ColumnDefinition) -> AddedColumn {
        self.inner.errors.check_name("Column", &column.name);
        let node = Arc::new(Mutex::new(AddColumnNode::new(column)));
        self.inner
            .node
            .lock()
            .operations
            .push(TableOpNode::AddColumn(node.clone()));
        AddedColumn::new(self.clone(), node, self.inner.errors.clone())
    }

    pub(crate) fn snapshot(&self) -> Option<SchemaCommand> {
        let node = self.inner.node.lock();
        let operations: Vec<TableOperation> = node
            .operations
            .iter()
            .filter_map(|operation| match operation {
                TableOpNode::AddColumn(add) => Some(add.lock().snapshot()),
                TableOpNode::Rename(new_name) => Some(TableOperation::Rename {
                    new_name: new_name.clone(),
                }),
                TableOpNode::AlterColumn(column) => column.snapshot(),
                TableOpNode::Drop => Some(TableOperation::Drop),
            })
            .collect();

        if operations.is_empty() {
            None
        } else {
            Some(SchemaCommand::AlterTable {
                table: node.name.clone(),
                operations,
            })
        }
    }
}
