use parking_lot::Mutex;
use std::sync::Arc;

use super::ad_hoc::AdHocCollection;
use super::commands::{Callback, RootCommand, SchemaCommand};
use super::context::MigrationContext;
use super::table::{CreateTableNode, ExistingTable, NewTable};
use crate::errors::{ErrorKind, TidemarkError, TidemarkResult};
use crate::provider::Connection;

/// First invalid input seen while a migration records its commands.
///
/// The fluent API cannot return a `Result` from every call without breaking
/// chaining, so invalid names are captured here and surfaced when the commands
/// are materialized, before anything reaches the provider.
#[derive(Clone, Default)]
pub(crate) struct ErrorSlot(Arc<Mutex<Option<TidemarkError>>>);

impl ErrorSlot {
    pub(crate) fn check_name(&self, what: &str, name: &str) {
        if name.trim().is_empty() {
            self.record(TidemarkError::new(
                &format!("{} name cannot be empty", what),
                ErrorKind::ValidationError,
            ));
        }
    }

    pub(crate) fn record(&self, error: TidemarkError) {
        let mut slot = self.0.lock();
        if slot.is_none() {
            log::error!("Invalid schema command: {}", error);
            *slot = Some(error);
        }
    }

    pub(crate) fn has_error(&self) -> bool {
        self.0.lock().is_some()
    }

    fn take(&self) -> Option<TidemarkError> {
        self.0.lock().take()
    }
}

pub(crate) enum RootEntry {
    CreateTable(Arc<Mutex<CreateTableNode>>),
    AlterTable(ExistingTable),
    Sql(String),
    Callback(Callback),
}

impl RootEntry {
    fn snapshot(&self) -> Option<SchemaCommand> {
        match self {
            RootEntry::CreateTable(node) => Some(node.lock().snapshot()),
            RootEntry::AlterTable(table) => table.snapshot(),
            RootEntry::Sql(sql) => Some(SchemaCommand::Sql(sql.clone())),
            RootEntry::Callback(_) => None,
        }
    }
}

/// Root of the schema-change command tree handed to a migration.
///
/// # Purpose
/// `Database` records what a migration intends to do. It owns the root command
/// list; tables reached through [`Database::table`] are created on first access
/// and registered in that list exactly once.
///
/// # Usage
/// ```rust,ignore
/// fn up(&self, db: &Database) -> TidemarkResult<()> {
///     db.create_table("Customers")
///         .with_primary_key_column("Id", DbType::Int32)
///         .with_nullable_column("Name", DbType::String);
///     db.table("Orders").add_nullable_column("CustomerId", DbType::Int32);
///     Ok(())
/// }
/// ```
pub struct Database {
    context: MigrationContext,
    root: Arc<Mutex<Vec<RootEntry>>>,
    tables: AdHocCollection<ExistingTable>,
    errors: ErrorSlot,
}

impl Database {
    pub fn new(context: MigrationContext) -> Self {
        let root: Arc<Mutex<Vec<RootEntry>>> = Arc::new(Mutex::new(Vec::new()));
        let errors = ErrorSlot::default();

        let tables = {
            let root = root.clone();
            let errors = errors.clone();
            AdHocCollection::new(move |name: &str| {
                errors.check_name("Table", name);
                let table = ExistingTable::new(name, errors.clone());
                root.lock().push(RootEntry::AlterTable(table.clone()));
                table
            })
        };

        Database {
            context,
            root,
            tables,
            errors,
        }
    }

    pub fn context(&self) -> &MigrationContext {
        &self.context
    }

    /// Records the creation of a new table.
    pub fn create_table(&self, name: &str) -> NewTable {
        self.errors.check_name("Table", name);
        let table = NewTable::new(name, self.errors.clone());
        self.root.lock().push(RootEntry::CreateTable(table.node()));
        table
    }

    /// Returns the alter command of an existing table, creating it on first access.
    pub fn table(&self, name: &str) -> ExistingTable {
        self.tables.get(name)
    }

    /// The existing tables touched so far, keyed by name.
    pub fn tables(&self) -> &AdHocCollection<ExistingTable> {
        &self.tables
    }

    /// Records a provider-specific statement to run verbatim.
    pub fn execute_sql(&self, sql: &str) {
        if sql.trim().is_empty() {
            self.errors.record(TidemarkError::new(
                "SQL statement cannot be empty",
                ErrorKind::ValidationError,
            ));
        }
        self.root.lock().push(RootEntry::Sql(sql.to_string()));
    }

    /// Records imperative logic to run against the step's connection, in order
    /// with the surrounding commands.
    pub fn execute<F>(&self, callback: F)
    where
        F: FnOnce(&mut dyn Connection) -> TidemarkResult<()> + Send + 'static,
    {
        self.root.lock().push(RootEntry::Callback(Box::new(callback)));
    }

    /// Number of entries in the root command list, including empty ones.
    pub fn command_count(&self) -> usize {
        self.root.lock().len()
    }

    /// Snapshot of the declarative commands recorded so far.
    ///
    /// Alter commands that ended up without operations and imperative callbacks
    /// are left out.
    pub fn commands(&self) -> Vec<SchemaCommand> {
        self.root
            .lock()
            .iter()
            .filter_map(RootEntry::snapshot)
            .collect()
    }

    /// Consumes the database and returns its commands in recording order.
    ///
    /// # Errors
    ///
    /// Returns the first validation error recorded while the migration was
    /// describing its changes.
    pub fn into_commands(self) -> TidemarkResult<Vec<RootCommand>> {
        if let Some(error) = self.errors.take() {
            return Err(error);
        }

        let entries = std::mem::take(&mut *self.root.lock());
        let mut commands = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                RootEntry::Callback(callback) => commands.push(RootCommand::Callback(callback)),
                other => {
                    if let Some(command) = other.snapshot() {
                        commands.push(RootCommand::Schema(command));
                    }
                }
            }
        }
        Ok(commands)
    }
}
