use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;

use super::Versioning;
use crate::common::{DbType, Direction, Timestamp, Value, VERSION_COLUMN};
use crate::errors::{ErrorKind, TidemarkError, TidemarkResult};
use crate::migration::MigrationMetadata;
use crate::provider::{Connection, Provider};
use crate::schema::{Database, MigrationContext};

struct VersionState {
    table_exists: bool,
    applied: BTreeSet<Timestamp>,
}

/// Default versioning store backed by a version table in the target database.
///
/// # Purpose
/// The version table has a single `timestamp` column holding one row per
/// applied migration. It is read once when the store is loaded and created on
/// the first write if it does not exist yet.
///
/// # Characteristics
/// - **Cached**: queries are answered from the set loaded at creation
/// - **Serialized**: reads and writes go through one `RwLock`
/// - **Lazy**: no table is created until something is recorded
///
/// [`DbVersion::is_empty`] tells a database that never had a version table
/// apart from one whose table is merely empty, which is what bootstrapping
/// keys on.
pub struct DbVersion {
    provider: Arc<dyn Provider>,
    table: String,
    state: RwLock<VersionState>,
}

impl DbVersion {
    /// Loads the applied set from `table` through `connection`.
    ///
    /// # Errors
    ///
    /// Returns a versioning store error if the table cannot be read or holds a
    /// value that is not a timestamp.
    pub fn load(
        provider: Arc<dyn Provider>,
        connection: &mut dyn Connection,
        table: &str,
    ) -> TidemarkResult<Self> {
        let state = Self::read_state(provider.as_ref(), connection, table).map_err(|err| {
            log::error!("Failed to read version table {}: {}", table, err);
            TidemarkError::new_with_cause(
                &format!("Failed to read version table {}", table),
                ErrorKind::VersioningStoreError,
                err,
            )
        })?;

        log::debug!(
            "Loaded version table {} ({} applied migration(s), exists: {})",
            table,
            state.applied.len(),
            state.table_exists
        );

        Ok(DbVersion {
            provider,
            table: table.to_string(),
            state: RwLock::new(state),
        })
    }

    fn read_state(
        provider: &dyn Provider,
        connection: &mut dyn Connection,
        table: &str,
    ) -> TidemarkResult<VersionState> {
        let exists = !connection.query(&provider.table_exists(table)?)?.is_empty();
        let mut applied = BTreeSet::new();
        if exists {
            let rows = connection.query(&provider.select_values(table, VERSION_COLUMN)?)?;
            for row in rows {
                match row.first().and_then(Value::as_integer) {
                    Some(value) => {
                        applied.insert(Timestamp::new(value));
                    }
                    None => {
                        return Err(TidemarkError::new(
                            &format!("Invalid version record {:?}", row),
                            ErrorKind::VersioningStoreError,
                        ))
                    }
                }
            }
        }

        Ok(VersionState {
            table_exists: exists,
            applied,
        })
    }

    pub fn table_name(&self) -> &str {
        &self.table
    }

    /// Whether the version table does not exist yet.
    pub fn is_empty(&self) -> bool {
        !self.state.read().table_exists
    }

    /// Applied timestamps, ascending.
    pub fn applied(&self) -> Vec<Timestamp> {
        self.state.read().applied.iter().copied().collect()
    }

    /// Marks migrations as applied without running them. Migrations already
    /// recorded are skipped.
    pub fn update_to_include(
        &self,
        metadatas: &[MigrationMetadata],
        connection: &mut dyn Connection,
    ) -> TidemarkResult<()> {
        let mut state = self.state.write();
        self.ensure_table(&mut state, connection)
            .map_err(|err| self.store_error("create the version table", err))?;

        for metadata in metadatas {
            if state.applied.contains(&metadata.timestamp()) {
                continue;
            }
            self.insert(metadata, connection)
                .map_err(|err| self.store_error("bootstrap the version table", err))?;
            state.applied.insert(metadata.timestamp());
        }
        Ok(())
    }

    fn ensure_table(&self, state: &mut VersionState, connection: &mut dyn Connection) -> TidemarkResult<()> {
        if state.table_exists {
            return Ok(());
        }

        log::info!("Creating version table {}", self.table);
        let db = Database::new(MigrationContext::new(self.provider.invariant_name(), Direction::Up));
        db.create_table(&self.table)
            .with_primary_key_column(VERSION_COLUMN, DbType::Int64);
        for command in db.commands() {
            for statement in self.provider.compile(&command)? {
                connection.execute(&statement)?;
            }
        }
        state.table_exists = true;
        Ok(())
    }

    fn insert(&self, metadata: &MigrationMetadata, connection: &mut dyn Connection) -> TidemarkResult<()> {
        let value = Value::Integer(metadata.timestamp().value());
        let statement = self.provider.insert_value(&self.table, VERSION_COLUMN, &value)?;
        connection.execute(&statement)?;
        Ok(())
    }

    fn store_error(&self, action: &str, cause: TidemarkError) -> TidemarkError {
        log::error!("Failed to {} {}: {}", action, self.table, cause);
        TidemarkError::new_with_cause(
            &format!("Failed to {} {}", action, self.table),
            ErrorKind::VersioningStoreError,
            cause,
        )
    }
}

impl Versioning for DbVersion {
    fn is_contained(&self, metadata: &MigrationMetadata) -> TidemarkResult<bool> {
        Ok(self.state.read().applied.contains(&metadata.timestamp()))
    }

    fn record_applied(
        &self,
        metadata: &MigrationMetadata,
        connection: &mut dyn Connection,
    ) -> TidemarkResult<()> {
        let mut state = self.state.write();
        if state.applied.contains(&metadata.timestamp()) {
            return Ok(());
        }

        self.ensure_table(&mut state, connection)
            .and_then(|_| self.insert(metadata, connection))
            .map_err(|err| self.store_error("record an applied migration in", err))?;
        state.applied.insert(metadata.timestamp());
        Ok(())
    }

    fn record_reverted(
        &self,
        metadata: &MigrationMetadata,
        connection: &mut dyn Connection,
    ) -> TidemarkResult<()> {
        let mut state = self.state.write();
        if !state.applied.contains(&metadata.timestamp()) {
            return Ok(());
        }

        let value = Value::Integer(metadata.timestamp().value());
        self.provider
            .delete_value(&self.table, VERSION_COLUMN, &value)
            .and_then(|statement| connection.execute(&statement))
            .map_err(|err| self.store_error("record a reverted migration in", err))?;
        state.applied.remove(&metadata.timestamp());
        Ok(())
    }
}
