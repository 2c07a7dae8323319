use rusqlite::types::ValueRef;
use tidemark::common::Value;
use tidemark::errors::{ErrorKind, TidemarkError, TidemarkResult};
use tidemark::provider::Connection;

use crate::error::{to_tidemark_error, SqliteValueError};

/// Connection to a SQLite database file.
pub struct SqliteConnection {
    connection: rusqlite::Connection,
    in_transaction: bool,
}

impl SqliteConnection {
    pub fn open(path: &str) -> TidemarkResult<SqliteConnection> {
        let connection = rusqlite::Connection::open(path).map_err(to_tidemark_error)?;
        log::debug!("Opened SQLite database {}", path);
        Ok(SqliteConnection {
            connection,
            in_transaction: false,
        })
    }

    /// Whether a transaction started through [`Connection::begin`] is open.
    pub fn in_transaction(&self) -> bool {
        self.in_transaction
    }
}

fn to_value(index: usize, value: ValueRef<'_>) -> TidemarkResult<Value> {
    match value {
        ValueRef::Null => Ok(Value::Null),
        ValueRef::Integer(value) => Ok(Value::Integer(value)),
        ValueRef::Real(value) => Ok(Value::Float(value)),
        ValueRef::Text(bytes) => std::str::from_utf8(bytes)
            .map(|text| Value::Text(text.to_string()))
            .map_err(|_| SqliteValueError::InvalidUtf8(index).into()),
        ValueRef::Blob(_) => Err(SqliteValueError::Blob(index).into()),
    }
}

impl Connection for SqliteConnection {
    fn begin(&mut self) -> TidemarkResult<()> {
        if self.in_transaction {
            return Err(TidemarkError::new(
                "A transaction is already open on this connection",
                ErrorKind::InvalidOperation,
            ));
        }
        self.connection
            .execute_batch("BEGIN")
            .map_err(to_tidemark_error)?;
        self.in_transaction = true;
        Ok(())
    }

    fn commit(&mut self) -> TidemarkResult<()> {
        if !self.in_transaction {
            return Err(TidemarkError::new(
                "No transaction to commit",
                ErrorKind::InvalidOperation,
            ));
        }
        self.connection
            .execute_batch("COMMIT")
            .map_err(to_tidemark_error)?;
        self.in_transaction = false;
        Ok(())
    }

    fn rollback(&mut self) -> TidemarkResult<()> {
        if !self.in_transaction {
            return Ok(());
        }
        self.in_transaction = false;
        self.connection
            .execute_batch("ROLLBACK")
            .map_err(to_tidemark_error)
    }

    fn execute(&mut self, statement: &str) -> TidemarkResult<u64> {
        log::trace!("Executing {}", statement);
        let changed = self
            .connection
            .execute(statement, [])
            .map_err(to_tidemark_error)?;
        Ok(changed as u64)
    }

    fn query(&mut self, statement: &str) -> TidemarkResult<Vec<Vec<Value>>> {
        log::trace!("Querying {}", statement);
        let mut prepared = self
            .connection
            .prepare(statement)
            .map_err(to_tidemark_error)?;
        let column_count = prepared.column_count();
        let mut rows = prepared.query([]).map_err(to_tidemark_error)?;

        let mut result = Vec::new();
        while let Some(row) = rows.next().map_err(to_tidemark_error)? {
            let mut values = Vec::with_capacity(column_count);
            for index in 0..column_count {
                let value = row.get_ref(index).map_err(to_tidemark_error)?;
                values.push(to_value(index, value)?);
            }
            result.push(values);
        }
        Ok(result)
    }
}
