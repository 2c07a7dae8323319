use super::Connection;
use crate::common::Value;
use crate::errors::TidemarkResult;
use crate::schema::SchemaCommand;

/// Backend that compiles schema commands and opens connections.
///
/// # Purpose
/// A provider is the only component that knows a backend's dialect. Besides
/// compiling the command tree of a migration it supplies the few statements the
/// default versioning store needs to read and write its version table.
///
/// # Characteristics
/// - **Stateless**: a provider is shared between steps and threads
/// - **Named**: registered and resolved by its invariant name
/// - **Strict**: commands the backend cannot express fail with
///   [`ErrorKind::UnsupportedOperation`](crate::errors::ErrorKind::UnsupportedOperation)
///   instead of being skipped
pub trait Provider: Send + Sync {
    /// Name the provider is registered under, e.g. `"sqlite"`.
    fn invariant_name(&self) -> &str;

    /// Opens a connection to the database identified by `connection_string`.
    fn connect(&self, connection_string: &str) -> TidemarkResult<Box<dyn Connection>>;

    /// Compiles one command into the statements that carry it out, in order.
    fn compile(&self, command: &SchemaCommand) -> TidemarkResult<Vec<String>>;

    /// Statement yielding at least one row if `table` exists.
    fn table_exists(&self, table: &str) -> TidemarkResult<String>;

    /// Statement yielding every value of `column` in `table`.
    fn select_values(&self, table: &str, column: &str) -> TidemarkResult<String>;

    /// Statement inserting a single-column row.
    fn insert_value(&self, table: &str, column: &str, value: &Value) -> TidemarkResult<String>;

    /// Statement deleting the rows whose `column` equals `value`.
    fn delete_value(&self, table: &str, column: &str, value: &Value) -> TidemarkResult<String>;
}
