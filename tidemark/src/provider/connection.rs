use crate::common::Value;
use crate::errors::TidemarkResult;

/// Live connection to a target database.
///
/// Connections are opaque to the engine: it only begins, commits and rolls
/// back transactions and runs statements produced by the owning
/// [`Provider`](super::Provider). Backend failures are reported as
/// [`ErrorKind::ProviderError`](crate::errors::ErrorKind::ProviderError).
pub trait Connection: Send {
    /// Starts a transaction.
    fn begin(&mut self) -> TidemarkResult<()>;

    /// Commits the current transaction.
    fn commit(&mut self) -> TidemarkResult<()>;

    /// Discards the current transaction.
    fn rollback(&mut self) -> TidemarkResult<()>;

    /// Runs a statement and returns the number of affected rows.
    fn execute(&mut self, statement: &str) -> TidemarkResult<u64>;

    /// Runs a statement and returns the rows it yields.
    fn query(&mut self, statement: &str) -> TidemarkResult<Vec<Vec<Value>>>;
}
