//! Built-in in-memory backend.
//!
//! [`MemoryProvider`] is registered by default under the invariant name
//! `memory`. Its connection string names a process-wide [`MemoryDatabase`]:
//! every connection opened with the same name sees the same catalog, so a
//! database survives between migration runs for the lifetime of the process.
//!
//! Statements are the JSON encoding of [`MemoryStatement`]; the backend applies
//! them to a catalog of tables, ordered columns and rows with the same failure
//! modes a relational database has (missing tables or columns, `NOT NULL`
//! columns added to non-empty tables without a default, and so on).
//! Transactions work on a snapshot of the catalog that replaces the shared one
//! on commit.

mod catalog;
mod connection;
mod database;
mod provider;
mod statement;

pub use connection::MemoryConnection;
pub use database::MemoryDatabase;
pub use provider::MemoryProvider;
pub use statement::MemoryStatement;
