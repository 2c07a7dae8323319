//! # Tidemark SQLite Provider
//!
//! A [`Provider`](tidemark::provider::Provider) that compiles Tidemark's schema
//! commands to SQLite DDL and runs them through `rusqlite`.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tidemark::migrator::Migrator;
//! use tidemark_sqlite::{SqliteProvider, SQLITE_PROVIDER};
//!
//! let migrator = Migrator::builder()
//!     .register_provider(SqliteProvider::new())
//!     .connection("/var/lib/shop/shop.db", SQLITE_PROVIDER)
//!     .build()?;
//! migrator.migrate_all(&registry)?;
//! ```
//!
//! The connection string is the path of the database file. Every step opens
//! its own connection, so `:memory:` databases do not survive between steps.
//!
//! ## Limitations
//!
//! SQLite cannot drop a column default once it exists. Dropping a default
//! constraint and adding a column with a temporary default are therefore
//! rejected with `UnsupportedOperation` when the migration is compiled.

mod connection;
mod error;
mod provider;

pub use connection::SqliteConnection;
pub use error::SqliteValueError;
pub use provider::SqliteProvider;

/// Invariant name the SQLite provider is registered under.
pub const SQLITE_PROVIDER: &str = "sqlite";
