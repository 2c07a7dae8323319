//! Provider-agnostic description of schema changes.
//!
//! Migrations describe the DDL they intend through a [`Database`] handle. Every
//! call is recorded, never executed: the resulting command tree is compiled to
//! statements later by a [`Provider`](crate::provider::Provider).
//!
//! ```rust,ignore
//! db.create_table("Customers")
//!     .with_primary_key_column("Id", DbType::Int32)
//!     .with_nullable_column("Name", DbType::String).of_size(255);
//!
//! db.table("Orders")
//!     .add_column("Total", DbType::Decimal).with_temporary_default(0)
//!     .add_nullable_column("Note", DbType::String);
//!
//! db.table("Orders").column("Ref").rename("Reference");
//! db.table("Orders").column("Status").drop_default_constraint();
//! ```
//!
//! Tables and columns are looked up through ad-hoc collections: the first
//! lookup of a name creates the corresponding alter command and registers it
//! with its owner, later lookups return the same handle.

mod ad_hoc;
mod column;
mod commands;
mod context;
mod database;
mod table;

pub use ad_hoc::AdHocCollection;
pub use column::{AddedColumn, ExistingColumn, NewColumn};
pub use commands::{ColumnDefinition, ColumnOperation, RootCommand, SchemaCommand, TableOperation};
pub use context::MigrationContext;
pub use database::Database;
pub use table::{ExistingTable, NewTable};
