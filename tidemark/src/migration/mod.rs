//! Migrations and how they are made known to the engine.
//!
//! A migration is a type implementing [`Migration`] (apply only) or
//! [`ReversibleMigration`] (apply and revert), identified by a
//! [`MigrationMetadata`] whose timestamp is the sole ordering and identity key.
//!
//! ```rust,ignore
//! #[derive(MigrationExport)]
//! #[migration(timestamp = 20240115103000, name = "CreateCustomers")]
//! struct CreateCustomers;
//!
//! impl Migration for CreateCustomers {
//!     fn up(&self, db: &Database) -> TidemarkResult<()> {
//!         db.create_table("Customers")
//!             .with_primary_key_column("Id", DbType::Int32)
//!             .with_nullable_column("Name", DbType::String);
//!         Ok(())
//!     }
//! }
//!
//! impl ReversibleMigration for CreateCustomers {
//!     fn down(&self, db: &Database) -> TidemarkResult<()> {
//!         db.table("Customers").drop_table();
//!         Ok(())
//!     }
//! }
//!
//! let registry = MigrationRegistry::new();
//! registry.register_reversible(CreateCustomers)?;
//! ```

mod definition;
mod metadata;
mod registry;

pub use definition::{Migration, MigrationDefinition, ReversibleMigration};
pub use metadata::{MigrationExport, MigrationMetadata};
pub use registry::{MigrationEntry, MigrationRegistry, MigrationSource};
