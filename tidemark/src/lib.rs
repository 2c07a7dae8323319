//! # Tidemark - Timestamp-Ordered Schema Migrations
//!
//! Tidemark plans and executes ordered schema changes against a target
//! database and records which ones are applied, so that repeated runs are
//! idempotent and a database can be moved forward or back to any point in its
//! history.
//!
//! ## Key Features
//!
//! - **Ordered**: every migration carries a unique timestamp that fixes its position
//! - **Reversible plans**: downgrades are refused up front if they would need
//!   to revert a migration that cannot be reverted
//! - **Provider-agnostic DDL**: migrations describe changes through a lazily
//!   built command tree; providers compile it to statements
//! - **Transactional steps**: each step runs in its own transaction and is
//!   recorded only once it has committed
//! - **Pluggable versioning**: a version table by default, a custom store or a
//!   bootstrapped version table on request
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use tidemark::common::DbType;
//! use tidemark::errors::TidemarkResult;
//! use tidemark::migration::{Migration, MigrationRegistry, ReversibleMigration};
//! use tidemark::migrator::Migrator;
//! use tidemark::schema::Database;
//! use tidemark_derive::MigrationExport;
//!
//! #[derive(MigrationExport)]
//! #[migration(timestamp = 20240115103000)]
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
//! # fn main() -> TidemarkResult<()> {
//! let registry = MigrationRegistry::new();
//! registry.register_reversible(CreateCustomers)?;
//!
//! let migrator = Migrator::new("shop", "memory")?;
//! let report = migrator.migrate_all(&registry)?;
//! assert_eq!(report.applied().len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Module Organization
//!
//! - [`common`] - Timestamps, values, column types and constants
//! - [`errors`] - Error types and result definitions
//! - [`memory`] - Built-in in-memory backend
//! - [`migration`] - Migration traits, metadata and registration
//! - [`migrator`] - Caller-facing entry point
//! - [`migrator_builder`] - Fluent migrator configuration
//! - [`migrator_config`] - Migrator configuration
//! - [`process`] - Batch planning and execution
//! - [`provider`] - Provider, connection and transaction abstractions
//! - [`schema`] - Schema-change command model
//! - [`versioning`] - Applied-state tracking

pub mod common;
pub mod errors;
pub mod memory;
pub mod migration;
pub mod migrator;
pub mod migrator_builder;
pub mod migrator_config;
pub mod process;
pub mod provider;
pub mod schema;
pub mod versioning;

pub use migrator::Migrator;
pub use migrator_builder::MigratorBuilder;
pub use migrator_config::{MigratorConfig, VersioningStrategy};
