//! Migrations of a small shop schema shared by the integration tests and the
//! demo binary.

use tidemark::common::DbType;
use tidemark::errors::TidemarkResult;
use tidemark::migration::{Migration, MigrationRegistry, ReversibleMigration};
use tidemark::schema::Database;
use tidemark_derive::MigrationExport;

pub const CREATE_CUSTOMERS: i64 = 20240101000000;
pub const ADD_CUSTOMER_EMAIL: i64 = 20240102000000;
pub const CREATE_ORDERS: i64 = 20240103000000;
pub const RENAME_ORDER_TOTAL: i64 = 20240104000000;

#[derive(MigrationExport)]
#[migration(timestamp = 20240101000000, tag = "shop")]
pub struct CreateCustomers;

impl Migration for CreateCustomers {
    fn up(&self, db: &Database) -> TidemarkResult<()> {
        db.create_table("Customers")
            .with_primary_key_column("Id", DbType::Int64)
            .with_nullable_column("Name", DbType::String)
            .of_size(100);
        Ok(())
    }
}

impl ReversibleMigration for CreateCustomers {
    fn down(&self, db: &Database) -> TidemarkResult<()> {
        db.table("Customers").drop_table();
        Ok(())
    }
}

#[derive(MigrationExport)]
#[migration(timestamp = 20240102000000, tag = "shop")]
pub struct AddCustomerEmail;

impl Migration for AddCustomerEmail {
    fn up(&self, db: &Database) -> TidemarkResult<()> {
        db.table("Customers")
            .add_nullable_column("Email", DbType::String)
            .of_size(320);
        Ok(())
    }
}

impl ReversibleMigration for AddCustomerEmail {
    fn down(&self, db: &Database) -> TidemarkResult<()> {
        db.table("Customers").column("Email").drop_column();
        Ok(())
    }
}

#[derive(MigrationExport)]
#[migration(timestamp = 20240103000000, name = "CreateOrders", tag = "shop")]
pub struct CreateOrdersMigration;

impl Migration for CreateOrdersMigration {
    fn up(&self, db: &Database) -> TidemarkResult<()> {
        db.create_table("Orders")
            .with_primary_key_column("Id", DbType::Int64)
            .as_identity()
            .with_not_nullable_column("CustomerId", DbType::Int64)
            .with_nullable_column("Total", DbType::Double);
        Ok(())
    }
}

impl ReversibleMigration for CreateOrdersMigration {
    fn down(&self, db: &Database) -> TidemarkResult<()> {
        db.table("Orders").drop_table();
        Ok(())
    }
}

/// Apply-only: a database past this point cannot be moved back before it.
#[derive(MigrationExport)]
#[migration(timestamp = 20240104000000)]
pub struct RenameOrderTotal;

impl Migration for RenameOrderTotal {
    fn up(&self, db: &Database) -> TidemarkResult<()> {
        db.table("Orders").column("Total").rename("Amount");
        Ok(())
    }
}

/// The three reversible shop migrations.
pub fn reversible_registry() -> TidemarkResult<MigrationRegistry> {
    let registry = MigrationRegistry::new();
    registry.register_reversible(CreateCustomers)?;
    registry.register_reversible(AddCustomerEmail)?;
    registry.register_reversible(CreateOrdersMigration)?;
    Ok(registry)
}

/// Every shop migration, ending with the apply-only rename.
pub fn shop_registry() -> TidemarkResult<MigrationRegistry> {
    let registry = reversible_registry()?;
    registry.register(RenameOrderTotal)?;
    Ok(registry)
}
