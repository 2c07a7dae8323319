use tidemark::common::Timestamp;
use tidemark::errors::TidemarkResult;
use tidemark::migration::MigrationMetadata;
use tidemark::migrator::Migrator;
use tidemark::provider::Connection;
use tidemark::versioning::Versioning;
use tidemark_int_test::fixtures::*;
use tidemark_int_test::test_util::{
    cleanup, create_memory_context, create_sqlite_context, run_test, TestContext,
};

struct Untracked;

impl Versioning for Untracked {
    fn is_contained(&self, _metadata: &MigrationMetadata) -> TidemarkResult<bool> {
        Ok(false)
    }

    fn record_applied(&self, _: &MigrationMetadata, _: &mut dyn Connection) -> TidemarkResult<()> {
        Ok(())
    }

    fn record_reverted(&self, _: &MigrationMetadata, _: &mut dyn Connection) -> TidemarkResult<()> {
        Ok(())
    }
}

/// Brings the database to `target` without leaving a version table behind,
/// as a database migrated by some other tool would look.
fn legacy_schema(ctx: &TestContext, target: i64) -> TidemarkResult<()> {
    let migrator = ctx.migrator()?;
    migrator.use_custom_versioning(Untracked)?;
    migrator.migrate_to(&shop_registry()?, Timestamp::new(target))?;
    assert!(!ctx.has_table("tidemark_versions")?);
    Ok(())
}

fn bootstrapped_migrator(ctx: &TestContext) -> TidemarkResult<Migrator> {
    let migrator = ctx.migrator()?;
    migrator.use_custom_bootstrapping(|metadata: &MigrationMetadata| {
        metadata.timestamp().value() <= ADD_CUSTOMER_EMAIL
    })?;
    Ok(migrator)
}

fn bootstrapping_seeds_version_table(ctx: TestContext) -> TidemarkResult<()> {
    legacy_schema(&ctx, ADD_CUSTOMER_EMAIL)?;
    let migrator = bootstrapped_migrator(&ctx)?;

    let report = migrator.migrate_all(&shop_registry()?)?;
    let applied: Vec<&str> = report.applied().iter().map(|m| m.name()).collect();
    assert_eq!(applied, vec!["CreateOrders", "RenameOrderTotal"]);
    assert_eq!(
        ctx.recorded_versions()?,
        vec![CREATE_CUSTOMERS, ADD_CUSTOMER_EMAIL, CREATE_ORDERS, RENAME_ORDER_TOTAL]
    );
    Ok(())
}

fn bootstrapping_happens_on_fetch(ctx: TestContext) -> TidemarkResult<()> {
    legacy_schema(&ctx, ADD_CUSTOMER_EMAIL)?;
    let migrator = bootstrapped_migrator(&ctx)?;

    let batch = migrator.fetch_pending_migrations(&shop_registry()?)?;
    assert_eq!(batch.count(), 2);
    assert_eq!(ctx.recorded_versions()?, vec![CREATE_CUSTOMERS, ADD_CUSTOMER_EMAIL]);
    Ok(())
}

fn bootstrapping_ignored_once_table_exists(ctx: TestContext) -> TidemarkResult<()> {
    ctx.migrator()?
        .migrate_to(&shop_registry()?, Timestamp::new(CREATE_CUSTOMERS))?;

    let migrator = bootstrapped_migrator(&ctx)?;
    let batch = migrator.fetch_pending_migrations(&shop_registry()?)?;
    assert_eq!(batch.count(), 3);
    assert_eq!(ctx.recorded_versions()?, vec![CREATE_CUSTOMERS]);
    Ok(())
}

fn applied_migrations_never_bootstraps(ctx: TestContext) -> TidemarkResult<()> {
    legacy_schema(&ctx, ADD_CUSTOMER_EMAIL)?;
    let migrator = bootstrapped_migrator(&ctx)?;

    assert!(migrator.applied_migrations(&shop_registry()?)?.is_empty());
    assert!(!ctx.has_table("tidemark_versions")?);
    Ok(())
}

#[test]
fn test_bootstrapping_seeds_version_table_memory() {
    run_test(create_memory_context, bootstrapping_seeds_version_table, cleanup)
}

#[test]
fn test_bootstrapping_seeds_version_table_sqlite() {
    run_test(create_sqlite_context, bootstrapping_seeds_version_table, cleanup)
}

#[test]
fn test_bootstrapping_happens_on_fetch_memory() {
    run_test(create_memory_context, bootstrapping_happens_on_fetch, cleanup)
}

#[test]
fn test_bootstrapping_happens_on_fetch_sqlite() {
    run_test(create_sqlite_context, bootstrapping_happens_on_fetch, cleanup)
}

#[test]
fn test_bootstrapping_ignored_once_table_exists_memory() {
    run_test(create_memory_context, bootstrapping_ignored_once_table_exists, cleanup)
}

#[test]
fn test_bootstrapping_ignored_once_table_exists_sqlite() {
    run_test(create_sqlite_context, bootstrapping_ignored_once_table_exists, cleanup)
}

#[test]
fn test_applied_migrations_never_bootstraps() {
    run_test(create_memory_context, applied_migrations_never_bootstraps, cleanup)
}
