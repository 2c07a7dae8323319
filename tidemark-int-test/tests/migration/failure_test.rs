use tidemark::common::{DbType, Direction, Timestamp};
use tidemark::errors::{ErrorKind, TidemarkError, TidemarkResult};
use tidemark::migration::{Migration, MigrationDefinition, MigrationMetadata, MigrationRegistry};
use tidemark::schema::Database;
use tidemark_int_test::fixtures::*;
use tidemark_int_test::test_util::{
    cleanup, create_memory_context, create_sqlite_context, run_test, TestContext,
};

const BROKEN: i64 = 20240102120000;

struct RenameMissingTable;

impl Migration for RenameMissingTable {
    fn up(&self, db: &Database) -> TidemarkResult<()> {
        db.create_table("Invoices")
            .with_primary_key_column("Id", DbType::Int64);
        db.table("NoSuchTable").rename("Whatever");
        Ok(())
    }
}

struct FailingCallback;

impl Migration for FailingCallback {
    fn up(&self, db: &Database) -> TidemarkResult<()> {
        db.create_table("Invoices")
            .with_primary_key_column("Id", DbType::Int64);
        db.execute(|_connection| {
            Err(TidemarkError::new("callback refused", ErrorKind::InvalidOperation))
        });
        Ok(())
    }
}

fn registry_with<M: Migration + 'static>(migration: M) -> TidemarkResult<MigrationRegistry> {
    let registry = MigrationRegistry::new();
    registry.register_reversible(CreateCustomers)?;
    registry.register_reversible(AddCustomerEmail)?;
    registry.register_with(
        MigrationMetadata::new(BROKEN, "Broken"),
        MigrationDefinition::irreversible(migration),
    )?;
    registry.register_reversible(CreateOrdersMigration)?;
    Ok(registry)
}

fn assert_halted_at_broken_step(ctx: &TestContext, err: &TidemarkError) -> TidemarkResult<()> {
    assert_eq!(err.kind(), &ErrorKind::StepExecutionError);
    let failed = err.failed_step().expect("step failures carry the failed step");
    assert_eq!(failed.timestamp, Timestamp::new(BROKEN));
    assert_eq!(failed.name, "Broken");
    assert_eq!(failed.direction, Direction::Up);

    // steps before the failure stay committed, the failed step left nothing behind
    assert_eq!(ctx.recorded_versions()?, vec![CREATE_CUSTOMERS, ADD_CUSTOMER_EMAIL]);
    assert!(ctx.has_table("Customers")?);
    assert!(!ctx.has_table("Invoices")?);
    assert!(!ctx.has_table("Orders")?);
    Ok(())
}

fn failing_statement_halts_batch(ctx: TestContext) -> TidemarkResult<()> {
    let migrator = ctx.migrator()?;
    let err = migrator
        .migrate_all(&registry_with(RenameMissingTable)?)
        .err()
        .expect("renaming a missing table must fail");
    assert_halted_at_broken_step(&ctx, &err)
}

fn failing_callback_halts_batch(ctx: TestContext) -> TidemarkResult<()> {
    let migrator = ctx.migrator()?;
    let err = migrator
        .migrate_all(&registry_with(FailingCallback)?)
        .err()
        .expect("a failing callback must fail the step");
    assert_halted_at_broken_step(&ctx, &err)?;
    assert_eq!(err.cause().map(|c| c.kind()), Some(&ErrorKind::InvalidOperation));
    Ok(())
}

fn rerun_after_fix_resumes(ctx: TestContext) -> TidemarkResult<()> {
    let migrator = ctx.migrator()?;
    assert!(migrator.migrate_all(&registry_with(RenameMissingTable)?).is_err());

    let report = migrator.migrate_all(&reversible_registry()?)?;
    let applied: Vec<&str> = report.applied().iter().map(|m| m.name()).collect();
    assert_eq!(applied, vec!["CreateOrders"]);
    Ok(())
}

#[test]
fn test_failing_statement_memory() {
    run_test(create_memory_context, failing_statement_halts_batch, cleanup)
}

#[test]
fn test_failing_statement_sqlite() {
    run_test(create_sqlite_context, failing_statement_halts_batch, cleanup)
}

#[test]
fn test_failing_callback_memory() {
    run_test(create_memory_context, failing_callback_halts_batch, cleanup)
}

#[test]
fn test_failing_callback_sqlite() {
    run_test(create_sqlite_context, failing_callback_halts_batch, cleanup)
}

#[test]
fn test_rerun_after_fix_memory() {
    run_test(create_memory_context, rerun_after_fix_resumes, cleanup)
}

#[test]
fn test_rerun_after_fix_sqlite() {
    run_test(create_sqlite_context, rerun_after_fix_resumes, cleanup)
}

#[test]
fn test_unsupported_command_fails_step_on_sqlite() {
    struct DropDefault;

    impl Migration for DropDefault {
        fn up(&self, db: &Database) -> TidemarkResult<()> {
            db.table("Customers").column("Name").drop_default_constraint();
            Ok(())
        }
    }

    run_test(
        create_sqlite_context,
        |ctx| {
            let registry = MigrationRegistry::new();
            registry.register_reversible(CreateCustomers)?;
            registry.register_with(
                MigrationMetadata::new(ADD_CUSTOMER_EMAIL, "DropDefault"),
                MigrationDefinition::irreversible(DropDefault),
            )?;

            let err = ctx
                .migrator()?
                .migrate_all(&registry)
                .err()
                .expect("SQLite cannot drop a default constraint");
            assert_eq!(err.kind(), &ErrorKind::StepExecutionError);
            assert_eq!(err.cause().map(|c| c.kind()), Some(&ErrorKind::UnsupportedOperation));
            assert_eq!(ctx.recorded_versions()?, vec![CREATE_CUSTOMERS]);
            Ok(())
        },
        cleanup,
    )
}
