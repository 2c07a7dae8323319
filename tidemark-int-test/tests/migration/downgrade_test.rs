use tidemark::common::{Direction, Timestamp};
use tidemark::errors::{ErrorKind, TidemarkResult};
use tidemark_int_test::fixtures::*;
use tidemark_int_test::test_util::{
    cleanup, create_memory_context, create_sqlite_context, run_test, TestContext,
};

fn round_trip(ctx: TestContext) -> TidemarkResult<()> {
    let migrator = ctx.migrator()?;
    let registry = reversible_registry()?;
    migrator.migrate_all(&registry)?;

    let report = migrator.migrate_to(&registry, Timestamp::new(CREATE_CUSTOMERS))?;
    let reverted: Vec<i64> = report.reverted().iter().map(|m| m.timestamp().value()).collect();
    assert_eq!(reverted, vec![CREATE_ORDERS, ADD_CUSTOMER_EMAIL]);
    assert!(report.applied().is_empty());

    assert!(!ctx.has_table("Orders")?);
    assert_eq!(ctx.column_names("Customers")?, vec!["Id", "Name"]);
    assert_eq!(ctx.recorded_versions()?, vec![CREATE_CUSTOMERS]);

    let report = migrator.migrate_all(&registry)?;
    assert_eq!(report.applied().len(), 2);
    assert_eq!(ctx.column_names("Customers")?, vec!["Id", "Name", "Email"]);
    assert_eq!(
        ctx.recorded_versions()?,
        vec![CREATE_CUSTOMERS, ADD_CUSTOMER_EMAIL, CREATE_ORDERS]
    );
    Ok(())
}

fn revert_everything(ctx: TestContext) -> TidemarkResult<()> {
    let migrator = ctx.migrator()?;
    let registry = reversible_registry()?;
    migrator.migrate_all(&registry)?;

    let report = migrator.migrate_to(&registry, Timestamp::new(0))?;
    assert_eq!(report.reverted().len(), 3);
    assert_eq!(ctx.table_names()?, vec!["tidemark_versions"]);
    assert!(ctx.recorded_versions()?.is_empty());
    Ok(())
}

fn irreversible_downgrade_is_refused(ctx: TestContext) -> TidemarkResult<()> {
    let migrator = ctx.migrator()?;
    let registry = shop_registry()?;
    migrator.migrate_all(&registry)?;

    let err = migrator
        .fetch_migrations_to(&registry, Timestamp::new(ADD_CUSTOMER_EMAIL))
        .err()
        .expect("downgrade across an apply-only migration must be refused");
    assert_eq!(err.kind(), &ErrorKind::IrreversibleMigration);

    assert!(ctx.has_table("Orders")?);
    assert_eq!(ctx.column_names("Orders")?, vec!["Id", "CustomerId", "Amount"]);
    assert_eq!(ctx.recorded_versions()?.len(), 4);
    Ok(())
}

fn downgrade_above_irreversible_is_allowed(ctx: TestContext) -> TidemarkResult<()> {
    let migrator = ctx.migrator()?;
    let registry = shop_registry()?;
    migrator.migrate_to(&registry, Timestamp::new(ADD_CUSTOMER_EMAIL))?;

    let batch = migrator.fetch_migrations_to(&registry, Timestamp::new(CREATE_CUSTOMERS))?;
    assert_eq!(batch.count_down(), 1);
    assert_eq!(batch.count_up(), 0);
    let step = batch.steps().next().map(|s| (s.metadata().name().to_string(), s.direction()));
    assert_eq!(step, Some(("AddCustomerEmail".to_string(), Direction::Down)));

    batch.execute()?;
    assert_eq!(ctx.recorded_versions()?, vec![CREATE_CUSTOMERS]);
    Ok(())
}

#[test]
fn test_round_trip_memory() {
    run_test(create_memory_context, round_trip, cleanup)
}

#[test]
fn test_round_trip_sqlite() {
    run_test(create_sqlite_context, round_trip, cleanup)
}

#[test]
fn test_revert_everything_memory() {
    run_test(create_memory_context, revert_everything, cleanup)
}

#[test]
fn test_revert_everything_sqlite() {
    run_test(create_sqlite_context, revert_everything, cleanup)
}

#[test]
fn test_irreversible_downgrade_is_refused_memory() {
    run_test(create_memory_context, irreversible_downgrade_is_refused, cleanup)
}

#[test]
fn test_irreversible_downgrade_is_refused_sqlite() {
    run_test(create_sqlite_context, irreversible_downgrade_is_refused, cleanup)
}

#[test]
fn test_downgrade_above_irreversible_memory() {
    run_test(create_memory_context, downgrade_above_irreversible_is_allowed, cleanup)
}

#[test]
fn test_downgrade_above_irreversible_sqlite() {
    run_test(create_sqlite_context, downgrade_above_irreversible_is_allowed, cleanup)
}
