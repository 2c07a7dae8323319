use tidemark::common::Timestamp;
use tidemark::errors::TidemarkResult;
use tidemark_int_test::fixtures::*;
use tidemark_int_test::test_util::{
    cleanup, create_memory_context, create_sqlite_context, run_test, TestContext,
};

fn migrate_all_creates_schema(ctx: TestContext) -> TidemarkResult<()> {
    let migrator = ctx.migrator()?;
    let report = migrator.migrate_all(&shop_registry()?)?;

    assert!(report.is_completed());
    assert!(report.reverted().is_empty());
    let applied: Vec<&str> = report.applied().iter().map(|m| m.name()).collect();
    assert_eq!(
        applied,
        vec!["CreateCustomers", "AddCustomerEmail", "CreateOrders", "RenameOrderTotal"]
    );

    assert!(ctx.has_table("Customers")?);
    assert!(ctx.has_table("tidemark_versions")?);
    assert_eq!(ctx.column_names("Customers")?, vec!["Id", "Name", "Email"]);
    assert_eq!(ctx.column_names("Orders")?, vec!["Id", "CustomerId", "Amount"]);
    assert_eq!(
        ctx.recorded_versions()?,
        vec![CREATE_CUSTOMERS, ADD_CUSTOMER_EMAIL, CREATE_ORDERS, RENAME_ORDER_TOTAL]
    );
    Ok(())
}

fn migrate_all_is_idempotent(ctx: TestContext) -> TidemarkResult<()> {
    let migrator = ctx.migrator()?;
    let registry = shop_registry()?;
    migrator.migrate_all(&registry)?;

    let batch = migrator.fetch_pending_migrations(&registry)?;
    assert!(batch.is_empty());

    let report = migrator.migrate_all(&registry)?;
    assert_eq!(report.count(), 0);
    assert!(report.is_completed());
    assert_eq!(ctx.recorded_versions()?.len(), 4);
    Ok(())
}

fn new_migrations_are_picked_up(ctx: TestContext) -> TidemarkResult<()> {
    let migrator = ctx.migrator()?;
    migrator.migrate_all(&reversible_registry()?)?;

    let batch = migrator.fetch_pending_migrations(&shop_registry()?)?;
    assert_eq!(batch.count(), 1);
    assert_eq!(batch.count_up(), 1);
    let step = batch.steps().next().map(|s| s.metadata().name().to_string());
    assert_eq!(step.as_deref(), Some("RenameOrderTotal"));

    batch.execute()?;
    assert_eq!(ctx.column_names("Orders")?, vec!["Id", "CustomerId", "Amount"]);
    Ok(())
}

fn migrate_to_stops_at_target(ctx: TestContext) -> TidemarkResult<()> {
    let migrator = ctx.migrator()?;
    let registry = shop_registry()?;

    let report = migrator.migrate_to(&registry, Timestamp::new(ADD_CUSTOMER_EMAIL))?;
    assert_eq!(report.applied().len(), 2);
    assert!(!ctx.has_table("Orders")?);
    assert_eq!(ctx.recorded_versions()?, vec![CREATE_CUSTOMERS, ADD_CUSTOMER_EMAIL]);

    let applied = migrator.applied_migrations(&registry)?;
    assert_eq!(applied.len(), 2);
    assert_eq!(applied[1].timestamp(), Timestamp::new(ADD_CUSTOMER_EMAIL));
    Ok(())
}

fn execute_while_stops_between_steps(ctx: TestContext) -> TidemarkResult<()> {
    let migrator = ctx.migrator()?;
    let batch = migrator.fetch_pending_migrations(&shop_registry()?)?;
    for step in batch.steps() {
        assert_eq!(step.connection_info().connection_string(), ctx.connection_string());
        assert_eq!(step.connection_info().provider_name(), ctx.provider_name());
    }

    let report = batch.execute_while(|step| step.metadata().timestamp().value() < CREATE_ORDERS)?;
    assert!(!report.is_completed());
    assert_eq!(report.applied().len(), 2);
    assert_eq!(ctx.recorded_versions()?, vec![CREATE_CUSTOMERS, ADD_CUSTOMER_EMAIL]);

    let report = migrator.migrate_all(&shop_registry()?)?;
    assert_eq!(report.applied().len(), 2);
    Ok(())
}

#[test]
fn test_migrate_all_memory() {
    run_test(create_memory_context, migrate_all_creates_schema, cleanup)
}

#[test]
fn test_migrate_all_sqlite() {
    run_test(create_sqlite_context, migrate_all_creates_schema, cleanup)
}

#[test]
fn test_migrate_all_is_idempotent_memory() {
    run_test(create_memory_context, migrate_all_is_idempotent, cleanup)
}

#[test]
fn test_migrate_all_is_idempotent_sqlite() {
    run_test(create_sqlite_context, migrate_all_is_idempotent, cleanup)
}

#[test]
fn test_new_migrations_are_picked_up_memory() {
    run_test(create_memory_context, new_migrations_are_picked_up, cleanup)
}

#[test]
fn test_new_migrations_are_picked_up_sqlite() {
    run_test(create_sqlite_context, new_migrations_are_picked_up, cleanup)
}

#[test]
fn test_migrate_to_stops_at_target_memory() {
    run_test(create_memory_context, migrate_to_stops_at_target, cleanup)
}

#[test]
fn test_migrate_to_stops_at_target_sqlite() {
    run_test(create_sqlite_context, migrate_to_stops_at_target, cleanup)
}

#[test]
fn test_execute_while_memory() {
    run_test(create_memory_context, execute_while_stops_between_steps, cleanup)
}

#[test]
fn test_execute_while_sqlite() {
    run_test(create_sqlite_context, execute_while_stops_between_steps, cleanup)
}

#[test]
fn test_empty_source_plans_nothing() {
    run_test(
        create_memory_context,
        |ctx| {
            let batch = ctx
                .migrator()?
                .fetch_pending_migrations(&tidemark::migration::MigrationRegistry::new())?;
            assert!(batch.is_empty());
            assert_eq!(batch.execute()?.count(), 0);
            Ok(())
        },
        cleanup,
    )
}
