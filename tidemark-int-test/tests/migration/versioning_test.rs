use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;

use tidemark::errors::{ErrorKind, TidemarkResult};
use tidemark::migration::MigrationMetadata;
use tidemark::provider::Connection;
use tidemark::versioning::Versioning;
use tidemark_int_test::fixtures::*;
use tidemark_int_test::test_util::{
    cleanup, create_memory_context, create_sqlite_context, run_test, TestContext,
};

/// Keeps the applied set outside the target database.
#[derive(Clone, Default)]
struct ExternalVersions(Arc<RwLock<BTreeSet<i64>>>);

impl ExternalVersions {
    fn applied(&self) -> Vec<i64> {
        self.0.read().iter().copied().collect()
    }
}

impl Versioning for ExternalVersions {
    fn is_contained(&self, metadata: &MigrationMetadata) -> TidemarkResult<bool> {
        Ok(self.0.read().contains(&metadata.timestamp().value()))
    }

    fn record_applied(
        &self,
        metadata: &MigrationMetadata,
        _connection: &mut dyn Connection,
    ) -> TidemarkResult<()> {
        self.0.write().insert(metadata.timestamp().value());
        Ok(())
    }

    fn record_reverted(
        &self,
        metadata: &MigrationMetadata,
        _connection: &mut dyn Connection,
    ) -> TidemarkResult<()> {
        self.0.write().remove(&metadata.timestamp().value());
        Ok(())
    }
}

fn custom_versioning_replaces_version_table(ctx: TestContext) -> TidemarkResult<()> {
    let versions = ExternalVersions::default();
    let migrator = ctx.migrator()?;
    migrator.use_custom_versioning(versions.clone())?;

    migrator.migrate_all(&shop_registry()?)?;
    assert_eq!(
        versions.applied(),
        vec![CREATE_CUSTOMERS, ADD_CUSTOMER_EMAIL, CREATE_ORDERS, RENAME_ORDER_TOTAL]
    );
    assert!(ctx.has_table("Orders")?);
    assert!(!ctx.has_table("tidemark_versions")?);

    assert!(migrator.fetch_pending_migrations(&shop_registry()?)?.is_empty());
    Ok(())
}

fn custom_version_table_name(ctx: TestContext) -> TidemarkResult<()> {
    let migrator = ctx.builder().version_table("schema_history").build()?;
    migrator.migrate_all(&reversible_registry()?)?;

    assert!(ctx.has_table("schema_history")?);
    assert!(!ctx.has_table("tidemark_versions")?);
    assert_eq!(migrator.applied_migrations(&reversible_registry()?)?.len(), 3);
    Ok(())
}

fn versioning_strategies_are_exclusive(ctx: TestContext) -> TidemarkResult<()> {
    let migrator = ctx.migrator()?;
    migrator.use_custom_versioning(ExternalVersions::default())?;

    let err = migrator
        .use_custom_bootstrapping(|_: &MigrationMetadata| true)
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ConfigurationError);

    let migrator = ctx.migrator()?;
    migrator.use_custom_bootstrapping(|_: &MigrationMetadata| true)?;
    let err = migrator
        .use_custom_versioning(ExternalVersions::default())
        .unwrap_err();
    assert_eq!(err.kind(), &ErrorKind::ConfigurationError);

    let err = ctx
        .builder()
        .custom_versioning(ExternalVersions::default())
        .custom_bootstrapping(|_: &MigrationMetadata| true)
        .build()
        .err()
        .expect("builder must reject both strategies");
    assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
    Ok(())
}

#[test]
fn test_custom_versioning_memory() {
    run_test(create_memory_context, custom_versioning_replaces_version_table, cleanup)
}

#[test]
fn test_custom_versioning_sqlite() {
    run_test(create_sqlite_context, custom_versioning_replaces_version_table, cleanup)
}

#[test]
fn test_custom_version_table_memory() {
    run_test(create_memory_context, custom_version_table_name, cleanup)
}

#[test]
fn test_custom_version_table_sqlite() {
    run_test(create_sqlite_context, custom_version_table_name, cleanup)
}

#[test]
fn test_versioning_strategies_are_exclusive() {
    run_test(create_memory_context, versioning_strategies_are_exclusive, cleanup)
}
