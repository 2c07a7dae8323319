use tidemark::common::{DbType, Value};
use tidemark::errors::{ErrorKind, TidemarkResult};
use tidemark::migration::{Migration, MigrationDefinition, MigrationMetadata, MigrationRegistry};
use tidemark::migrator::Migrator;
use tidemark::schema::Database;
use tidemark_int_test::fixtures::*;
use tidemark_int_test::test_util::{cleanup, create_sqlite_context, run_test};
use tidemark_sqlite::SQLITE_PROVIDER;

struct SeedCustomers;

impl Migration for SeedCustomers {
    fn up(&self, db: &Database) -> TidemarkResult<()> {
        assert_eq!(db.context().provider_name(), SQLITE_PROVIDER);
        db.execute_sql("INSERT INTO \"Customers\" (\"Id\", \"Name\") VALUES (1, 'Ada'), (2, 'Grace')");
        Ok(())
    }
}

#[test]
fn test_data_survives_schema_changes() {
    run_test(
        create_sqlite_context,
        |ctx| {
            let registry = MigrationRegistry::new();
            registry.register_reversible(CreateCustomers)?;
            registry.register_with(
                MigrationMetadata::new(20240101120000, "SeedCustomers"),
                MigrationDefinition::irreversible(SeedCustomers),
            )?;
            registry.register_reversible(AddCustomerEmail)?;

            ctx.migrator()?.migrate_all(&registry)?;
            let rows = ctx.query("SELECT \"Id\", \"Name\", \"Email\" FROM \"Customers\" ORDER BY \"Id\"")?;
            assert_eq!(
                rows,
                vec![
                    vec![Value::Integer(1), Value::from("Ada"), Value::Null],
                    vec![Value::Integer(2), Value::from("Grace"), Value::Null],
                ]
            );
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_identity_column_autoincrements() {
    run_test(
        create_sqlite_context,
        |ctx| {
            ctx.migrator()?.migrate_all(&reversible_registry()?)?;
            ctx.execute("INSERT INTO \"Orders\" (\"CustomerId\", \"Total\") VALUES (1, 9.5)")?;
            ctx.execute("INSERT INTO \"Orders\" (\"CustomerId\", \"Total\") VALUES (1, 12.0)")?;

            let rows = ctx.query("SELECT \"Id\" FROM \"Orders\" ORDER BY \"Id\"")?;
            assert_eq!(rows, vec![vec![Value::Integer(1)], vec![Value::Integer(2)]]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_state_persists_across_migrators() {
    run_test(
        create_sqlite_context,
        |ctx| {
            ctx.migrator()?.migrate_to(
                &shop_registry()?,
                tidemark::common::Timestamp::new(ADD_CUSTOMER_EMAIL),
            )?;

            let migrator = Migrator::builder()
                .register_provider(tidemark_sqlite::SqliteProvider::new())
                .connection(ctx.connection_string(), SQLITE_PROVIDER)
                .build()?;
            let applied = migrator.applied_migrations(&shop_registry()?)?;
            let names: Vec<&str> = applied.iter().map(|m| m.name()).collect();
            assert_eq!(names, vec!["CreateCustomers", "AddCustomerEmail"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_not_null_column_with_default() {
    struct AddActive;

    impl Migration for AddActive {
        fn up(&self, db: &Database) -> TidemarkResult<()> {
            db.table("Customers")
                .add_column("Active", DbType::Boolean)
                .having_default(true);
            Ok(())
        }
    }

    run_test(
        create_sqlite_context,
        |ctx| {
            let registry = MigrationRegistry::new();
            registry.register_reversible(CreateCustomers)?;
            registry.register_with(
                MigrationMetadata::new(20240101120000, "SeedCustomers"),
                MigrationDefinition::irreversible(SeedCustomers),
            )?;
            registry.register_with(
                MigrationMetadata::new(ADD_CUSTOMER_EMAIL, "AddActive"),
                MigrationDefinition::irreversible(AddActive),
            )?;

            ctx.migrator()?.migrate_all(&registry)?;
            let rows = ctx.query("SELECT \"Active\" FROM \"Customers\"")?;
            assert_eq!(rows, vec![vec![Value::Integer(1)], vec![Value::Integer(1)]]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_unregistered_provider_is_rejected() {
    let err = Migrator::new("shop.db", SQLITE_PROVIDER)
        .err()
        .expect("sqlite is not registered by default");
    assert_eq!(err.kind(), &ErrorKind::ConfigurationError);
}
