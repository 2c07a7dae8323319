use tidemark::common::{DbType, Value, MEMORY_PROVIDER};
use tidemark::errors::{ErrorKind, TidemarkResult};
use tidemark::memory::{MemoryDatabase, MemoryProvider};
use tidemark::migration::{Migration, MigrationDefinition, MigrationMetadata, MigrationRegistry};
use tidemark::provider::{Connection, Provider};
use tidemark::schema::Database;
use tidemark_int_test::fixtures::*;
use tidemark_int_test::test_util::{cleanup, create_memory_context, run_test};

const ADD_SCORE: i64 = 20240105000000;

struct AddScore {
    temporary_default: Option<i64>,
}

impl Migration for AddScore {
    fn up(&self, db: &Database) -> TidemarkResult<()> {
        let column = db.table("Customers").add_column("Score", DbType::Int32);
        if let Some(value) = self.temporary_default {
            column.with_temporary_default(value);
        }
        Ok(())
    }
}

fn registry_with_score(temporary_default: Option<i64>) -> TidemarkResult<MigrationRegistry> {
    let registry = MigrationRegistry::new();
    registry.register_reversible(CreateCustomers)?;
    registry.register_with(
        MigrationMetadata::new(ADD_SCORE, "AddScore"),
        MigrationDefinition::irreversible(AddScore { temporary_default }),
    )?;
    Ok(registry)
}

#[test]
fn test_temporary_default_fills_existing_rows() {
    run_test(
        create_memory_context,
        |ctx| {
            let migrator = ctx.migrator()?;
            migrator.migrate_all(&reversible_registry()?)?;
            let database = MemoryDatabase::open(ctx.connection_string());
            database.insert_row("Customers", &[("Id", Value::Integer(1))])?;

            migrator.migrate_all(&registry_with_score(Some(7))?)?;
            assert_eq!(database.values("Customers", "Score")?, vec![Value::Integer(7)]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_not_null_column_needs_default_on_rows() {
    run_test(
        create_memory_context,
        |ctx| {
            let migrator = ctx.migrator()?;
            migrator.migrate_all(&reversible_registry()?)?;
            MemoryDatabase::open(ctx.connection_string())
                .insert_row("Customers", &[("Id", Value::Integer(1))])?;

            let err = migrator
                .migrate_all(&registry_with_score(None)?)
                .err()
                .expect("a NOT NULL column needs a default on a non-empty table");
            assert_eq!(err.kind(), &ErrorKind::StepExecutionError);
            assert_eq!(err.cause().map(|c| c.kind()), Some(&ErrorKind::ProviderError));
            assert_eq!(ctx.column_names("Customers")?, vec!["Id", "Name", "Email"]);
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_callbacks_see_context_and_connection() {
    struct SeedCustomers;

    impl Migration for SeedCustomers {
        fn up(&self, db: &Database) -> TidemarkResult<()> {
            assert_eq!(db.context().provider_name(), MEMORY_PROVIDER);
            db.execute(|connection| {
                let provider = MemoryProvider::new();
                for id in [1, 2, 3] {
                    let statement = provider.insert_value("Customers", "Id", &Value::Integer(id))?;
                    connection.execute(&statement)?;
                }
                Ok(())
            });
            Ok(())
        }
    }

    run_test(
        create_memory_context,
        |ctx| {
            let registry = MigrationRegistry::new();
            registry.register_reversible(CreateCustomers)?;
            registry.register_with(
                MigrationMetadata::new(ADD_CUSTOMER_EMAIL, "SeedCustomers"),
                MigrationDefinition::irreversible(SeedCustomers),
            )?;

            ctx.migrator()?.migrate_all(&registry)?;
            let database = MemoryDatabase::open(ctx.connection_string());
            assert_eq!(database.row_count("Customers"), Some(3));
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_raw_sql_is_rejected_by_memory_backend() {
    struct RawSql;

    impl Migration for RawSql {
        fn up(&self, db: &Database) -> TidemarkResult<()> {
            db.execute_sql("CREATE INDEX ix_name ON Customers (Name)");
            Ok(())
        }
    }

    run_test(
        create_memory_context,
        |ctx| {
            let registry = MigrationRegistry::new();
            registry.register_with(
                MigrationMetadata::new(CREATE_CUSTOMERS, "RawSql"),
                MigrationDefinition::irreversible(RawSql),
            )?;

            let err = ctx
                .migrator()?
                .migrate_all(&registry)
                .err()
                .expect("the memory backend cannot run SQL");
            assert_eq!(err.kind(), &ErrorKind::StepExecutionError);
            assert_eq!(err.cause().map(|c| c.kind()), Some(&ErrorKind::UnsupportedOperation));
            assert!(ctx.recorded_versions()?.is_empty());
            Ok(())
        },
        cleanup,
    )
}

#[test]
fn test_databases_are_isolated_by_name() {
    run_test(
        create_memory_context,
        |ctx| {
            ctx.migrator()?.migrate_all(&shop_registry()?)?;

            let other = create_memory_context()?;
            assert!(other.table_names()?.is_empty());
            assert_eq!(other.migrator()?.fetch_pending_migrations(&shop_registry()?)?.count(), 4);
            cleanup(other)
        },
        cleanup,
    )
}

#[test]
fn test_memory_provider_is_registered_by_default() {
    let migrator = tidemark::migrator::Migrator::new("default-registration", MEMORY_PROVIDER);
    assert!(migrator.is_ok());
    assert_eq!(MemoryProvider::new().invariant_name(), MEMORY_PROVIDER);
    MemoryDatabase::remove("default-registration");
}
