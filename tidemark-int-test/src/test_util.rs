use std::backtrace::Backtrace;
use std::sync::Arc;
use std::time::{Duration, Instant};
use std::thread;

use tempfile::TempDir;
use tidemark::common::{Value, DEFAULT_VERSION_TABLE, MEMORY_PROVIDER, VERSION_COLUMN};
use tidemark::errors::{ErrorKind, TidemarkError, TidemarkResult};
use tidemark::memory::{MemoryDatabase, MemoryProvider};
use tidemark::migrator::Migrator;
use tidemark::migrator_builder::MigratorBuilder;
use tidemark::provider::{Connection, Provider};
use tidemark_sqlite::{SqliteProvider, SQLITE_PROVIDER};

/// Runs a test with retry logic and error handling.
///
/// `before` creates a fresh target database for every attempt, so a retried
/// test never sees the state a failed attempt left behind.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> TidemarkResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> TidemarkResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> TidemarkResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 2;
    let mut last_error: Option<String> = None;
    let mut last_backtrace: Option<String> = None;

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| {
            let backtrace = Backtrace::capture();
            match before() {
                Ok(ctx) => match test(ctx.clone()) {
                    Ok(_) => after(ctx)
                        .map_err(|e| (format!("After run failed: {:?}", e), backtrace.to_string())),
                    Err(e) => {
                        let _ = after(ctx);
                        Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                    }
                },
                Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
            }
        });

        let elapsed = start_time.elapsed();

        match result {
            Ok(Ok(_)) => return,
            Ok(Err((e, bt))) => {
                last_error = Some(e);
                last_backtrace = Some(bt);
            }
            Err(panic_err) => {
                let err_msg = if let Some(s) = panic_err.downcast_ref::<&str>() {
                    s.to_string()
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    s.clone()
                } else {
                    "Unknown panic".to_string()
                };
                last_error = Some(format!("Panic: {}", err_msg));
                last_backtrace = Some(Backtrace::capture().to_string());
            }
        }

        if attempt < MAX_RETRIES {
            eprintln!(
                "\n========== Test Attempt {}/{} Failed (took {:?}) ==========",
                attempt, MAX_RETRIES, elapsed
            );
            eprintln!("{}", last_error.as_deref().unwrap_or("Unknown"));
            eprintln!("Retrying in {}ms...\n", 50 * attempt);
            thread::sleep(Duration::from_millis(50 * attempt as u64));
        }
    }

    eprintln!("\n==================== TEST FAILED ====================");
    eprintln!("Failed after {} attempts", MAX_RETRIES);
    eprintln!("Last error: {}", last_error.as_deref().unwrap_or("Unknown"));
    if let Some(bt) = &last_backtrace {
        if !bt.is_empty() && !bt.contains("disabled") {
            eprintln!("\nBacktrace:\n{}", bt);
        }
    }
    eprintln!("=====================================================\n");

    panic!(
        "Test failed after {} attempts. Last error: {}",
        MAX_RETRIES,
        last_error.unwrap_or_default()
    );
}

/// Target database of one test run.
#[derive(Clone)]
pub struct TestContext {
    provider_name: String,
    connection_string: String,
    // keeps the SQLite file alive for the duration of the test
    _dir: Option<Arc<TempDir>>,
}

impl TestContext {
    pub fn provider_name(&self) -> &str {
        &self.provider_name
    }

    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    pub fn is_memory(&self) -> bool {
        self.provider_name == MEMORY_PROVIDER
    }

    /// A builder pointed at this database, with the SQLite provider registered.
    pub fn builder(&self) -> MigratorBuilder {
        Migrator::builder()
            .register_provider(SqliteProvider::new())
            .connection(&self.connection_string, &self.provider_name)
    }

    pub fn migrator(&self) -> TidemarkResult<Migrator> {
        self.builder().build()
    }

    fn provider(&self) -> Box<dyn Provider> {
        if self.is_memory() {
            Box::new(MemoryProvider::new())
        } else {
            Box::new(SqliteProvider::new())
        }
    }

    fn connect(&self) -> TidemarkResult<Box<dyn Connection>> {
        self.provider().connect(&self.connection_string)
    }

    /// User tables of the database, including the version table, sorted.
    pub fn table_names(&self) -> TidemarkResult<Vec<String>> {
        if self.is_memory() {
            return Ok(MemoryDatabase::open(&self.connection_string).table_names());
        }

        let rows = self.connect()?.query(
            "SELECT name FROM sqlite_master WHERE type = 'table' \
             AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )?;
        Ok(texts(rows))
    }

    pub fn has_table(&self, table: &str) -> TidemarkResult<bool> {
        Ok(self.table_names()?.iter().any(|name| name == table))
    }

    /// Columns of `table` in definition order.
    pub fn column_names(&self, table: &str) -> TidemarkResult<Vec<String>> {
        if self.is_memory() {
            return MemoryDatabase::open(&self.connection_string)
                .columns(table)
                .ok_or_else(|| {
                    TidemarkError::new(&format!("No such table {}", table), ErrorKind::ProviderError)
                });
        }

        let rows = self.connect()?.query(&format!(
            "SELECT name FROM pragma_table_info('{}') ORDER BY cid",
            table.replace('\'', "''")
        ))?;
        Ok(texts(rows))
    }

    /// Timestamps recorded in the default version table, ascending.
    pub fn recorded_versions(&self) -> TidemarkResult<Vec<i64>> {
        let provider = self.provider();
        let mut connection = self.connect()?;
        if connection
            .query(&provider.table_exists(DEFAULT_VERSION_TABLE)?)?
            .is_empty()
        {
            return Ok(Vec::new());
        }

        let rows = connection.query(&provider.select_values(DEFAULT_VERSION_TABLE, VERSION_COLUMN)?)?;
        let mut versions: Vec<i64> = rows
            .iter()
            .filter_map(|row| row.first().and_then(Value::as_integer))
            .collect();
        versions.sort();
        Ok(versions)
    }

    /// Runs a statement directly against the database.
    pub fn execute(&self, statement: &str) -> TidemarkResult<u64> {
        self.connect()?.execute(statement)
    }

    pub fn query(&self, statement: &str) -> TidemarkResult<Vec<Vec<Value>>> {
        self.connect()?.query(statement)
    }
}

fn texts(rows: Vec<Vec<Value>>) -> Vec<String> {
    rows.into_iter()
        .filter_map(|row| row.into_iter().next())
        .filter_map(|value| value.as_text().map(str::to_string))
        .collect()
}

pub fn random_name() -> String {
    format!("tidemark-{}", uuid::Uuid::new_v4())
}

pub fn create_memory_context() -> TidemarkResult<TestContext> {
    Ok(TestContext {
        provider_name: MEMORY_PROVIDER.to_string(),
        connection_string: random_name(),
        _dir: None,
    })
}

pub fn create_sqlite_context() -> TidemarkResult<TestContext> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join(format!("{}.db", random_name()));
    let connection_string = path.to_str().map(str::to_string).ok_or_else(|| {
        TidemarkError::new("Temporary path is not valid UTF-8", ErrorKind::IOError)
    })?;

    Ok(TestContext {
        provider_name: SQLITE_PROVIDER.to_string(),
        connection_string,
        _dir: Some(Arc::new(dir)),
    })
}

pub fn cleanup(ctx: TestContext) -> TidemarkResult<()> {
    if ctx.is_memory() {
        MemoryDatabase::remove(ctx.connection_string());
    }
    Ok(())
}
