use std::time::Instant;

use tidemark::common::Timestamp;
use tidemark::errors::TidemarkResult;
use tidemark_int_test::fixtures::{reversible_registry, shop_registry, CREATE_CUSTOMERS};
use tidemark_int_test::test_util::{cleanup, create_sqlite_context};

fn main() -> TidemarkResult<()> {
    colog::init();
    println!("Starting migration round trip...");
    let ctx = create_sqlite_context()?;
    let migrator = ctx.migrator()?;
    let rounds = 100;

    let start = Instant::now();
    for _ in 0..rounds {
        let registry = reversible_registry()?;
        migrator.migrate_all(&registry)?;
        migrator.migrate_to(&registry, Timestamp::new(CREATE_CUSTOMERS))?;
    }
    println!("Ran {} up/down rounds in {:?}", rounds, start.elapsed());

    let start = Instant::now();
    let report = migrator.migrate_all(&shop_registry()?)?;
    println!(
        "Applied {} migration(s) in {:?}, tables: {:?}",
        report.applied().len(),
        start.elapsed(),
        ctx.table_names()?
    );

    cleanup(ctx)
}
