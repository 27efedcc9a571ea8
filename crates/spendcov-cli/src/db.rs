//! Database management command handlers for the CLI.

use std::path::Path;

/// Round-trip a trivial query to confirm the warehouse is reachable.
///
/// # Errors
///
/// Returns an error if the query fails.
pub(crate) async fn run_db_ping(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    spendcov_db::ping(pool).await?;
    println!("database connection ok");
    Ok(())
}

/// Apply all pending migrations.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub(crate) async fn run_db_migrate(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let applied = spendcov_db::run_migrations(pool).await?;
    println!("applied {applied} migration(s)");
    Ok(())
}

/// Validate a YAML fixture and upsert it into the warehouse tables.
///
/// # Errors
///
/// Returns an error if the fixture cannot be read or fails validation, or if
/// any insert fails (in which case nothing is written).
pub(crate) async fn run_db_seed(pool: &sqlx::PgPool, path: &Path) -> anyhow::Result<()> {
    let fixture = spendcov_core::load_fixture(path)?;
    let summary = spendcov_db::seed_fixture(pool, &fixture).await?;
    println!(
        "seeded {} places, {} pattern rows, {} spend rows from {}",
        summary.places,
        summary.patterns,
        summary.spend,
        path.display()
    );
    Ok(())
}
