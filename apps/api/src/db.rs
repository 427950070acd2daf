use anyhow::Result;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

const SCHEMA_SQL: &str = include_str!("../sql/schema.sql");
const SCHEMA_LOCK_ID: i64 = 4_120_771;

/// Creates and returns a PostgreSQL connection pool.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;

    info!("PostgreSQL connection pool established ({max_connections} max connections)");
    Ok(pool)
}

/// Applies the embedded schema. Safe to run on every startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<()> {
    // The advisory lock is transaction-scoped so concurrent instances apply DDL one at a time.
    let mut tx = pool.begin().await?;

    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(SCHEMA_LOCK_ID)
        .execute(&mut *tx)
        .await?;

    for statement in schema_statements(SCHEMA_SQL) {
        sqlx::query(&statement).execute(&mut *tx).await?;
    }

    tx.commit().await?;
    info!("Database schema is up to date");
    Ok(())
}

/// Splits a SQL script into statements. `--` comments are stripped first so their text
/// can never be mistaken for a statement boundary.
fn schema_statements(sql: &str) -> Vec<String> {
    let without_comments: String = sql
        .lines()
        .map(|line| match line.find("--") {
            Some(at) => &line[..at],
            None => line,
        })
        .collect::<Vec<_>>()
        .join("\n");

    without_comments
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
