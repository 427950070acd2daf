use std::str::FromStr;

use anyhow::{Context, Result};

use crate::pagination::index::DEFAULT_CAPACITY;

const DEFAULT_CATALOG_URL: &str = "https://hibid.com/graphql";
const DEFAULT_ANALYSIS_URL: &str = "http://localhost:8000/analyze";

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or a numeric one does not parse.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_connection_limit: u32,
    pub port: u16,
    pub rust_log: String,
    pub catalog: CatalogConfig,
    pub results_per_page: i64,
    /// Upper bound on how long a page fill may spend re-fetching items.
    pub page_fill_timeout_secs: u64,
    /// Most page starts kept in the in-process page index; 0 disables it.
    pub page_index_capacity: usize,
    pub analysis_service_url: String,
}

/// Settings for the auction catalog GraphQL endpoint.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    pub graphql_url: String,
    pub timeout_secs: u64,
    /// Max in-flight single-lot requests when hydrating a batch.
    pub fetch_concurrency: usize,
    pub lot_status: String,
    pub sort_order: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let results_per_page: i64 = parse_env("RESULTS_PER_PAGE", 13)?;
        if results_per_page < 1 {
            anyhow::bail!("RESULTS_PER_PAGE must be at least 1");
        }

        Ok(Config {
            database_url: require_env("DATABASE_URL")?,
            db_connection_limit: parse_env("DB_CONNECTION_LIMIT", 10)?,
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            catalog: CatalogConfig {
                graphql_url: std::env::var("CATALOG_GRAPHQL_URL")
                    .unwrap_or_else(|_| DEFAULT_CATALOG_URL.to_string()),
                timeout_secs: parse_env("CATALOG_TIMEOUT_SECS", 30)?,
                fetch_concurrency: parse_env::<usize>("CATALOG_FETCH_CONCURRENCY", 4)?.max(1),
                lot_status: std::env::var("CATALOG_LOT_STATUS")
                    .unwrap_or_else(|_| "OPEN".to_string()),
                sort_order: std::env::var("CATALOG_SORT_ORDER")
                    .unwrap_or_else(|_| "NO_ORDER".to_string()),
            },
            results_per_page,
            page_fill_timeout_secs: parse_env("PAGE_FILL_TIMEOUT_SECS", 60)?,
            page_index_capacity: parse_env("PAGE_INDEX_CAPACITY", DEFAULT_CAPACITY)?,
            analysis_service_url: std::env::var("ANALYSIS_SERVICE_URL")
                .unwrap_or_else(|_| DEFAULT_ANALYSIS_URL.to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_falls_back_to_default() {
        let value: u64 = parse_env("ATLAS_TEST_UNSET_VARIABLE", 42).unwrap();
        assert_eq!(value, 42);
    }
}
