//! Test doubles and fixtures shared by the unit tests.

mod memory_store;
mod mock_analysis;
mod mock_catalog;

pub use memory_store::MemoryStore;
pub use mock_analysis::MockAnalysis;
pub use mock_catalog::MockCatalog;

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use sqlx::types::Json;
use sqlx::PgPool;

use crate::catalog::models::{LotState, Picture};
use crate::catalog::Lot;
use crate::pagination::models::PageRow;

/// A lot with one picture and the given minimum bid.
pub fn lot(id: &str, min_bid: f64) -> Lot {
    Lot {
        id: id.to_string(),
        lead: Some(format!("Lot {id}")),
        pictures: Some(vec![Picture {
            description: None,
            full_size_location: Some(format!("https://cdn.example/{id}/1.jpg")),
        }]),
        lot_state: Some(LotState {
            min_bid: Some(min_bid),
            ..Default::default()
        }),
        ..Default::default()
    }
}

/// A stored page row whose reference data is distinguishable from live catalog data.
pub fn page_row(processed_item_id: i64, external_id: &str) -> PageRow {
    PageRow {
        processed_item_id,
        external_id: external_id.to_string(),
        item_url: format!("https://stored.example/{external_id}"),
        image_urls: Json(vec![format!("https://stored.example/{external_id}.jpg")]),
    }
}

/// Pool for DB-backed tests, or `None` when `TEST_DATABASE_URL` is unset.
pub async fn test_pool() -> Option<PgPool> {
    let url = std::env::var("TEST_DATABASE_URL").ok()?;
    let pool = crate::db::create_pool(&url, 4)
        .await
        .expect("Failed to connect to TEST_DATABASE_URL.");
    crate::db::ensure_schema(&pool)
        .await
        .expect("Failed to apply schema.");
    Some(pool)
}

/// Suffix that keeps rows from separate test runs apart in a shared database.
pub fn unique_suffix() -> String {
    static COUNTER: AtomicU64 = AtomicU64::new(0);
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos())
        .unwrap_or_default();
    format!("{nanos}-{}", COUNTER.fetch_add(1, Ordering::Relaxed))
}
