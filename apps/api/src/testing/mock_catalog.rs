use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::catalog::{CatalogClient, CatalogError, CatalogQuery, Lot};

/// In-memory catalog.
///
/// Search results come back without pictures, like the real bulk search; the full lot
/// (pictures included) is only available through `fetch_lot`.
#[derive(Debug, Default)]
pub struct MockCatalog {
    lots: RwLock<HashMap<String, Lot>>,
    search_order: RwLock<Vec<String>>,
    failing: RwLock<HashSet<String>>,
    delay: RwLock<Option<Duration>>,
    fetches: RwLock<usize>,
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the bulk search results and registers each lot for lookup.
    pub async fn set_search_results(&self, lots: Vec<Lot>) {
        let mut order = self.search_order.write().await;
        order.clear();
        let mut stored = self.lots.write().await;
        for lot in lots {
            order.push(lot.id.clone());
            stored.insert(lot.id.clone(), lot);
        }
    }

    /// Makes a lot available to `fetch_lot` without adding it to search results.
    pub async fn add_lot(&self, lot: Lot) {
        self.lots.write().await.insert(lot.id.clone(), lot);
    }

    /// Every lookup of `external_id` fails with a 500.
    pub async fn fail_lot(&self, external_id: &str) {
        self.failing.write().await.insert(external_id.to_string());
    }

    /// Each lookup sleeps this long before answering.
    pub async fn set_delay(&self, delay: Duration) {
        *self.delay.write().await = Some(delay);
    }

    pub async fn fetch_count(&self) -> usize {
        *self.fetches.read().await
    }
}

#[async_trait]
impl CatalogClient for MockCatalog {
    async fn search_lots(&self, _query: &CatalogQuery) -> Result<Vec<Lot>, CatalogError> {
        let order = self.search_order.read().await;
        let lots = self.lots.read().await;
        Ok(order
            .iter()
            .filter_map(|id| lots.get(id))
            .map(|lot| Lot {
                pictures: None,
                ..lot.clone()
            })
            .collect())
    }

    async fn fetch_lot(&self, external_id: &str) -> Result<Lot, CatalogError> {
        *self.fetches.write().await += 1;

        let delay = *self.delay.read().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.read().await.contains(external_id) {
            return Err(CatalogError::Api {
                status: 500,
                message: format!("lot {external_id} unavailable"),
            });
        }

        self.lots
            .read()
            .await
            .get(external_id)
            .cloned()
            .ok_or_else(|| CatalogError::NotFound(external_id.to_string()))
    }
}
