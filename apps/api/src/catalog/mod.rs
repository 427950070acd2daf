//! Auction catalog collaborator.
//!
//! The service only needs two operations from the catalog: a bulk lot search and a
//! single-lot lookup. Both sit behind `CatalogClient` so the search and pagination
//! paths can run against a mock in tests.

mod graphql;
pub mod models;
mod queries;

pub use graphql::GraphQlCatalogClient;
pub use models::{CatalogItem, CatalogQuery, Lot};

use async_trait::async_trait;
use futures::{StreamExt, TryStreamExt};
use thiserror::Error;
use tracing::debug;

/// Any failure talking to the catalog. Callers treat every variant as "fetch failed".
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Catalog returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("GraphQL error: {0}")]
    GraphQl(String),

    #[error("Failed to parse catalog response: {0}")]
    Parse(String),

    #[error("Lot not found: {0}")]
    NotFound(String),
}

#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Runs a bulk search and returns lots in catalog order.
    async fn search_lots(&self, query: &CatalogQuery) -> Result<Vec<Lot>, CatalogError>;

    /// Fetches one lot, including its full picture list.
    async fn fetch_lot(&self, external_id: &str) -> Result<Lot, CatalogError>;
}

/// Runs a search and completes each lot's image list with a per-lot lookup.
/// Lookups run at most `concurrency` at a time; output order matches the search.
pub async fn search_items(
    catalog: &dyn CatalogClient,
    query: &CatalogQuery,
    concurrency: usize,
) -> Result<Vec<CatalogItem>, CatalogError> {
    let lots = catalog.search_lots(query).await?;
    debug!("Catalog search returned {} lots", lots.len());

    futures::stream::iter(lots)
        .map(|mut lot| async move {
            let details = catalog.fetch_lot(&lot.id).await?;
            lot.pictures = details.pictures;
            Ok::<_, CatalogError>(CatalogItem::from(lot))
        })
        .buffered(concurrency.max(1))
        .try_collect()
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{lot, MockCatalog};

    fn query() -> CatalogQuery {
        CatalogQuery {
            page_number: 1,
            page_length: 50,
            category: None,
            search_text: None,
            zip: None,
            miles: None,
            shipping_offered: false,
            status: None,
            sort_order: None,
            filter: None,
            count_as_view: true,
        }
    }

    #[tokio::test]
    async fn test_search_items_attaches_pictures_in_order() {
        let catalog = MockCatalog::new();
        catalog.set_search_results(vec![lot("2", 5.0), lot("1", 9.0)]).await;

        let items = search_items(&catalog, &query(), 4).await.unwrap();

        let ids: Vec<_> = items.iter().map(|i| i.external_id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1"]);
        assert_eq!(items[0].image_urls, vec!["https://cdn.example/2/1.jpg"]);
    }

    #[tokio::test]
    async fn test_search_items_fails_when_any_lookup_fails() {
        let catalog = MockCatalog::new();
        catalog.set_search_results(vec![lot("1", 5.0), lot("2", 5.0)]).await;
        catalog.fail_lot("2").await;

        let err = search_items(&catalog, &query(), 1).await.unwrap_err();
        assert!(matches!(err, CatalogError::Api { .. }));
    }
}
