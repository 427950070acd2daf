use std::future::Future;

use futures::{StreamExt, TryStreamExt};
use tracing::warn;

use crate::catalog::{CatalogClient, CatalogError, CatalogItem};
use crate::errors::AppError;
use crate::pagination::models::PageRow;

/// Re-fetches live catalog data for each row and overlays the stored image list and
/// item URL. Output order matches `rows`.
///
/// At most `concurrency` lookups are in flight. If `cancel` resolves first the whole
/// page fails with `AppError::Cancelled`; a page is never returned partially filled.
pub async fn hydrate_rows<F>(
    catalog: &dyn CatalogClient,
    rows: &[PageRow],
    concurrency: usize,
    cancel: F,
) -> Result<Vec<CatalogItem>, AppError>
where
    F: Future<Output = ()> + Send,
{
    // Rows are owned: a stream over `&PageRow` is not `Send` inside the handler future.
    let fetch_all = futures::stream::iter(rows.to_vec())
        .map(|row| async move {
            let lot = catalog.fetch_lot(&row.external_id).await?;
            let mut item = CatalogItem::from(lot);
            item.image_urls = row.image_urls.0;
            item.item_url = row.item_url;
            Ok::<_, CatalogError>(item)
        })
        .buffered(concurrency.max(1))
        .try_collect::<Vec<_>>();

    tokio::select! {
        biased;
        result = fetch_all => result.map_err(AppError::Catalog),
        () = cancel => {
            warn!("Page fill cancelled with {} rows requested", rows.len());
            Err(AppError::Cancelled)
        }
    }
}
