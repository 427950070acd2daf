//! Page-number pagination.

use tracing::debug;

use crate::errors::AppError;
use crate::pagination::index::{PageIndex, PageKey};
use crate::pagination::models::{page_count, Cursors, Window};
use crate::pagination::store::ProcessedItemStore;

/// Returns page `page` (1-indexed) of a search run.
///
/// With an index hit the window is read as a range starting at the recorded id;
/// otherwise it is an offset scan, and the start id it finds is recorded for next time.
pub async fn numbered_page<S>(
    store: &mut S,
    index: Option<&PageIndex>,
    search_id: i64,
    page: i64,
    page_size: i64,
) -> Result<Window, AppError>
where
    S: ProcessedItemStore + ?Sized,
{
    if page < 1 {
        return Err(AppError::Validation(format!(
            "Page numbers start at 1, got {page}"
        )));
    }

    let key = PageKey {
        search_id,
        page_size,
        page,
    };

    let rows = match index.and_then(|idx| idx.start_id(key)) {
        Some(start_id) => {
            debug!("Page index hit for search {search_id} page {page}");
            store.rows_from(search_id, start_id, page_size).await?
        }
        None => {
            let offset = (page - 1).saturating_mul(page_size);
            let rows = store.rows_at_offset(search_id, offset, page_size).await?;
            if let (Some(idx), Some(first)) = (index, rows.first()) {
                idx.record(key, first.processed_item_id);
            }
            rows
        }
    };

    let total_items = store.count_total(search_id).await?;

    Ok(Window {
        search_id,
        cursors: Cursors::spanning(&rows).unwrap_or_default(),
        rows,
        total_items,
        page_count: page_count(total_items, page_size),
    })
}
