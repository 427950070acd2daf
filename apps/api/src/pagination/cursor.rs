//! Cursor pagination.
//!
//! The client carries the first and last `processed_item_id` of the page it holds.
//! Each request counts what lies strictly beyond the active cursor, shrinks the limit
//! to that count so the last page comes back short, and derives the new cursors from
//! the rows actually returned.

use crate::errors::AppError;
use crate::pagination::models::{page_count, Cursors, Direction, Window};
use crate::pagination::store::ProcessedItemStore;

pub async fn cursor_page<S>(
    store: &mut S,
    search_id: i64,
    cursors: Cursors,
    direction: Direction,
    page_size: i64,
) -> Result<Window, AppError>
where
    S: ProcessedItemStore + ?Sized,
{
    let remaining = match direction {
        Direction::Initial => store.count_after(search_id, None).await?,
        Direction::Next => store.count_after(search_id, cursors.next).await?,
        Direction::Prev => store.count_before(search_id, cursors.prev).await?,
    };

    let rows = if remaining == 0 {
        Vec::new()
    } else {
        let limit = page_size.min(remaining);
        match direction {
            Direction::Initial => store.rows_after(search_id, None, limit).await?,
            Direction::Next => store.rows_after(search_id, cursors.next, limit).await?,
            Direction::Prev => {
                let mut rows = store.rows_before(search_id, cursors.prev, limit).await?;
                rows.reverse();
                rows
            }
        }
    };

    // Totals are re-read on every call; a run's item set is not assumed to be fixed.
    let total_items = store.count_total(search_id).await?;

    Ok(Window {
        search_id,
        cursors: Cursors::spanning(&rows).unwrap_or(cursors),
        rows,
        total_items,
        page_count: page_count(total_items, page_size),
    })
}
