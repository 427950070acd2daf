//! Pagination over the accepted items of a search run.
//!
//! Two strategies share one store abstraction: cursor paging (stateless, resumable)
//! and numbered pages (optionally accelerated by a `PageIndex`). Both return a
//! `Window` whose rows are then hydrated with live catalog data.

pub mod cursor;
pub mod handlers;
pub mod hydrate;
pub mod index;
pub mod models;
pub mod offset;
pub mod store;

pub use index::PageIndex;
pub use store::{PgProcessedItemStore, ProcessedItemStore};

use crate::errors::AppError;
use crate::pagination::models::{PageMode, Window};

/// Chooses the window for one request, dispatching on the requested mode.
pub async fn select_window<S>(
    store: &mut S,
    index: &PageIndex,
    search_id: i64,
    mode: PageMode,
    page_size: i64,
) -> Result<Window, AppError>
where
    S: ProcessedItemStore + ?Sized,
{
    match mode {
        PageMode::Cursor { cursors, direction } => {
            cursor::cursor_page(store, search_id, cursors, direction, page_size).await
        }
        PageMode::Number { page } => {
            offset::numbered_page(store, Some(index), search_id, page, page_size).await
        }
    }
}
