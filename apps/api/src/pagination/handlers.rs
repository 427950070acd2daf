use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::pagination::hydrate::hydrate_rows;
use crate::pagination::models::{Cursors, Direction, PageMode, PageResponse};
use crate::pagination::{select_window, PgProcessedItemStore, ProcessedItemStore};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub fetch_type: Option<String>,
    pub page_num: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRequest {
    pub search_id: i64,
    #[serde(default)]
    pub prev: Option<i64>,
    #[serde(default)]
    pub next: Option<i64>,
    #[serde(default)]
    pub direction: Option<Direction>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemCountResponse {
    pub search_id: i64,
    pub total_items: i64,
}

/// Resolves the query string and body into a single paging mode.
pub fn page_mode(query: &PageQuery, request: &PageRequest) -> Result<PageMode, AppError> {
    match query.fetch_type.as_deref().map(str::trim) {
        None | Some("") | Some("cursor") => Ok(PageMode::Cursor {
            cursors: Cursors {
                prev: request.prev,
                next: request.next,
            },
            direction: request.direction.unwrap_or_default(),
        }),
        Some("page") | Some("number") => {
            let page = query.page_num.ok_or_else(|| {
                AppError::Validation("pageNum is required when fetchType=page".to_string())
            })?;
            Ok(PageMode::Number { page })
        }
        Some(other) => Err(AppError::Validation(format!(
            "Unknown fetchType '{other}'; expected 'cursor' or 'page'"
        ))),
    }
}

/// POST /api/v1/searches/page
pub async fn handle_fetch_page(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
    Json(request): Json<PageRequest>,
) -> Result<Json<PageResponse>, AppError> {
    let mode = page_mode(&query, &request)?;
    let page_size = state.config.results_per_page;

    // The connection goes back to the pool before the catalog round trips start.
    let window = {
        let mut conn = state.db.acquire().await?;
        let mut store = PgProcessedItemStore::new(&mut conn);
        select_window(&mut store, &state.page_index, request.search_id, mode, page_size).await?
    };

    let deadline = tokio::time::sleep(Duration::from_secs(state.config.page_fill_timeout_secs));
    let items = hydrate_rows(
        state.catalog.as_ref(),
        &window.rows,
        state.config.catalog.fetch_concurrency,
        deadline,
    )
    .await?;

    info!(
        "Served {} items for search {} ({:?})",
        items.len(),
        window.search_id,
        mode
    );
    Ok(Json(window.into_response(items)))
}

/// GET /api/v1/searches/:search_id/count
pub async fn handle_item_count(
    State(state): State<AppState>,
    Path(search_id): Path<i64>,
) -> Result<Json<ItemCountResponse>, AppError> {
    let mut conn = state.db.acquire().await?;
    let total_items = PgProcessedItemStore::new(&mut conn)
        .count_total(search_id)
        .await?;
    Ok(Json(ItemCountResponse {
        search_id,
        total_items,
    }))
}
