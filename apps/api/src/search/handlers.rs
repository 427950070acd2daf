use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::catalog::{search_items, CatalogItem};
use crate::errors::AppError;
use crate::pagination::models::PageResponse;
use crate::search::params::SearchForm;
use crate::search::run;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct SubmitQuery {
    /// Also send the accepted items to the analysis service in the background.
    #[serde(default)]
    pub analyze: bool,
}

/// POST /api/v1/searches
pub async fn handle_submit_search(
    State(state): State<AppState>,
    Query(query): Query<SubmitQuery>,
    Json(form): Json<SearchForm>,
) -> Result<Json<PageResponse>, AppError> {
    let catalog_query = form.catalog_query(&state.config.catalog);
    let items = search_items(
        state.catalog.as_ref(),
        &catalog_query,
        state.config.catalog.fetch_concurrency,
    )
    .await
    .map_err(AppError::Catalog)?;
    info!("Fetched {} items from the catalog", items.len());

    let outcome = run::execute(&state.db, items, &form.profile()).await?;

    let page_size = state.config.results_per_page;
    state
        .page_index
        .record_run(outcome.search_id, page_size, &outcome.processed_ids());
    debug!("Page index holds {} page starts", state.page_index.len());

    if query.analyze {
        let accepted: Vec<CatalogItem> = outcome.accepted.iter().map(|a| a.item.clone()).collect();
        spawn_analysis(&state, outcome.search_id, accepted);
    }

    Ok(Json(outcome.first_page(page_size)))
}

/// Fire-and-forget: the search response never waits on analysis.
fn spawn_analysis(state: &AppState, search_id: i64, items: Vec<CatalogItem>) {
    if items.is_empty() {
        return;
    }
    let analysis = state.analysis.clone();
    tokio::spawn(async move {
        match analysis.analyze(&items).await {
            Ok(result) => info!("Analysis for search {search_id} finished: {result}"),
            Err(e) => warn!("Analysis for search {search_id} failed: {e}"),
        }
    });
}

/// GET /api/v1/items/:external_id
pub async fn handle_get_item(
    State(state): State<AppState>,
    Path(external_id): Path<String>,
) -> Result<Json<CatalogItem>, AppError> {
    let lot = state.catalog.fetch_lot(&external_id).await?;
    Ok(Json(CatalogItem::from(lot)))
}
