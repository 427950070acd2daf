pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::pagination::handlers as pagination;
use crate::search::handlers as search;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Search runs
        .route("/api/v1/searches", post(search::handle_submit_search))
        .route("/api/v1/searches/page", post(pagination::handle_fetch_page))
        .route(
            "/api/v1/searches/:search_id/count",
            get(pagination::handle_item_count),
        )
        // Catalog and analysis passthrough
        .route("/api/v1/items/:external_id", get(search::handle_get_item))
        .route("/api/v1/analysis", post(analysis::handle_analyze))
        .with_state(state)
}
