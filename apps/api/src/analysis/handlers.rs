use axum::{extract::State, Json};
use serde_json::Value;
use tracing::info;

use crate::catalog::CatalogItem;
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/analysis
/// Forwards a batch of items to the analysis service and returns its response verbatim.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(items): Json<Vec<CatalogItem>>,
) -> Result<Json<Value>, AppError> {
    if items.is_empty() {
        return Err(AppError::Validation(
            "At least one item is required for analysis".to_string(),
        ));
    }

    info!("Forwarding {} items for analysis", items.len());
    let analysis = state.analysis.analyze(&items).await?;
    Ok(Json(analysis))
}
