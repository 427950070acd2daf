use std::sync::Arc;

use sqlx::PgPool;

use crate::analysis::AnalysisService;
use crate::catalog::CatalogClient;
use crate::config::Config;
use crate::pagination::PageIndex;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub catalog: Arc<dyn CatalogClient>,
    pub analysis: Arc<dyn AnalysisService>,
    /// Page start ids recorded per search run, shared across requests.
    pub page_index: Arc<PageIndex>,
    pub config: Config,
}
