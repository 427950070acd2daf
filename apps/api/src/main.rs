mod analysis;
mod catalog;
mod config;
mod db;
mod errors;
mod pagination;
mod routes;
mod search;
mod state;
#[cfg(test)]
mod testing;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::HttpAnalysisClient;
use crate::catalog::GraphQlCatalogClient;
use crate::config::Config;
use crate::db::{create_pool, ensure_schema};
use crate::pagination::PageIndex;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Atlas API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url, config.db_connection_limit).await?;
    ensure_schema(&db).await?;

    // Initialize collaborators
    let catalog = Arc::new(GraphQlCatalogClient::new(&config.catalog)?);
    info!("Catalog client initialized ({})", config.catalog.graphql_url);

    let analysis = Arc::new(HttpAnalysisClient::new(config.analysis_service_url.clone())?);
    info!("Analysis client initialized ({})", config.analysis_service_url);

    // Build app state
    let state = AppState {
        db,
        catalog,
        analysis,
        page_index: Arc::new(PageIndex::with_capacity(config.page_index_capacity)),
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
