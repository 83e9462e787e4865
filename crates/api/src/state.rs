use std::sync::Arc;

use kudos_core::importer::PageFetcher;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: kudos_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Outbound HTTP used by URL import (oEmbed, listing pages).
    pub page_fetcher: Arc<dyn PageFetcher>,
}
