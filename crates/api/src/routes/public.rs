//! Root-level routes loaded by host pages and the public wall.

use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;

use crate::config::ServerConfig;
use crate::handlers::public;
use crate::state::AppState;

/// ```text
/// GET /widget.js        -> loader_script
/// GET /widget/{id}      -> widget_data
/// GET /wall/{slug}      -> wall
/// GET /embed/*          -> static wasm-pack output
/// ```
pub fn router(config: &ServerConfig) -> Router<AppState> {
    Router::new()
        .route("/widget.js", get(public::loader_script))
        .route("/widget/{id}", get(public::widget_data))
        .route("/wall/{slug}", get(public::wall))
        .nest_service("/embed", ServeDir::new(&config.embed_assets_dir))
}
