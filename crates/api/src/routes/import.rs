use axum::routing::post;
use axum::Router;

use crate::handlers::import;
use crate::state::AppState;

/// Routes mounted at `/import`.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(import::import_url))
        .route("/csv", post(import::import_csv))
}
