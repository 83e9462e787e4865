use axum::routing::{get, post};
use axum::Router;

use crate::handlers::widgets;
use crate::state::AppState;

/// Routes mounted at `/widgets`.
///
/// ```text
/// POST   /preview   -> preview
/// GET    /{id}      -> get_by_id
/// PUT    /{id}      -> update
/// DELETE /{id}      -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/preview", post(widgets::preview))
        .route(
            "/{id}",
            get(widgets::get_by_id)
                .put(widgets::update)
                .delete(widgets::delete),
        )
}
