use axum::routing::{delete, patch, post};
use axum::Router;

use crate::handlers::testimonials;
use crate::state::AppState;

/// Routes mounted at `/testimonials`.
///
/// ```text
/// POST   /                -> submit (public form)
/// DELETE /{id}            -> delete
/// PATCH  /{id}/approve    -> set_approval
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(testimonials::submit))
        .route("/{id}", delete(testimonials::delete))
        .route("/{id}/approve", patch(testimonials::set_approval))
}
