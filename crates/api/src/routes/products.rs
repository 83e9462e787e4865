//! Route definitions for the `/products` resource and its nested
//! testimonial and widget collections.

use axum::routing::get;
use axum::Router;

use crate::handlers::{products, testimonials, widgets};
use crate::state::AppState;

/// Routes mounted at `/products`.
///
/// ```text
/// GET    /                      -> list
/// POST   /                      -> create
/// GET    /{id}                  -> get_by_id
/// GET    /{id}/testimonials     -> testimonials::list_by_product
/// POST   /{id}/testimonials     -> testimonials::create_for_product
/// GET    /{id}/widgets          -> widgets::list_by_product
/// POST   /{id}/widgets          -> widgets::create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(products::list).post(products::create))
        .route("/{id}", get(products::get_by_id))
        .route(
            "/{id}/testimonials",
            get(testimonials::list_by_product).post(testimonials::create_for_product),
        )
        .route(
            "/{id}/widgets",
            get(widgets::list_by_product).post(widgets::create),
        )
}
