pub mod auth;
pub mod health;
pub mod import;
pub mod products;
pub mod public;
pub mod testimonials;
pub mod widgets;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/signup                                     create account (public)
/// /auth/login                                      login (public)
/// /auth/me                                         current user
///
/// /products                                        list, create
/// /products/{id}                                   get
/// /products/{id}/testimonials                      list (?approved=), create
/// /products/{id}/widgets                           list, create
///
/// /testimonials                                    submit (public form)
/// /testimonials/{id}                               delete
/// /testimonials/{id}/approve                       approve / unapprove (PATCH)
///
/// /widgets/preview                                 live preview (POST)
/// /widgets/{id}                                    get, update, delete
///
/// /import                                          URL -> draft (POST)
/// /import/csv                                      bulk CSV upload (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/products", products::router())
        .nest("/testimonials", testimonials::router())
        .nest("/widgets", widgets::router())
        .nest("/import", import::router())
}
