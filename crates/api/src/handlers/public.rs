//! Public embed surfaces: widget data, loader script and the wall.
//!
//! These are fetched by third-party pages without credentials.

use axum::extract::{Path, State};
use axum::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use axum::response::IntoResponse;
use axum::Json;
use kudos_core::embed::{ProductSummary, WidgetBundle};
use kudos_core::error::CoreError;
use kudos_core::testimonial::WidgetTestimonial;
use kudos_core::widget_config::merge_with_defaults;
use kudos_db::models::product::PublicProduct;
use kudos_db::repositories::{ProductRepo, TestimonialRepo, WidgetRepo};
use serde::Serialize;

use crate::error::AppResult;
use crate::handlers::ownership::parse_widget_id;
use crate::state::AppState;

/// Path of the wasm-pack JS glue under the public base URL.
pub const EMBED_MODULE_PATH: &str = "/embed/kudos_embed.js";

const LOADER_CACHE_CONTROL: &str = "public, max-age=3600";

#[derive(Debug, Serialize)]
pub struct WallResponse {
    pub product: PublicProduct,
    pub testimonials: Vec<WidgetTestimonial>,
    pub count: usize,
}

/// GET /widget/{id}
///
/// `{config, testimonials, product: {name}}`. Testimonials are approved
/// only, newest first, capped at the widget's `maxCount`.
pub async fn widget_data(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<WidgetBundle>> {
    let widget_id = parse_widget_id(&id)?;
    let widget = WidgetRepo::find_by_id(&state.pool, widget_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Widget", widget_id))?;
    let product = ProductRepo::find_by_id(&state.pool, widget.product_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Product", widget.product_id))?;

    let config = merge_with_defaults(&widget.config);
    let testimonials =
        TestimonialRepo::list_approved(&state.pool, product.id, i64::from(config.max_count))
            .await?
            .into_iter()
            .map(WidgetTestimonial::from)
            .collect();

    tracing::debug!(widget_id = %widget_id, "Serving widget data");
    Ok(Json(WidgetBundle {
        config,
        testimonials,
        product: ProductSummary { name: product.name },
    }))
}

/// GET /widget.js
///
/// Bootstrap that loads the wasm embed runtime and starts it against this
/// server. A load failure is logged to the console only.
pub async fn loader_script(State(state): State<AppState>) -> impl IntoResponse {
    (
        [
            (CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (CACHE_CONTROL, LOADER_CACHE_CONTROL),
        ],
        loader_source(&state.config.public_base_url),
    )
}

/// JavaScript source of the loader for a given public base URL.
pub fn loader_source(public_base_url: &str) -> String {
    // A JSON string literal is a valid JS string literal.
    let base = serde_json::Value::String(public_base_url.trim_end_matches('/').to_string());
    format!(
        r#"(function () {{
  var base = {base};
  import(base + "{EMBED_MODULE_PATH}")
    .then(function (m) {{ return m.default().then(function () {{ m.start(base); }}); }})
    .catch(function (e) {{ console.error("[kudos] widget runtime failed to load", e); }});
}})();
"#
    )
}

/// GET /wall/{slug}
pub async fn wall(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> AppResult<Json<WallResponse>> {
    let product = ProductRepo::find_by_slug(&state.pool, &slug)
        .await?
        .ok_or_else(|| CoreError::not_found("Product", &slug))?;
    let testimonials: Vec<WidgetTestimonial> =
        TestimonialRepo::list_by_product(&state.pool, product.id, Some(true))
            .await?
            .into_iter()
            .map(WidgetTestimonial::from)
            .collect();

    Ok(Json(WallResponse {
        product: PublicProduct::from(&product),
        count: testimonials.len(),
        testimonials,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loader_imports_embed_module_from_base() {
        let js = loader_source("https://kudos.example/");
        assert!(js.contains(r#"var base = "https://kudos.example";"#));
        assert!(js.contains(r#"import(base + "/embed/kudos_embed.js")"#));
        assert!(js.contains("m.start(base)"));
    }

    #[test]
    fn loader_escapes_base_url() {
        let js = loader_source("https://kudos.example/\"</script>");
        assert!(js.contains(r#"var base = "https://kudos.example/\"</script>";"#));
    }
}
