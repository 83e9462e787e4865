//! Handlers for widgets: CRUD, embed snippet and the authoring preview.
//!
//! Stored configs are always full configs: every write passes the incoming
//! partial through the config model first.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use kudos_core::error::CoreError;
use kudos_core::render::render;
use kudos_core::snippet::embed_snippet;
use kudos_core::testimonial::{non_empty, WidgetTestimonial};
use kudos_core::types::{DbId, Timestamp};
use kudos_core::widget_config::{merge_over, merge_with_defaults, WidgetConfig};
use kudos_db::models::widget::{CreateWidget, UpdateWidget, Widget, DEFAULT_WIDGET_NAME};
use kudos_db::repositories::{TestimonialRepo, WidgetRepo};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::handlers::ownership::{owned_product, owned_widget, parse_widget_id};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Approved testimonials loaded for the live preview. Matches the
/// largest `maxCount` a config can hold.
pub const PREVIEW_TESTIMONIAL_LIMIT: i64 = 50;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct WidgetRequest {
    pub name: Option<String>,
    pub config: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct PreviewRequest {
    #[serde(alias = "productId")]
    pub product_id: DbId,
    #[serde(default)]
    pub config: serde_json::Value,
}

/// Widget as returned to the owner, with its resolved config and snippet.
#[derive(Debug, Serialize)]
pub struct WidgetView {
    pub id: Uuid,
    pub product_id: DbId,
    pub name: String,
    pub config: WidgetConfig,
    pub snippet: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl WidgetView {
    fn new(widget: Widget, public_base_url: &str) -> Self {
        Self {
            snippet: embed_snippet(public_base_url, &widget.id.to_string()),
            config: merge_with_defaults(&widget.config),
            id: widget.id,
            product_id: widget.product_id,
            name: widget.name,
            created_at: widget.created_at,
            updated_at: widget.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PreviewResponse {
    pub html: String,
    pub font_stylesheet: Option<String>,
    pub card_count: usize,
}

fn config_to_json(config: &WidgetConfig) -> AppResult<serde_json::Value> {
    serde_json::to_value(config)
        .map_err(|e| AppError::InternalError(format!("Config serialization error: {e}")))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/products/{id}/widgets
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(product_id): Path<DbId>,
    Json(body): Json<WidgetRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<WidgetView>>)> {
    owned_product(&state.pool, product_id, auth.user_id).await?;

    let config = merge_with_defaults(&body.config.unwrap_or_default());
    let input = CreateWidget {
        product_id,
        name: non_empty(body.name.as_deref()).unwrap_or_else(|| DEFAULT_WIDGET_NAME.to_string()),
        config: config_to_json(&config)?,
    };
    let widget = WidgetRepo::create(&state.pool, &input).await?;

    tracing::info!(user_id = auth.user_id, product_id, widget_id = %widget.id, "Widget created");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: WidgetView::new(widget, &state.config.public_base_url),
        }),
    ))
}

/// GET /api/v1/products/{id}/widgets
pub async fn list_by_product(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(product_id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<WidgetView>>>> {
    owned_product(&state.pool, product_id, auth.user_id).await?;
    let widgets = WidgetRepo::list_by_product(&state.pool, product_id).await?;
    let base = &state.config.public_base_url;
    Ok(Json(DataResponse {
        data: widgets.into_iter().map(|w| WidgetView::new(w, base)).collect(),
    }))
}

/// GET /api/v1/widgets/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<DataResponse<WidgetView>>> {
    let widget = owned_widget(&state.pool, parse_widget_id(&id)?, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: WidgetView::new(widget, &state.config.public_base_url),
    }))
}

/// PUT /api/v1/widgets/{id}
///
/// `config` is a partial merged over the stored config, so fields the
/// editor did not send keep their saved values.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<WidgetRequest>,
) -> AppResult<Json<DataResponse<WidgetView>>> {
    let widget = owned_widget(&state.pool, parse_widget_id(&id)?, auth.user_id).await?;

    let config = match &body.config {
        Some(patch) => {
            let stored = merge_with_defaults(&widget.config);
            Some(config_to_json(&merge_over(&stored, patch))?)
        }
        None => None,
    };
    let input = UpdateWidget {
        name: non_empty(body.name.as_deref()),
        config,
    };
    let updated = WidgetRepo::update(&state.pool, widget.id, &input)
        .await?
        .ok_or_else(|| CoreError::not_found("Widget", widget.id))?;

    tracing::info!(user_id = auth.user_id, widget_id = %updated.id, "Widget saved");
    Ok(Json(DataResponse {
        data: WidgetView::new(updated, &state.config.public_base_url),
    }))
}

/// DELETE /api/v1/widgets/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    let widget = owned_widget(&state.pool, parse_widget_id(&id)?, auth.user_id).await?;
    WidgetRepo::delete(&state.pool, widget.id).await?;
    tracing::info!(user_id = auth.user_id, widget_id = %widget.id, "Widget deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/widgets/preview
///
/// Renders with the same renderer the embed runtime uses, so the editor
/// shows exactly what host pages will show.
pub async fn preview(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<PreviewRequest>,
) -> AppResult<Json<DataResponse<PreviewResponse>>> {
    owned_product(&state.pool, body.product_id, auth.user_id).await?;

    let config = merge_with_defaults(&body.config);
    let testimonials: Vec<WidgetTestimonial> =
        TestimonialRepo::list_approved(&state.pool, body.product_id, PREVIEW_TESTIMONIAL_LIMIT)
            .await?
            .into_iter()
            .map(WidgetTestimonial::from)
            .collect();

    let rendered = render(&testimonials, &config);
    Ok(Json(DataResponse {
        data: PreviewResponse {
            html: rendered.to_html(),
            font_stylesheet: rendered.font_stylesheet,
            card_count: rendered.card_count,
        },
    }))
}
