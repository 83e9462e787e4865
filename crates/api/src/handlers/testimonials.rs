//! Handlers for testimonials: public submission plus owner moderation.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use kudos_core::error::CoreError;
use kudos_core::testimonial::{validate_new_testimonial, Source, TestimonialInput};
use kudos_core::types::DbId;
use kudos_db::models::testimonial::{CreateTestimonial, Testimonial};
use kudos_db::repositories::{ProductRepo, TestimonialRepo};
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::handlers::ownership::{owned_product, owned_testimonial};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Body of the public submission form. Source and approval are not
/// client-controlled: unknown fields such as `approved` are ignored.
#[derive(Debug, Deserialize)]
pub struct SubmitTestimonialRequest {
    #[serde(alias = "productId")]
    pub product_id: DbId,
    pub name: String,
    pub role: Option<String>,
    pub company: Option<String>,
    #[serde(alias = "avatarUrl")]
    pub avatar_url: Option<String>,
    pub text: String,
}

/// Owner-entered testimonial, typically a confirmed import draft.
#[derive(Debug, Deserialize)]
pub struct CreateTestimonialRequest {
    pub name: String,
    pub role: Option<String>,
    pub company: Option<String>,
    pub avatar_url: Option<String>,
    pub text: String,
    pub source: Option<String>,
    pub source_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ListTestimonialsParams {
    pub approved: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ApprovalRequest {
    pub approved: bool,
}

#[derive(Debug, Serialize)]
pub struct CreatedId {
    pub id: DbId,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/testimonials
///
/// Public form submission. Always stored as `source = form`, unapproved.
pub async fn submit(
    State(state): State<AppState>,
    Json(body): Json<SubmitTestimonialRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<CreatedId>>)> {
    let input = TestimonialInput {
        name: body.name,
        role: body.role,
        company: body.company,
        avatar_url: body.avatar_url,
        text: body.text,
        source: None,
        source_url: None,
    };
    let valid = validate_new_testimonial(&input, Source::Form)?;

    ProductRepo::find_by_id(&state.pool, body.product_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Product", body.product_id))?;

    let created = TestimonialRepo::create(
        &state.pool,
        &CreateTestimonial::from_valid(body.product_id, valid, false),
    )
    .await?;

    tracing::info!(product_id = body.product_id, testimonial_id = created.id, "Testimonial submitted");
    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: CreatedId { id: created.id },
        }),
    ))
}

/// POST /api/v1/products/{id}/testimonials
///
/// Owner entry; created pre-approved. `source` defaults to `manual`.
pub async fn create_for_product(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(product_id): Path<DbId>,
    Json(body): Json<CreateTestimonialRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Testimonial>>)> {
    owned_product(&state.pool, product_id, auth.user_id).await?;

    let input = TestimonialInput {
        name: body.name,
        role: body.role,
        company: body.company,
        avatar_url: body.avatar_url,
        text: body.text,
        source: body.source,
        source_url: body.source_url,
    };
    let valid = validate_new_testimonial(&input, Source::Manual)?;
    let created = TestimonialRepo::create(
        &state.pool,
        &CreateTestimonial::from_valid(product_id, valid, true),
    )
    .await?;

    tracing::info!(user_id = auth.user_id, product_id, testimonial_id = created.id, "Testimonial added");
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /api/v1/products/{id}/testimonials?approved=
pub async fn list_by_product(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(product_id): Path<DbId>,
    Query(params): Query<ListTestimonialsParams>,
) -> AppResult<Json<DataResponse<Vec<Testimonial>>>> {
    owned_product(&state.pool, product_id, auth.user_id).await?;
    let items = TestimonialRepo::list_by_product(&state.pool, product_id, params.approved).await?;
    Ok(Json(DataResponse { data: items }))
}

/// PATCH /api/v1/testimonials/{id}/approve
pub async fn set_approval(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Json(body): Json<ApprovalRequest>,
) -> AppResult<Json<DataResponse<Testimonial>>> {
    owned_testimonial(&state.pool, id, auth.user_id).await?;
    let updated = TestimonialRepo::set_approved(&state.pool, id, body.approved)
        .await?
        .ok_or_else(|| CoreError::not_found("Testimonial", id))?;

    tracing::info!(user_id = auth.user_id, testimonial_id = id, approved = body.approved, "Testimonial approval changed");
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /api/v1/testimonials/{id}
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    owned_testimonial(&state.pool, id, auth.user_id).await?;
    if !TestimonialRepo::delete(&state.pool, id).await? {
        return Err(CoreError::not_found("Testimonial", id).into());
    }
    tracing::info!(user_id = auth.user_id, testimonial_id = id, "Testimonial deleted");
    Ok(StatusCode::NO_CONTENT)
}
