//! Handlers for the `/products` resource.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use kudos_core::error::CoreError;
use kudos_core::slug::{slug_candidate, slugify};
use kudos_core::testimonial::{non_empty, MAX_NAME_LEN};
use kudos_core::types::DbId;
use kudos_db::models::product::{CreateProduct, Product};
use kudos_db::repositories::ProductRepo;
use serde::Deserialize;

use crate::error::{is_unique_violation, AppError, AppResult};
use crate::handlers::ownership::owned_product;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Give up on slug suffixes after this many collisions.
const MAX_SLUG_ATTEMPTS: u32 = 50;

const SLUG_CONSTRAINT: &str = "uq_products_slug";

/// Request body for `POST /products`.
#[derive(Debug, Deserialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
}

/// POST /api/v1/products
///
/// The slug is derived from the name; collisions get `-2`, `-3`, ...
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateProductRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Product>>)> {
    let name = input.name.trim();
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Product name must be 1-{MAX_NAME_LEN} characters"
        ))
        .into());
    }
    let base = slugify(name);
    if base.is_empty() {
        return Err(CoreError::Validation(
            "Product name must contain at least one letter or digit".into(),
        )
        .into());
    }

    let mut input = CreateProduct {
        user_id: auth.user_id,
        name: name.to_string(),
        slug: base.clone(),
        description: non_empty(input.description.as_deref()),
    };

    for attempt in 1..=MAX_SLUG_ATTEMPTS {
        input.slug = slug_candidate(&base, attempt);
        if ProductRepo::slug_exists(&state.pool, &input.slug).await? {
            continue;
        }
        match ProductRepo::create(&state.pool, &input).await {
            Ok(product) => {
                tracing::info!(user_id = auth.user_id, product_id = product.id, slug = %product.slug, "Product created");
                return Ok((StatusCode::CREATED, Json(DataResponse { data: product })));
            }
            // Lost a race with a concurrent insert; try the next suffix.
            Err(e) if is_unique_violation(&e, SLUG_CONSTRAINT) => continue,
            Err(e) => return Err(e.into()),
        }
    }

    Err(AppError::Core(CoreError::Conflict(format!(
        "Could not find a free slug for '{base}'"
    ))))
}

/// GET /api/v1/products
pub async fn list(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<Vec<Product>>>> {
    let products = ProductRepo::list_by_user(&state.pool, auth.user_id).await?;
    Ok(Json(DataResponse { data: products }))
}

/// GET /api/v1/products/{id}
pub async fn get_by_id(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Product>>> {
    let product = owned_product(&state.pool, id, auth.user_id).await?;
    Ok(Json(DataResponse { data: product }))
}
