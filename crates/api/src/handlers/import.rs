//! Handlers for `/import`: URL normalization and CSV bulk upload.

use axum::extract::{Multipart, State};
use axum::Json;
use kudos_core::csv_import::parse_csv;
use kudos_core::importer::{normalize_url, ImportDraft};
use kudos_core::types::DbId;
use kudos_db::models::testimonial::CreateTestimonial;
use kudos_db::repositories::TestimonialRepo;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::handlers::ownership::owned_product;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ImportUrlRequest {
    pub url: Option<String>,
    #[serde(alias = "productId")]
    pub product_id: Option<DbId>,
}

#[derive(Debug, Serialize)]
pub struct CsvImportResponse {
    pub imported: u64,
    pub skipped: usize,
    pub errors: Vec<String>,
}

/// POST /api/v1/import
///
/// Returns a draft for the operator to review. Extraction failures degrade
/// to `{source, source_url}`; only missing or invalid input is an error.
pub async fn import_url(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(body): Json<ImportUrlRequest>,
) -> AppResult<Json<ImportDraft>> {
    let (Some(url), Some(product_id)) = (body.url.filter(|u| !u.trim().is_empty()), body.product_id)
    else {
        return Err(AppError::BadRequest(
            "url and product_id are required".into(),
        ));
    };
    owned_product(&state.pool, product_id, auth.user_id).await?;

    let draft = normalize_url(&url, state.page_fetcher.as_ref()).await?;
    tracing::info!(user_id = auth.user_id, product_id, source = %draft.source, "Import draft produced");
    Ok(Json(draft))
}

/// POST /api/v1/import/csv
///
/// Multipart fields: `file` (CSV with header row) and `product_id`.
/// Valid rows are inserted unapproved in one transaction; if that fails
/// nothing is saved.
pub async fn import_csv(
    auth: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<Json<CsvImportResponse>> {
    let mut file: Option<Vec<u8>> = None;
    let mut product_id: Option<DbId> = None;

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                file = Some(field.bytes().await?.to_vec());
            }
            "product_id" | "productId" => {
                let text = field.text().await?;
                product_id = Some(
                    text.trim()
                        .parse()
                        .map_err(|_| AppError::BadRequest("product_id must be an integer".into()))?,
                );
            }
            _ => {}
        }
    }

    let (Some(file), Some(product_id)) = (file, product_id) else {
        return Err(AppError::BadRequest(
            "file and product_id are required".into(),
        ));
    };
    owned_product(&state.pool, product_id, auth.user_id).await?;

    let outcome = parse_csv(&file);
    let rows: Vec<CreateTestimonial> = outcome
        .rows
        .into_iter()
        .map(|valid| CreateTestimonial::from_valid(product_id, valid, false))
        .collect();

    let imported = TestimonialRepo::insert_batch(&state.pool, &rows)
        .await
        .map_err(|e| {
            tracing::error!(product_id, rows = rows.len(), error = %e, "CSV batch insert failed");
            AppError::InternalError(format!("CSV import failed, nothing was saved: {e}"))
        })?;

    tracing::info!(
        user_id = auth.user_id,
        product_id,
        imported,
        skipped = outcome.skipped,
        "CSV import finished"
    );
    Ok(Json(CsvImportResponse {
        imported,
        skipped: outcome.skipped,
        errors: outcome.errors,
    }))
}
