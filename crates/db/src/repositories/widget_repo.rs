//! Repository for the `widgets` table.

use kudos_core::types::DbId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::widget::{CreateWidget, UpdateWidget, Widget};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, product_id, name, config, created_at, updated_at";

/// Provides CRUD operations for widgets.
pub struct WidgetRepo;

impl WidgetRepo {
    /// Insert a new widget under a fresh random UUID.
    pub async fn create(pool: &PgPool, input: &CreateWidget) -> Result<Widget, sqlx::Error> {
        let query = format!(
            "INSERT INTO widgets (id, product_id, name, config)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Widget>(&query)
            .bind(Uuid::new_v4())
            .bind(input.product_id)
            .bind(&input.name)
            .bind(&input.config)
            .fetch_one(pool)
            .await
    }

    /// Find a widget by its UUID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Widget>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM widgets WHERE id = $1");
        sqlx::query_as::<_, Widget>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a product's widgets, most recently created first.
    pub async fn list_by_product(
        pool: &PgPool,
        product_id: DbId,
    ) -> Result<Vec<Widget>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM widgets WHERE product_id = $1 ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Widget>(&query)
            .bind(product_id)
            .fetch_all(pool)
            .await
    }

    /// Update a widget. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        input: &UpdateWidget,
    ) -> Result<Option<Widget>, sqlx::Error> {
        let query = format!(
            "UPDATE widgets SET
                name = COALESCE($2, name),
                config = COALESCE($3, config)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Widget>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.config)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a widget. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM widgets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
