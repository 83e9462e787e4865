//! Repository for the `testimonials` table.

use kudos_core::types::DbId;
use sqlx::PgPool;

use crate::models::testimonial::{CreateTestimonial, Testimonial};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, product_id, name, role, company, avatar_url, text, source, \
                       source_url, approved, created_at, updated_at";

/// Provides CRUD operations for testimonials.
pub struct TestimonialRepo;

impl TestimonialRepo {
    /// Insert a new testimonial, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTestimonial,
    ) -> Result<Testimonial, sqlx::Error> {
        let query = format!(
            "INSERT INTO testimonials
                (product_id, name, role, company, avatar_url, text, source, source_url, approved)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Testimonial>(&query)
            .bind(input.product_id)
            .bind(&input.name)
            .bind(&input.role)
            .bind(&input.company)
            .bind(&input.avatar_url)
            .bind(&input.text)
            .bind(&input.source)
            .bind(&input.source_url)
            .bind(input.approved)
            .fetch_one(pool)
            .await
    }

    /// Insert every row in one transaction. Either all rows land or none do.
    ///
    /// Returns the number of inserted rows.
    pub async fn insert_batch(
        pool: &PgPool,
        inputs: &[CreateTestimonial],
    ) -> Result<u64, sqlx::Error> {
        if inputs.is_empty() {
            return Ok(0);
        }

        let mut tx = pool.begin().await?;
        let mut inserted = 0;
        for input in inputs {
            let result = sqlx::query(
                "INSERT INTO testimonials
                    (product_id, name, role, company, avatar_url, text, source, source_url, approved)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(input.product_id)
            .bind(&input.name)
            .bind(&input.role)
            .bind(&input.company)
            .bind(&input.avatar_url)
            .bind(&input.text)
            .bind(&input.source)
            .bind(&input.source_url)
            .bind(input.approved)
            .execute(&mut *tx)
            .await?;
            inserted += result.rows_affected();
        }
        tx.commit().await?;
        tracing::debug!(rows = inserted, "Testimonial batch committed");
        Ok(inserted)
    }

    /// Find a testimonial by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Testimonial>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM testimonials WHERE id = $1");
        sqlx::query_as::<_, Testimonial>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List a product's testimonials, newest first, optionally filtered by
    /// approval state.
    pub async fn list_by_product(
        pool: &PgPool,
        product_id: DbId,
        approved: Option<bool>,
    ) -> Result<Vec<Testimonial>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM testimonials
             WHERE product_id = $1 AND ($2::BOOLEAN IS NULL OR approved = $2)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, Testimonial>(&query)
            .bind(product_id)
            .bind(approved)
            .fetch_all(pool)
            .await
    }

    /// Approved testimonials for a product, newest first, capped at `limit`.
    pub async fn list_approved(
        pool: &PgPool,
        product_id: DbId,
        limit: i64,
    ) -> Result<Vec<Testimonial>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM testimonials
             WHERE product_id = $1 AND approved = TRUE
             ORDER BY created_at DESC, id DESC
             LIMIT $2"
        );
        sqlx::query_as::<_, Testimonial>(&query)
            .bind(product_id)
            .bind(limit)
            .fetch_all(pool)
            .await
    }

    /// Set the approval flag. Returns `None` if the row does not exist.
    pub async fn set_approved(
        pool: &PgPool,
        id: DbId,
        approved: bool,
    ) -> Result<Option<Testimonial>, sqlx::Error> {
        let query = format!(
            "UPDATE testimonials SET approved = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Testimonial>(&query)
            .bind(id)
            .bind(approved)
            .fetch_optional(pool)
            .await
    }

    /// Permanently delete a testimonial. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM testimonials WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
