//! Ownership checks shared by owner-scoped handlers.
//!
//! Every lookup returns 404 when the row is missing and 403 when it belongs
//! to another user, before any mutation happens.

use kudos_core::error::CoreError;
use kudos_core::types::DbId;
use kudos_db::models::product::Product;
use kudos_db::models::testimonial::Testimonial;
use kudos_db::models::widget::Widget;
use kudos_db::repositories::{ProductRepo, TestimonialRepo, WidgetRepo};
use kudos_db::DbPool;
use uuid::Uuid;

use crate::error::AppResult;

/// Parse a widget id path segment. Malformed ids are reported as not found
/// so the public endpoint does not distinguish them from unknown ones.
pub fn parse_widget_id(raw: &str) -> AppResult<Uuid> {
    Uuid::parse_str(raw).map_err(|_| CoreError::not_found("Widget", raw).into())
}

/// Load a product and ensure `user_id` owns it.
pub async fn owned_product(pool: &DbPool, product_id: DbId, user_id: DbId) -> AppResult<Product> {
    let product = ProductRepo::find_by_id(pool, product_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Product", product_id))?;
    if product.user_id != user_id {
        return Err(CoreError::Forbidden("You do not own this product".into()).into());
    }
    Ok(product)
}

/// Load a testimonial and ensure `user_id` owns its product.
pub async fn owned_testimonial(
    pool: &DbPool,
    testimonial_id: DbId,
    user_id: DbId,
) -> AppResult<Testimonial> {
    let testimonial = TestimonialRepo::find_by_id(pool, testimonial_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Testimonial", testimonial_id))?;
    owned_product(pool, testimonial.product_id, user_id).await?;
    Ok(testimonial)
}

/// Load a widget and ensure `user_id` owns its product.
pub async fn owned_widget(pool: &DbPool, widget_id: Uuid, user_id: DbId) -> AppResult<Widget> {
    let widget = WidgetRepo::find_by_id(pool, widget_id)
        .await?
        .ok_or_else(|| CoreError::not_found("Widget", widget_id))?;
    owned_product(pool, widget.product_id, user_id).await?;
    Ok(widget)
}
