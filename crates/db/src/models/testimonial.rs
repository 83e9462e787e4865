//! Testimonial entity model and DTOs.

use kudos_core::testimonial::{ValidTestimonial, WidgetTestimonial};
use kudos_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A testimonial row from the `testimonials` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Testimonial {
    pub id: DbId,
    pub product_id: DbId,
    pub name: String,
    pub role: Option<String>,
    pub company: Option<String>,
    pub avatar_url: Option<String>,
    pub text: String,
    pub source: String,
    pub source_url: Option<String>,
    pub approved: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Testimonial> for WidgetTestimonial {
    fn from(t: Testimonial) -> Self {
        Self {
            id: t.id,
            name: t.name,
            role: t.role,
            company: t.company,
            avatar_url: t.avatar_url,
            text: t.text,
            source: t.source,
            source_url: t.source_url,
        }
    }
}

/// DTO for inserting a testimonial. Built from already-validated fields.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateTestimonial {
    pub product_id: DbId,
    pub name: String,
    pub role: Option<String>,
    pub company: Option<String>,
    pub avatar_url: Option<String>,
    pub text: String,
    pub source: String,
    pub source_url: Option<String>,
    pub approved: bool,
}

impl CreateTestimonial {
    pub fn from_valid(product_id: DbId, valid: ValidTestimonial, approved: bool) -> Self {
        Self {
            product_id,
            name: valid.name,
            role: valid.role,
            company: valid.company,
            avatar_url: valid.avatar_url,
            text: valid.text,
            source: valid.source.as_str().to_string(),
            source_url: valid.source_url,
            approved,
        }
    }
}
