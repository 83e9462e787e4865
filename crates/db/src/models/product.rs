//! Product entity model and DTOs.

use kudos_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A product row from the `products` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Product {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Public view of a product on its wall page.
#[derive(Debug, Clone, Serialize)]
pub struct PublicProduct {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
}

impl From<&Product> for PublicProduct {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            name: product.name.clone(),
            description: product.description.clone(),
        }
    }
}

/// DTO for creating a new product. `slug` is derived from the name by the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateProduct {
    pub user_id: DbId,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
}
