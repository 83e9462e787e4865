//! Widget entity model and DTOs.

use kudos_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub const DEFAULT_WIDGET_NAME: &str = "My Widget";

/// A widget row from the `widgets` table.
///
/// `config` is stored as JSONB and re-merged with defaults on every read,
/// so rows written before a field existed still produce a full config.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Widget {
    pub id: Uuid,
    pub product_id: DbId,
    pub name: String,
    pub config: serde_json::Value,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a widget. `config` must already be a full, merged config.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateWidget {
    pub product_id: DbId,
    pub name: String,
    pub config: serde_json::Value,
}

/// DTO for updating a widget. All fields are optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateWidget {
    pub name: Option<String>,
    pub config: Option<serde_json::Value>,
}
