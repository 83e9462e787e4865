//! Shared response envelope types for API handlers.
//!
//! Owner-facing `/api/v1` responses use a `{ "data": ... }` envelope. The
//! public embed endpoints and the import endpoints return their payloads
//! bare because third-party pages and the editor consume them directly.

use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
///
/// ```ignore
/// Ok(Json(DataResponse { data: items }))
/// ```
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}
