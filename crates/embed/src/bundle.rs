//! Widget data endpoint addressing and response decoding.

use kudos_core::embed::{EmbedError, WidgetBundle};

/// `GET {base}/widget/{id}`.
pub fn widget_data_url(base_url: &str, widget_id: &str) -> String {
    format!("{}/widget/{widget_id}", base_url.trim_end_matches('/'))
}

/// Map an HTTP status and body from the widget data endpoint to a bundle.
pub fn decode_widget_response(
    widget_id: &str,
    status: u16,
    body: &str,
) -> Result<WidgetBundle, EmbedError> {
    match status {
        200..=299 => {
            serde_json::from_str(body).map_err(|e| EmbedError::Payload(e.to_string()))
        }
        404 => Err(EmbedError::NotFound(widget_id.to_string())),
        other => Err(EmbedError::Fetch(format!("HTTP {other}"))),
    }
}
