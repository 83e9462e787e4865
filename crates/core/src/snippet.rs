//! Embed snippet handed to customers.

/// Path of the loader script under the public base URL.
pub const LOADER_SCRIPT_PATH: &str = "/widget.js";

/// HTML to paste into a host page for widget `widget_id`.
pub fn embed_snippet(public_base_url: &str, widget_id: &str) -> String {
    let base = public_base_url.trim_end_matches('/');
    format!(
        "<div data-kudos-widget=\"{widget_id}\"></div>\n<script src=\"{base}{LOADER_SCRIPT_PATH}\" async></script>"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_references_widget_and_loader() {
        assert_eq!(
            embed_snippet("https://kudos.example/", "abc-123"),
            "<div data-kudos-widget=\"abc-123\"></div>\n<script src=\"https://kudos.example/widget.js\" async></script>"
        );
    }
}
