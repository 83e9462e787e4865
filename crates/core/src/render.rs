//! Widget renderer: turns testimonials plus a configuration into a
//! self-contained element tree.
//!
//! The tree carries only inline styles and one scoped `<style>` element, so
//! it can be dropped into a shadow root on any host page. Testimonial fields
//! are always emitted as text nodes or escaped attribute values; nothing
//! from a testimonial is ever interpreted as markup.

use std::fmt::Write;

use crate::style::{resolve_style, Declarations, ResolvedStyle, GRID_CLASS};
use crate::testimonial::{is_http_url, WidgetTestimonial};
use crate::widget_config::WidgetConfig;

// ── Tree ─────────────────────────────────────────────────────────────

/// A node in the rendered widget tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element {
        tag: &'static str,
        attrs: Vec<(&'static str, String)>,
        children: Vec<Node>,
    },
    Text(String),
}

/// Elements serialized without a closing tag.
const VOID_TAGS: &[&str] = &["img"];

impl Node {
    pub fn element(tag: &'static str) -> Self {
        Node::Element {
            tag,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn text(s: impl Into<String>) -> Self {
        Node::Text(s.into())
    }

    pub fn attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        if let Node::Element { attrs, .. } = &mut self {
            attrs.push((name, value.into()));
        }
        self
    }

    pub fn style(self, declarations: &Declarations) -> Self {
        self.attr("style", declarations.to_css())
    }

    pub fn child(mut self, node: Node) -> Self {
        if let Node::Element { children, .. } = &mut self {
            children.push(node);
        }
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = Node>) -> Self {
        if let Node::Element { children, .. } = &mut self {
            children.extend(nodes);
        }
        self
    }

    /// Look up an attribute value on an element node.
    pub fn get_attr(&self, name: &str) -> Option<&str> {
        match self {
            Node::Element { attrs, .. } => attrs
                .iter()
                .find(|(n, _)| *n == name)
                .map(|(_, v)| v.as_str()),
            Node::Text(_) => None,
        }
    }

    /// Concatenated text content of this node and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Node::Text(s) => out.push_str(s),
            Node::Element { children, .. } => {
                for c in children {
                    c.collect_text(out);
                }
            }
        }
    }

    /// Depth-first search for every element carrying `class`.
    pub fn find_by_class<'a>(&'a self, class: &str, out: &mut Vec<&'a Node>) {
        if let Node::Element { children, .. } = self {
            if self
                .get_attr("class")
                .is_some_and(|c| c.split_whitespace().any(|c| c == class))
            {
                out.push(self);
            }
            for c in children {
                c.find_by_class(class, out);
            }
        }
    }

    /// Serialize to HTML. Text and attribute values are escaped.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Node::Text(s) => escape_into(s, out),
            Node::Element {
                tag,
                attrs,
                children,
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(value, out);
                    out.push('"');
                }
                out.push('>');
                if VOID_TAGS.contains(tag) {
                    return;
                }
                // Raw text element: content comes from the resolver, never
                // from testimonial fields, so it is written verbatim.
                if *tag == "style" {
                    for c in children {
                        if let Node::Text(css) = c {
                            out.push_str(&css.replace("</", "<\\/"));
                        }
                    }
                } else {
                    for c in children {
                        c.write_html(out);
                    }
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

/// Escape `&`, `<`, `>`, `"`, `'` and `/`.
fn escape_into(s: &str, out: &mut String) {
    // Writing into a String cannot fail.
    let _ = write!(out, "{}", v_htmlescape::escape(s));
}

// ── Per-card helpers ─────────────────────────────────────────────────

/// Label and colors for a source badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceBadge {
    pub label: &'static str,
    pub background: &'static str,
    pub color: &'static str,
}

pub const SOURCE_BADGES: &[(&str, SourceBadge)] = &[
    (
        "twitter",
        SourceBadge {
            label: "Twitter",
            background: "#e0f2fe",
            color: "#0369a1",
        },
    ),
    (
        "linkedin",
        SourceBadge {
            label: "LinkedIn",
            background: "#dbeafe",
            color: "#1d4ed8",
        },
    ),
    (
        "producthunt",
        SourceBadge {
            label: "Product Hunt",
            background: "#ffedd5",
            color: "#c2410c",
        },
    ),
    (
        "form",
        SourceBadge {
            label: "Form",
            background: "#dcfce7",
            color: "#15803d",
        },
    ),
];

/// Badge for `manual`, empty and unrecognised sources.
pub const FALLBACK_BADGE: SourceBadge = SourceBadge {
    label: "Manual",
    background: "#f3f4f6",
    color: "#374151",
};

pub fn source_badge(source: &str) -> SourceBadge {
    let source = source.trim();
    SOURCE_BADGES
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(source))
        .map(|(_, badge)| *badge)
        .unwrap_or(FALLBACK_BADGE)
}

/// Up to two uppercase initials from the first two whitespace-separated words.
pub fn monogram(name: &str) -> String {
    name.split_whitespace()
        .take(2)
        .filter_map(|word| word.chars().next())
        .flat_map(char::to_uppercase)
        .take(2)
        .collect()
}

/// `"role at company"`, either side optional; `None` when both are blank.
pub fn role_line(role: Option<&str>, company: Option<&str>) -> Option<String> {
    let parts: Vec<&str> = [role, company]
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" at "))
    }
}

// ── Render ───────────────────────────────────────────────────────────

/// Output of [`render`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedWidget {
    pub tree: Node,
    /// Stylesheet the host must load once for a custom font.
    pub font_stylesheet: Option<String>,
    /// Number of cards in the tree.
    pub card_count: usize,
}

impl RenderedWidget {
    pub fn to_html(&self) -> String {
        self.tree.to_html()
    }
}

pub const CARD_CLASS: &str = "kudos-card";

/// Render `testimonials` (in caller order, truncated to `max_count`).
pub fn render(testimonials: &[WidgetTestimonial], config: &WidgetConfig) -> RenderedWidget {
    let style = resolve_style(config);
    let limit = usize::from(config.max_count);

    let cards: Vec<Node> = testimonials
        .iter()
        .take(limit)
        .map(|t| render_card(t, config, &style))
        .collect();
    let card_count = cards.len();

    let grid = Node::element("div").attr("class", GRID_CLASS).children(cards);

    let tree = Node::element("div")
        .attr("class", "kudos-widget")
        .style(&style.container)
        .child(Node::element("style").child(Node::text(style.stylesheet.clone())))
        .child(grid);

    RenderedWidget {
        tree,
        font_stylesheet: style.font_stylesheet,
        card_count,
    }
}

fn render_card(t: &WidgetTestimonial, config: &WidgetConfig, style: &ResolvedStyle) -> Node {
    let mut card = Node::element("div")
        .attr("class", CARD_CLASS)
        .style(&style.card);

    if config.show_avatar {
        card = card.child(
            Node::element("div")
                .style(&style.avatar_wrapper)
                .child(render_avatar(t, style)),
        );
    }

    card = card
        .child(
            Node::element("p")
                .attr("class", "kudos-text")
                .style(&style.body)
                .child(Node::text(t.text.as_str())),
        )
        .child(
            Node::element("p")
                .attr("class", "kudos-name")
                .style(&style.name)
                .child(Node::text(t.name.as_str())),
        );

    if config.show_role {
        if let Some(line) = role_line(t.role.as_deref(), t.company.as_deref()) {
            card = card.child(
                Node::element("p")
                    .attr("class", "kudos-role")
                    .style(&style.role)
                    .child(Node::text(line)),
            );
        }
    }

    if config.show_source {
        let badge = source_badge(&t.source);
        let declarations = style
            .badge
            .clone()
            .with("background", badge.background)
            .with("color", badge.color);
        card = card.child(
            Node::element("span")
                .attr("class", "kudos-source")
                .style(&declarations)
                .child(Node::text(badge.label)),
        );
    }

    card
}

fn render_avatar(t: &WidgetTestimonial, style: &ResolvedStyle) -> Node {
    match t.avatar_url.as_deref().map(str::trim) {
        Some(url) if is_http_url(url) => Node::element("img")
            .attr("src", url)
            .attr("alt", "")
            .attr("loading", "lazy")
            .style(&style.avatar_image),
        _ => Node::element("div")
            .attr("class", "kudos-monogram")
            .style(&style.avatar_monogram)
            .child(Node::text(monogram(&t.name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget_config::merge_with_defaults;
    use serde_json::json;

    fn testimonial(id: i64, name: &str) -> WidgetTestimonial {
        WidgetTestimonial {
            id,
            name: name.to_string(),
            role: None,
            company: None,
            avatar_url: None,
            text: format!("Testimonial number {id}"),
            source: "form".to_string(),
            source_url: None,
        }
    }

    fn cards(widget: &RenderedWidget) -> Vec<&Node> {
        let mut out = Vec::new();
        widget.tree.find_by_class(CARD_CLASS, &mut out);
        out
    }

    #[test]
    fn monogram_takes_first_two_words() {
        assert_eq!(monogram("Ada Lovelace"), "AL");
        assert_eq!(monogram("Prince"), "P");
        assert_eq!(monogram("grace brewster murray hopper"), "GB");
        assert_eq!(monogram("  ada   lovelace "), "AL");
        assert_eq!(monogram(""), "");
        assert_eq!(monogram("ßob Smith"), "SS");
        assert_eq!(monogram("ﬀ Jones"), "FF");
    }

    #[test]
    fn role_line_joins_present_parts() {
        assert_eq!(
            role_line(Some("CTO"), Some("Acme")).as_deref(),
            Some("CTO at Acme")
        );
        assert_eq!(role_line(Some("CTO"), None).as_deref(), Some("CTO"));
        assert_eq!(role_line(None, Some("Acme")).as_deref(), Some("Acme"));
        assert_eq!(role_line(Some(" "), Some("")), None);
        assert_eq!(role_line(None, None), None);
    }

    #[test]
    fn unknown_source_gets_manual_badge() {
        assert_eq!(source_badge("bogus"), FALLBACK_BADGE);
        assert_eq!(source_badge(""), FALLBACK_BADGE);
        assert_eq!(source_badge("manual").label, "Manual");
        assert_eq!(source_badge("producthunt").label, "Product Hunt");
        assert_eq!(source_badge("twitter").background, "#e0f2fe");
    }

    #[test]
    fn bogus_source_renders_manual_label() {
        let mut t = testimonial(1, "Ada");
        t.source = "bogus".to_string();
        let widget = render(&[t], &WidgetConfig::default());
        let html = widget.to_html();
        assert!(html.contains(">Manual</span>"));
        assert!(html.contains("background:#f3f4f6;color:#374151;"));
    }

    #[test]
    fn truncates_to_max_count_in_caller_order() {
        let all: Vec<_> = (0..50).map(|i| testimonial(50 - i, "Someone")).collect();
        let config = merge_with_defaults(&json!({ "maxCount": 12 }));
        let widget = render(&all, &config);

        assert_eq!(widget.card_count, 12);
        let cards = cards(&widget);
        assert_eq!(cards.len(), 12);
        for (card, expected) in cards.iter().zip(all.iter()) {
            assert!(card.text_content().contains(&expected.text));
        }
        assert!(!widget.to_html().contains("Testimonial number 38"));
    }

    #[test]
    fn fewer_testimonials_than_max_count() {
        let widget = render(&[testimonial(1, "Ada")], &WidgetConfig::default());
        assert_eq!(widget.card_count, 1);
    }

    #[test]
    fn markup_in_fields_is_escaped() {
        let mut t = testimonial(1, "<img src=x onerror=alert(1)>");
        t.text = "<script>alert('x')</script> & more".to_string();
        t.role = Some("\"quoted\"".to_string());
        let html = render(&[t], &WidgetConfig::default()).to_html();

        assert!(!html.contains("<script>"));
        assert!(!html.contains("<img src=x"));
        assert!(html.contains("&lt;script&gt;alert(&#x27;x&#x27;)&lt;&#x2f;script&gt; &amp; more"));
        assert!(html.contains("&quot;quoted&quot;"));
    }

    #[test]
    fn avatar_image_or_monogram() {
        let mut with_avatar = testimonial(1, "Ada Lovelace");
        with_avatar.avatar_url = Some("https://example.com/a.png?x=1&y=\"2\"".to_string());
        let without = testimonial(2, "Ada Lovelace");
        let mut scripted = testimonial(3, "Grace Hopper");
        scripted.avatar_url = Some("javascript:alert(1)".to_string());

        let html = render(&[with_avatar, without, scripted], &WidgetConfig::default()).to_html();
        assert!(html.contains(
            "src=\"https:&#x2f;&#x2f;example.com&#x2f;a.png?x=1&amp;y=&quot;2&quot;\""
        ));
        assert!(html.contains(">AL</div>"));
        assert!(html.contains(">GH</div>"));
        assert!(!html.contains("javascript:"));
    }

    #[test]
    fn content_toggles_hide_elements() {
        let mut t = testimonial(1, "Ada");
        t.role = Some("CTO".to_string());
        let config = merge_with_defaults(&json!({
            "showAvatar": false,
            "showRole": false,
            "showSource": false,
        }));
        let html = render(&[t], &config).to_html();
        assert!(!html.contains("kudos-monogram"));
        assert!(!html.contains("kudos-role"));
        assert!(!html.contains("kudos-source"));
        assert!(html.contains("kudos-name"));
    }

    #[test]
    fn role_line_omitted_when_blank() {
        let html = render(&[testimonial(1, "Ada")], &WidgetConfig::default()).to_html();
        assert!(!html.contains("kudos-role"));
    }

    #[test]
    fn custom_font_is_reported_for_loading() {
        let config = merge_with_defaults(&json!({ "fontFamily": "Inter" }));
        let widget = render(&[], &config);
        assert_eq!(
            widget.font_stylesheet.as_deref(),
            Some("https://fonts.googleapis.com/css2?family=Inter:wght@400;600&display=swap")
        );
        assert_eq!(widget.card_count, 0);
    }

    #[test]
    fn equal_configs_render_identical_markup() {
        let items: Vec<_> = (1..=5).map(|i| testimonial(i, "Ada Lovelace")).collect();
        let preview_config = merge_with_defaults(&json!({ "theme": "dark", "columns": 2 }));
        let stored = serde_json::to_string(&preview_config).unwrap();
        let embed_config: WidgetConfig = serde_json::from_str(&stored).unwrap();

        assert_eq!(
            render(&items, &preview_config).to_html(),
            render(&items, &embed_config).to_html()
        );
    }

    #[test]
    fn style_element_is_not_escaped() {
        let html = render(&[], &WidgetConfig::default()).to_html();
        assert!(html.contains("<style>:host{all:initial;display:block;}.kudos-grid{display:grid;"));
        assert!(html.contains("font-family:-apple-system, BlinkMacSystemFont, &quot;Segoe UI&quot;"));
    }
}
