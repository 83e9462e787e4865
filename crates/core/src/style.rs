//! Style resolver: maps a [`WidgetConfig`] to concrete CSS declarations.
//!
//! This is a pure function of the configuration. The authoring preview and
//! the embedded loader both render through it, so for equal configurations
//! they produce byte-identical markup.

use crate::widget_config::{CardPadding, FontSize, Gap, Shadow, WidgetConfig, DEFAULT_FONT};

// ── Lookup tables ────────────────────────────────────────────────────

pub const PADDING_TABLE: &[(CardPadding, &str)] = &[
    (CardPadding::Compact, "12px"),
    (CardPadding::Normal, "20px"),
    (CardPadding::Spacious, "32px"),
];

pub const GAP_TABLE: &[(Gap, &str)] = &[(Gap::Sm, "8px"), (Gap::Md, "16px"), (Gap::Lg, "24px")];

pub const FONT_SIZE_TABLE: &[(FontSize, &str)] = &[
    (FontSize::Sm, "13px"),
    (FontSize::Md, "15px"),
    (FontSize::Lg, "17px"),
];

pub const SHADOW_TABLE: &[(Shadow, &str)] = &[
    (Shadow::None, "none"),
    (Shadow::Sm, "0 1px 3px rgba(0,0,0,0.1)"),
    (
        Shadow::Md,
        "0 4px 6px rgba(0,0,0,0.1), 0 2px 4px rgba(0,0,0,0.06)",
    ),
    (
        Shadow::Lg,
        "0 10px 15px rgba(0,0,0,0.15), 0 4px 6px rgba(0,0,0,0.1)",
    ),
];

/// Font stack used when no custom font is configured.
pub const SYSTEM_FONT_STACK: &str =
    "-apple-system, BlinkMacSystemFont, \"Segoe UI\", Roboto, sans-serif";

/// Class name of the grid element; the responsive rule targets it.
pub const GRID_CLASS: &str = "kudos-grid";

/// Below this viewport width the grid collapses to one column.
pub const MOBILE_BREAKPOINT_PX: u32 = 768;

const GOOGLE_FONTS_CSS_URL: &str = "https://fonts.googleapis.com/css2";

/// Look `key` up in a constant table, falling back to the `fallback` entry.
fn lookup<K: PartialEq + Copy>(table: &[(K, &'static str)], key: K, fallback: K) -> &'static str {
    table
        .iter()
        .find(|(k, _)| *k == key)
        .or_else(|| table.iter().find(|(k, _)| *k == fallback))
        .map(|(_, v)| *v)
        .unwrap_or_default()
}

pub fn padding_value(padding: CardPadding) -> &'static str {
    lookup(PADDING_TABLE, padding, CardPadding::FALLBACK)
}

pub fn gap_value(gap: Gap) -> &'static str {
    lookup(GAP_TABLE, gap, Gap::FALLBACK)
}

pub fn font_size_value(size: FontSize) -> &'static str {
    lookup(FONT_SIZE_TABLE, size, FontSize::FALLBACK)
}

pub fn shadow_value(shadow: Shadow) -> &'static str {
    lookup(SHADOW_TABLE, shadow, Shadow::FALLBACK)
}

// ── Declarations ─────────────────────────────────────────────────────

/// An ordered list of CSS `property: value` pairs.
///
/// Order is preserved so serialization is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Declarations(Vec<(&'static str, String)>);

impl Declarations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, property: &'static str, value: impl Into<String>) -> Self {
        self.0.push((property, value.into()));
        self
    }

    pub fn push(&mut self, property: &'static str, value: impl Into<String>) {
        self.0.push((property, value.into()));
    }

    pub fn get(&self, property: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(p, _)| *p == property)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(p, v)| (*p, v.as_str()))
    }

    /// Serialize as an inline `style` attribute value: `a:b;c:d;`.
    pub fn to_css(&self) -> String {
        let mut out = String::new();
        for (property, value) in &self.0 {
            out.push_str(property);
            out.push(':');
            out.push_str(value);
            out.push(';');
        }
        out
    }
}

// ── ResolvedStyle ────────────────────────────────────────────────────

/// Concrete presentational values for every widget element.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedStyle {
    pub container: Declarations,
    pub grid: Declarations,
    pub card: Declarations,
    pub avatar_wrapper: Declarations,
    pub avatar_image: Declarations,
    pub avatar_monogram: Declarations,
    pub body: Declarations,
    pub name: Declarations,
    pub role: Declarations,
    pub badge: Declarations,
    /// Full `font-family` value applied to the container.
    pub font_stack: String,
    /// External stylesheet to load for a custom font.
    pub font_stylesheet: Option<String>,
    /// Contents of the widget's `<style>` element: the host reset, the grid
    /// and the responsive rule.
    pub stylesheet: String,
}

/// Stops inherited properties on the host page from reaching the shadow
/// tree. Matches nothing outside a shadow root.
pub const HOST_RESET: &str = ":host{all:initial;display:block;}";

/// Resolve a fully-defaulted configuration into concrete style values.
pub fn resolve_style(config: &WidgetConfig) -> ResolvedStyle {
    let font_stack = font_stack(config);

    let container = Declarations::new()
        .with("background", config.widget_bg.as_str())
        .with("font-family", font_stack.as_str());

    let grid = Declarations::new()
        .with("display", "grid")
        .with(
            "grid-template-columns",
            format!("repeat({}, minmax(0, 1fr))", config.columns),
        )
        .with("gap", gap_value(config.gap));

    let border = if config.show_border {
        format!("1px solid {}", config.card_border_color)
    } else {
        "none".to_string()
    };

    let card = Declarations::new()
        .with("box-sizing", "border-box")
        .with("background", config.card_bg.as_str())
        .with("color", config.text_color.as_str())
        .with("border-radius", format!("{}px", config.border_radius))
        .with("padding", padding_value(config.card_padding))
        .with("border", border)
        .with("box-shadow", shadow_value(config.shadow));

    let avatar_wrapper = Declarations::new().with("margin-bottom", "8px");

    let avatar_image = Declarations::new()
        .with("width", "32px")
        .with("height", "32px")
        .with("border-radius", "50%")
        .with("object-fit", "cover");

    let avatar_monogram = Declarations::new()
        .with("width", "32px")
        .with("height", "32px")
        .with("border-radius", "50%")
        .with("background", "#e0e7ff")
        .with("color", "#4f46e5")
        .with("display", "flex")
        .with("align-items", "center")
        .with("justify-content", "center")
        .with("font-size", "12px")
        .with("font-weight", "600");

    let body = Declarations::new()
        .with("font-size", font_size_value(config.body_font_size))
        .with("line-height", "1.5")
        .with("margin", "0 0 8px 0")
        .with("color", config.text_color.as_str());

    let name = Declarations::new()
        .with("font-size", "14px")
        .with("font-weight", "600")
        .with("margin", "0")
        .with("color", config.name_color.as_str());

    let role = Declarations::new()
        .with("font-size", "12px")
        .with("color", config.muted_color.as_str())
        .with("margin", "0");

    let badge = Declarations::new()
        .with("display", "inline-block")
        .with("margin-top", "8px")
        .with("padding", "2px 8px")
        .with("border-radius", "9999px")
        .with("font-size", "11px")
        .with("font-weight", "500");

    let stylesheet = format!(
        "{HOST_RESET}.{GRID_CLASS}{{{}}}@media (max-width: {MOBILE_BREAKPOINT_PX}px){{.{GRID_CLASS}{{grid-template-columns:1fr !important;}}}}",
        grid.to_css()
    );

    ResolvedStyle {
        container,
        grid,
        card,
        avatar_wrapper,
        avatar_image,
        avatar_monogram,
        body,
        name,
        role,
        badge,
        font_stack,
        font_stylesheet: font_stylesheet_url(config),
        stylesheet,
    }
}

/// The CSS `font-family` value for a configuration.
pub fn font_stack(config: &WidgetConfig) -> String {
    if config.uses_custom_font() {
        format!("\"{}\", system-ui, sans-serif", config.font_family)
    } else {
        SYSTEM_FONT_STACK.to_string()
    }
}

/// Google Fonts stylesheet URL for the configured font, or `None` for the
/// system font.
pub fn font_stylesheet_url(config: &WidgetConfig) -> Option<String> {
    if config.font_family == DEFAULT_FONT {
        return None;
    }
    let family = config.font_family.trim().replace(' ', "+");
    Some(format!(
        "{GOOGLE_FONTS_CSS_URL}?family={family}:wght@400;600&display=swap"
    ))
}
