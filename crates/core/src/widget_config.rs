//! Widget configuration model: the canonical style/content settings for an
//! embeddable testimonial widget.
//!
//! The model is pure data. Every field has a total default, and any partial
//! JSON object (from storage, from the authoring UI, from a patch request) can
//! be merged over a base configuration without failing:
//!
//! - unknown keys are dropped,
//! - missing or `null` keys keep the base value,
//! - numbers are rounded and clamped into their valid interval,
//! - enum strings outside the domain coerce to the medium/normal entry,
//! - malformed colors keep the base value,
//! - fonts outside [`FONT_ALLOWLIST`] fall back to [`DEFAULT_FONT`].
//!
//! Because [`WidgetConfig`] deserializes through [`merge_with_defaults`],
//! every `WidgetConfig` value in the program is fully defaulted and in range.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ── Constants ────────────────────────────────────────────────────────

/// Font name meaning "use the platform UI font stack, load nothing".
pub const DEFAULT_FONT: &str = "System UI";

/// Fonts an operator may pick. Everything except [`DEFAULT_FONT`] is loaded
/// from the Google Fonts CSS API at render time.
pub const FONT_ALLOWLIST: &[&str] = &[
    DEFAULT_FONT,
    "Inter",
    "DM Sans",
    "Lora",
    "Merriweather",
    "Playfair Display",
    "Nunito",
    "Raleway",
];

pub const MIN_COLUMNS: u8 = 1;
pub const MAX_COLUMNS: u8 = 3;
pub const MIN_MAX_COUNT: u8 = 1;
pub const MAX_MAX_COUNT: u8 = 50;
pub const MIN_BORDER_RADIUS: u8 = 0;
pub const MAX_BORDER_RADIUS: u8 = 24;

/// Keyword accepted by the background/text color fields in place of a hex value.
pub const TRANSPARENT: &str = "transparent";

// ── Enumerated fields ────────────────────────────────────────────────

/// Declares a lowercase string enum with a designated fallback variant used
/// when a stored or submitted value is outside the domain.
macro_rules! config_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal),+ $(,)? } fallback $fallback:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            /// Variant substituted for out-of-domain values.
            pub const FALLBACK: Self = Self::$fallback;

            /// All variants in declaration order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            /// Parse a case-insensitive, whitespace-trimmed value.
            pub fn parse(s: &str) -> Option<Self> {
                let s = s.trim().to_ascii_lowercase();
                match s.as_str() {
                    $($text => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Parse, substituting [`Self::FALLBACK`] for unknown values.
            pub fn parse_or_fallback(s: &str) -> Self {
                Self::parse(s).unwrap_or(Self::FALLBACK)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

config_enum! {
    /// Card color scheme. Switching it rewrites the palette fields.
    Theme { Light => "light", Dark => "dark" } fallback Light
}

config_enum! {
    /// Space between grid cells.
    Gap { Sm => "sm", Md => "md", Lg => "lg" } fallback Md
}

config_enum! {
    /// Inner padding of each card.
    CardPadding { Compact => "compact", Normal => "normal", Spacious => "spacious" } fallback Normal
}

config_enum! {
    /// Card drop shadow depth.
    Shadow { None => "none", Sm => "sm", Md => "md", Lg => "lg" } fallback Md
}

config_enum! {
    /// Testimonial body text size.
    FontSize { Sm => "sm", Md => "md", Lg => "lg" } fallback Md
}

// ── Theme palettes ───────────────────────────────────────────────────

/// The six color fields a theme switch rewrites.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemePalette {
    pub card_bg: &'static str,
    pub text_color: &'static str,
    pub name_color: &'static str,
    pub muted_color: &'static str,
    pub card_border_color: &'static str,
    pub widget_bg: &'static str,
}

pub const LIGHT_PALETTE: ThemePalette = ThemePalette {
    card_bg: "#ffffff",
    text_color: "#374151",
    name_color: "#111827",
    muted_color: "#9ca3af",
    card_border_color: "#e5e7eb",
    widget_bg: TRANSPARENT,
};

pub const DARK_PALETTE: ThemePalette = ThemePalette {
    card_bg: "#1f2937",
    text_color: "#d1d5db",
    name_color: "#f9fafb",
    muted_color: "#6b7280",
    card_border_color: "#374151",
    widget_bg: TRANSPARENT,
};

impl Theme {
    pub fn palette(&self) -> ThemePalette {
        match self {
            Theme::Light => LIGHT_PALETTE,
            Theme::Dark => DARK_PALETTE,
        }
    }
}

// ── WidgetConfig ─────────────────────────────────────────────────────

/// Complete widget configuration. Serialized with camelCase keys, which is
/// the shape stored in `widgets.config` and served by `GET /widget/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "serde_json::Value")]
pub struct WidgetConfig {
    // Layout
    pub columns: u8,
    pub gap: Gap,
    pub max_count: u8,

    // Card style
    pub theme: Theme,
    pub card_padding: CardPadding,
    pub border_radius: u8,
    pub shadow: Shadow,
    pub show_border: bool,
    pub card_border_color: String,

    // Colors
    pub card_bg: String,
    pub text_color: String,
    pub name_color: String,
    pub muted_color: String,
    pub widget_bg: String,

    // Typography
    pub font_family: String,
    pub body_font_size: FontSize,

    // Content toggles
    pub show_avatar: bool,
    pub show_role: bool,
    pub show_source: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        let palette = LIGHT_PALETTE;
        Self {
            columns: 3,
            gap: Gap::Md,
            max_count: 12,
            theme: Theme::Light,
            card_padding: CardPadding::Normal,
            border_radius: 12,
            shadow: Shadow::Sm,
            show_border: true,
            card_border_color: palette.card_border_color.to_string(),
            card_bg: palette.card_bg.to_string(),
            text_color: palette.text_color.to_string(),
            name_color: palette.name_color.to_string(),
            muted_color: palette.muted_color.to_string(),
            widget_bg: palette.widget_bg.to_string(),
            font_family: DEFAULT_FONT.to_string(),
            body_font_size: FontSize::Md,
            show_avatar: true,
            show_role: true,
            show_source: true,
        }
    }
}

impl WidgetConfig {
    /// Switch the theme and rewrite the palette fields to match it.
    ///
    /// The palette fields stay independently editable afterwards.
    pub fn set_theme(&mut self, theme: Theme) {
        let palette = theme.palette();
        self.theme = theme;
        self.card_bg = palette.card_bg.to_string();
        self.text_color = palette.text_color.to_string();
        self.name_color = palette.name_color.to_string();
        self.muted_color = palette.muted_color.to_string();
        self.card_border_color = palette.card_border_color.to_string();
        self.widget_bg = palette.widget_bg.to_string();
    }

    /// Builder-style variant of [`WidgetConfig::set_theme`].
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.set_theme(theme);
        self
    }

    /// Whether the configured font needs an external stylesheet.
    pub fn uses_custom_font(&self) -> bool {
        self.font_family != DEFAULT_FONT
    }
}

impl From<Value> for WidgetConfig {
    fn from(value: Value) -> Self {
        merge_with_defaults(&value)
    }
}

// ── Merge ────────────────────────────────────────────────────────────

/// Build a complete configuration from an arbitrary (possibly partial or
/// malformed) JSON value. Never fails.
pub fn merge_with_defaults(partial: &Value) -> WidgetConfig {
    merge_over(&WidgetConfig::default(), partial)
}

/// Apply a partial JSON object on top of `base`, field by field.
///
/// If the partial names a `theme`, that theme's palette is applied first so
/// explicit color keys in the same partial still win.
pub fn merge_over(base: &WidgetConfig, partial: &Value) -> WidgetConfig {
    let mut config = base.clone();
    let Some(obj) = partial.as_object() else {
        return config;
    };

    if let Some(theme) = read_enum(obj, "theme", Theme::parse_or_fallback) {
        config.set_theme(theme);
    }

    // Layout
    if let Some(n) = read_clamped(obj, "columns", MIN_COLUMNS, MAX_COLUMNS) {
        config.columns = n;
    }
    if let Some(gap) = read_enum(obj, "gap", Gap::parse_or_fallback) {
        config.gap = gap;
    }
    if let Some(n) = read_clamped(obj, "maxCount", MIN_MAX_COUNT, MAX_MAX_COUNT) {
        config.max_count = n;
    }

    // Card style
    if let Some(padding) = read_enum(obj, "cardPadding", CardPadding::parse_or_fallback) {
        config.card_padding = padding;
    }
    if let Some(n) = read_clamped(obj, "borderRadius", MIN_BORDER_RADIUS, MAX_BORDER_RADIUS) {
        config.border_radius = n;
    }
    if let Some(shadow) = read_enum(obj, "shadow", Shadow::parse_or_fallback) {
        config.shadow = shadow;
    }
    if let Some(b) = read_bool(obj, "showBorder") {
        config.show_border = b;
    }
    if let Some(c) = read_color(obj, "cardBorderColor", false) {
        config.card_border_color = c;
    }

    // Colors
    if let Some(c) = read_color(obj, "cardBg", true) {
        config.card_bg = c;
    }
    if let Some(c) = read_color(obj, "textColor", true) {
        config.text_color = c;
    }
    if let Some(c) = read_color(obj, "nameColor", true) {
        config.name_color = c;
    }
    if let Some(c) = read_color(obj, "mutedColor", true) {
        config.muted_color = c;
    }
    if let Some(c) = read_color(obj, "widgetBg", true) {
        config.widget_bg = c;
    }

    // Typography
    if let Some(v) = present(obj, "fontFamily") {
        config.font_family = v
            .as_str()
            .and_then(canonical_font)
            .unwrap_or(DEFAULT_FONT)
            .to_string();
    }
    if let Some(size) = read_enum(obj, "bodyFontSize", FontSize::parse_or_fallback) {
        config.body_font_size = size;
    }

    // Content toggles
    if let Some(b) = read_bool(obj, "showAvatar") {
        config.show_avatar = b;
    }
    if let Some(b) = read_bool(obj, "showRole") {
        config.show_role = b;
    }
    if let Some(b) = read_bool(obj, "showSource") {
        config.show_source = b;
    }

    config
}

/// Return the allowlisted spelling of `name` (case-insensitive), if any.
pub fn canonical_font(name: &str) -> Option<&'static str> {
    let name = name.trim();
    FONT_ALLOWLIST
        .iter()
        .copied()
        .find(|f| f.eq_ignore_ascii_case(name))
}

/// `#rgb`, `#rgba`, `#rrggbb` or `#rrggbbaa`.
pub fn is_color_hex(s: &str) -> bool {
    let Some(hex) = s.strip_prefix('#') else {
        return false;
    };
    matches!(hex.len(), 3 | 4 | 6 | 8) && hex.chars().all(|c| c.is_ascii_hexdigit())
}

fn present<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    obj.get(key).filter(|v| !v.is_null())
}

fn read_enum<T>(obj: &Map<String, Value>, key: &str, parse: fn(&str) -> T) -> Option<T> {
    // Non-string values are as out-of-domain as unknown strings.
    present(obj, key).map(|v| parse(v.as_str().unwrap_or_default()))
}

fn read_clamped(obj: &Map<String, Value>, key: &str, min: u8, max: u8) -> Option<u8> {
    let n = match present(obj, key)? {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !n.is_finite() {
        return None;
    }
    Some(n.round().clamp(f64::from(min), f64::from(max)) as u8)
}

fn read_bool(obj: &Map<String, Value>, key: &str) -> Option<bool> {
    present(obj, key)?.as_bool()
}

fn read_color(obj: &Map<String, Value>, key: &str, allow_transparent: bool) -> Option<String> {
    let s = present(obj, key)?.as_str()?.trim();
    if allow_transparent && s.eq_ignore_ascii_case(TRANSPARENT) {
        return Some(TRANSPARENT.to_string());
    }
    is_color_hex(s).then(|| s.to_ascii_lowercase())
}
