//! Testimonial sources, validation rules, and the public widget-facing
//! testimonial shape.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CoreError;
use crate::types::DbId;

/// Maximum testimonial body length, in characters.
pub const MAX_TEXT_LEN: usize = 500;

/// Maximum author name length, in characters.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum role / company length, in characters.
pub const MAX_ATTRIBUTION_LEN: usize = 100;

/// Origin channel of a testimonial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Twitter,
    Linkedin,
    Producthunt,
    Form,
    Manual,
}

pub const VALID_SOURCES: &[&str] = &["twitter", "linkedin", "producthunt", "form", "manual"];

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Twitter => "twitter",
            Self::Linkedin => "linkedin",
            Self::Producthunt => "producthunt",
            Self::Form => "form",
            Self::Manual => "manual",
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s.trim().to_ascii_lowercase().as_str() {
            "twitter" => Ok(Self::Twitter),
            "linkedin" => Ok(Self::Linkedin),
            "producthunt" => Ok(Self::Producthunt),
            "form" => Ok(Self::Form),
            "manual" => Ok(Self::Manual),
            other => Err(CoreError::Validation(format!(
                "Invalid source '{other}'. Must be one of: {}",
                VALID_SOURCES.join(", ")
            ))),
        }
    }

    /// Like [`Source::parse`] but maps anything unrecognised to `Manual`.
    pub fn parse_or_manual(s: &str) -> Self {
        Self::parse(s).unwrap_or(Self::Manual)
    }
}

impl std::fmt::Display for Source {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Testimonial fields served to public widgets: no approval flag, no product id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetTestimonial {
    pub id: DbId,
    pub name: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    pub text: String,
    /// Kept as a raw string: rows written before a source existed still render.
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub source_url: Option<String>,
}

/// Candidate testimonial fields before persistence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TestimonialInput {
    pub name: String,
    pub role: Option<String>,
    pub company: Option<String>,
    pub avatar_url: Option<String>,
    pub text: String,
    pub source: Option<String>,
    pub source_url: Option<String>,
}

/// Validated, normalized testimonial fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidTestimonial {
    pub name: String,
    pub role: Option<String>,
    pub company: Option<String>,
    pub avatar_url: Option<String>,
    pub text: String,
    pub source: Source,
    pub source_url: Option<String>,
}

/// Trim a value and collapse empty strings to `None`.
pub fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// `true` when `s` parses as an absolute `http` or `https` URL.
pub fn is_http_url(s: &str) -> bool {
    Url::parse(s)
        .map(|u| matches!(u.scheme(), "http" | "https"))
        .unwrap_or(false)
}

/// Validate and normalize testimonial input.
///
/// `default_source` is used when the input carries no source.
pub fn validate_new_testimonial(
    input: &TestimonialInput,
    default_source: Source,
) -> Result<ValidTestimonial, CoreError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(CoreError::Validation("Name must not be empty".to_string()));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(CoreError::Validation(format!(
            "Name too long (max {MAX_NAME_LEN} characters)"
        )));
    }

    let text = input.text.trim();
    if text.is_empty() {
        return Err(CoreError::Validation(
            "Testimonial text must not be empty".to_string(),
        ));
    }
    if text.chars().count() > MAX_TEXT_LEN {
        return Err(CoreError::Validation(format!(
            "Testimonial text too long (max {MAX_TEXT_LEN} characters)"
        )));
    }

    let role = non_empty(input.role.as_deref());
    let company = non_empty(input.company.as_deref());
    for (field, value) in [("Role", &role), ("Company", &company)] {
        if value.as_ref().is_some_and(|v| v.chars().count() > MAX_ATTRIBUTION_LEN) {
            return Err(CoreError::Validation(format!(
                "{field} too long (max {MAX_ATTRIBUTION_LEN} characters)"
            )));
        }
    }

    let avatar_url = non_empty(input.avatar_url.as_deref());
    let source_url = non_empty(input.source_url.as_deref());
    for (field, value) in [("avatar_url", &avatar_url), ("source_url", &source_url)] {
        if value.as_deref().is_some_and(|v| !is_http_url(v)) {
            return Err(CoreError::Validation(format!(
                "{field} must be an http(s) URL"
            )));
        }
    }

    let source = match non_empty(input.source.as_deref()) {
        Some(s) => Source::parse(&s)?,
        None => default_source,
    };

    Ok(ValidTestimonial {
        name: name.to_string(),
        role,
        company,
        avatar_url,
        text: text.to_string(),
        source,
        source_url,
    })
}

/// Truncate to at most `max` characters on a char boundary.
pub fn truncate_chars(s: &str, max: usize) -> String {
    match s.char_indices().nth(max) {
        Some((idx, _)) => s[..idx].to_string(),
        None => s.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn input(name: &str, text: &str) -> TestimonialInput {
        TestimonialInput {
            name: name.to_string(),
            text: text.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn valid_input_is_trimmed_and_defaulted() {
        let mut i = input("  Ada Lovelace ", " Great product ");
        i.role = Some("   ".to_string());
        i.company = Some(" Analytical Engines ".to_string());

        let v = validate_new_testimonial(&i, Source::Form).unwrap();
        assert_eq!(v.name, "Ada Lovelace");
        assert_eq!(v.text, "Great product");
        assert_eq!(v.role, None);
        assert_eq!(v.company.as_deref(), Some("Analytical Engines"));
        assert_eq!(v.source, Source::Form);
    }

    #[test]
    fn blank_name_or_text_is_rejected() {
        assert_matches!(
            validate_new_testimonial(&input(" ", "text"), Source::Form),
            Err(CoreError::Validation(_))
        );
        assert_matches!(
            validate_new_testimonial(&input("Ada", ""), Source::Form),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn text_limit_counts_characters_not_bytes() {
        let at_limit = "é".repeat(MAX_TEXT_LEN);
        assert!(validate_new_testimonial(&input("Ada", &at_limit), Source::Form).is_ok());

        let over = "a".repeat(MAX_TEXT_LEN + 1);
        assert_matches!(
            validate_new_testimonial(&input("Ada", &over), Source::Form),
            Err(CoreError::Validation(msg)) if msg.contains("500")
        );
    }

    #[test]
    fn urls_must_be_http() {
        let mut i = input("Ada", "Hi");
        i.avatar_url = Some("javascript:alert(1)".to_string());
        assert_matches!(
            validate_new_testimonial(&i, Source::Manual),
            Err(CoreError::Validation(msg)) if msg.contains("avatar_url")
        );

        i.avatar_url = Some("https://example.com/a.png".to_string());
        assert!(validate_new_testimonial(&i, Source::Manual).is_ok());
    }

    #[test]
    fn explicit_source_is_validated() {
        let mut i = input("Ada", "Hi");
        i.source = Some("Twitter".to_string());
        assert_eq!(
            validate_new_testimonial(&i, Source::Manual).unwrap().source,
            Source::Twitter
        );

        i.source = Some("myspace".to_string());
        assert!(validate_new_testimonial(&i, Source::Manual).is_err());
    }

    #[test]
    fn parse_or_manual_falls_back() {
        assert_eq!(Source::parse_or_manual("producthunt"), Source::Producthunt);
        assert_eq!(Source::parse_or_manual("bogus"), Source::Manual);
        assert_eq!(Source::parse_or_manual(""), Source::Manual);
    }

    #[test]
    fn source_serializes_lowercase() {
        assert_eq!(
            serde_json::to_value(Source::Producthunt).unwrap(),
            serde_json::json!("producthunt")
        );
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }
}
