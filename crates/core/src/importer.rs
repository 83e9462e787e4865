//! Import normalizer: turn a pasted URL into an [`ImportDraft`] the operator
//! reviews before it becomes a testimonial.
//!
//! Flow: URL submitted -> source detected -> extraction attempted -> draft
//! returned, or the bare `{source, source_url}` fallback when extraction
//! fails. Upstream failures and malformed URLs never surface as errors; only
//! a blank URL does.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::CoreError;
use crate::html_entities::named_entity;
use crate::testimonial::{non_empty, truncate_chars, Source, MAX_TEXT_LEN};

// ── Constants ────────────────────────────────────────────────────────

pub const TWITTER_OEMBED_ENDPOINT: &str = "https://publish.twitter.com/oembed";

pub const UNAVATAR_TWITTER_BASE: &str = "https://unavatar.io/twitter";

/// User agent sent when fetching listing pages.
pub const IMPORT_USER_AGENT: &str = "Mozilla/5.0 (compatible; Kudos/1.0)";

static PARAGRAPH_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<p\b[^>]*>(.*?)</p>").expect("valid regex"));

static BLOCKQUOTE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<blockquote\b[^>]*>(.*?)</blockquote>").expect("valid regex")
});

static BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("valid regex"));

static TAG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid regex"));

static META_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<meta\b[^>]*>").expect("valid regex"));

static ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)([A-Za-z_:][-A-Za-z0-9_:.]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#)
        .expect("valid regex")
});

static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&(#[0-9]+|#[xX][0-9a-fA-F]+|[A-Za-z]+);").expect("valid regex"));

// ── Types ────────────────────────────────────────────────────────────

/// Failure talking to an external page or API.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request failed: {0}")]
    Transport(String),

    #[error("Upstream returned HTTP {0}")]
    Status(u16),

    #[error("Unreadable response: {0}")]
    Decode(String),
}

/// Network access used by the source handlers.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// GET `url` and decode the body as JSON. Non-2xx is an error.
    async fn fetch_json(&self, url: &Url) -> Result<serde_json::Value, FetchError>;

    /// GET `url` with the given user agent and return the body. Non-2xx is
    /// an error.
    async fn fetch_html(&self, url: &Url, user_agent: &str) -> Result<String, FetchError>;
}

/// Candidate testimonial fields extracted from a URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    pub source: Source,
    pub source_url: String,
}

impl ImportDraft {
    /// Draft carrying only the detected source and the original URL.
    pub fn bare(source: Source, source_url: &str) -> Self {
        Self {
            name: None,
            role: None,
            company: None,
            avatar_url: None,
            text: None,
            source,
            source_url: source_url.to_string(),
        }
    }
}

/// Known import sources, in detection order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceHandler {
    Twitter,
    LinkedIn,
    ProductHunt,
    Unknown,
}

impl SourceHandler {
    /// Match the URL's host against each source's domain or its subdomains.
    pub fn detect(url: &Url) -> Self {
        let host = url.host_str().unwrap_or_default().to_ascii_lowercase();
        let on = |domain: &str| {
            host == domain
                || host
                    .strip_suffix(domain)
                    .is_some_and(|prefix| prefix.ends_with('.'))
        };
        if on("twitter.com") || on("x.com") {
            Self::Twitter
        } else if on("linkedin.com") {
            Self::LinkedIn
        } else if on("producthunt.com") {
            Self::ProductHunt
        } else {
            Self::Unknown
        }
    }

    pub fn source(self) -> Source {
        match self {
            Self::Twitter => Source::Twitter,
            Self::LinkedIn => Source::Linkedin,
            Self::ProductHunt => Source::Producthunt,
            Self::Unknown => Source::Manual,
        }
    }

    async fn extract(
        self,
        url: &Url,
        raw: &str,
        fetcher: &(impl PageFetcher + ?Sized),
    ) -> Result<ImportDraft, FetchError> {
        match self {
            Self::Twitter => extract_twitter(url, raw, fetcher).await,
            Self::ProductHunt => extract_product_hunt(url, raw, fetcher).await,
            Self::LinkedIn | Self::Unknown => Ok(ImportDraft::bare(self.source(), raw)),
        }
    }
}

// ── Normalization ────────────────────────────────────────────────────

/// Parse a pasted URL, assuming `https://` when the scheme is missing.
fn parse_pasted(raw: &str) -> Option<Url> {
    match Url::parse(raw) {
        Ok(url) => Some(url),
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("https://{raw}")).ok()
        }
        Err(_) => None,
    }
}

/// Detect the source of `raw` and extract what can be extracted.
///
/// Returns `CoreError::Validation` only for a blank URL. A URL that cannot
/// be parsed, or is not http(s), yields a bare draft without any fetch.
pub async fn normalize_url(
    raw: &str,
    fetcher: &(impl PageFetcher + ?Sized),
) -> Result<ImportDraft, CoreError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CoreError::Validation("url is required".to_string()));
    }
    let url = match parse_pasted(raw) {
        Some(url) if matches!(url.scheme(), "http" | "https") => url,
        Some(url) => {
            let source = SourceHandler::detect(&url).source();
            tracing::debug!(url = raw, %source, "Non-http import URL, returning bare draft");
            return Ok(ImportDraft::bare(source, raw));
        }
        None => {
            tracing::debug!(url = raw, "Unparseable import URL, returning bare draft");
            return Ok(ImportDraft::bare(Source::Manual, raw));
        }
    };

    let handler = SourceHandler::detect(&url);
    let mut draft = match handler.extract(&url, raw, fetcher).await {
        Ok(draft) => draft,
        Err(e) => {
            tracing::warn!(url = raw, source = %handler.source(), error = %e, "Import extraction failed, returning bare draft");
            ImportDraft::bare(handler.source(), raw)
        }
    };

    if let Some(text) = draft.text.as_mut() {
        if text.chars().count() > MAX_TEXT_LEN {
            *text = truncate_chars(text, MAX_TEXT_LEN);
        }
    }
    Ok(draft)
}

async fn extract_twitter(
    url: &Url,
    raw: &str,
    fetcher: &(impl PageFetcher + ?Sized),
) -> Result<ImportDraft, FetchError> {
    let mut endpoint =
        Url::parse(TWITTER_OEMBED_ENDPOINT).map_err(|e| FetchError::Transport(e.to_string()))?;
    endpoint
        .query_pairs_mut()
        .append_pair("url", url.as_str())
        .append_pair("omit_script", "true");

    let oembed = fetcher.fetch_json(&endpoint).await?;
    let embed_html = oembed
        .get("html")
        .and_then(|v| v.as_str())
        .unwrap_or_default();

    let text = first_match_text(&PARAGRAPH_RE, embed_html)
        .or_else(|| first_match_text(&BLOCKQUOTE_RE, embed_html));

    let avatar_url = url
        .path_segments()
        .and_then(|mut segments| segments.next())
        .filter(|handle| !handle.is_empty())
        .map(|handle| format!("{UNAVATAR_TWITTER_BASE}/{handle}"));

    Ok(ImportDraft {
        name: non_empty(oembed.get("author_name").and_then(|v| v.as_str())),
        avatar_url,
        text,
        ..ImportDraft::bare(Source::Twitter, raw)
    })
}

async fn extract_product_hunt(
    url: &Url,
    raw: &str,
    fetcher: &(impl PageFetcher + ?Sized),
) -> Result<ImportDraft, FetchError> {
    let html = fetcher.fetch_html(url, IMPORT_USER_AGENT).await?;

    Ok(ImportDraft {
        name: meta_property(&html, "og:title"),
        text: meta_property(&html, "og:description"),
        ..ImportDraft::bare(Source::Producthunt, raw)
    })
}

// ── HTML helpers ─────────────────────────────────────────────────────

/// Text content of the first match of `re`, tags stripped and entities
/// decoded. `None` when there is no match or it is blank.
fn first_match_text(re: &Regex, html: &str) -> Option<String> {
    let inner = re.captures(html)?.get(1)?.as_str();
    non_empty(Some(&html_to_text(inner)))
}

/// Strip tags and decode entities. `<br>` becomes a newline.
pub fn html_to_text(fragment: &str) -> String {
    let with_breaks = BREAK_RE.replace_all(fragment, "\n");
    let stripped = TAG_RE.replace_all(&with_breaks, "");
    decode_entities(&stripped)
}

/// `content` of the first `<meta property="{property}">` (or `name=`).
pub fn meta_property(html: &str, property: &str) -> Option<String> {
    META_RE.find_iter(html).find_map(|tag| {
        let mut key = None;
        let mut content = None;
        for caps in ATTR_RE.captures_iter(tag.as_str()) {
            let value = caps.get(2).or_else(|| caps.get(3)).map(|m| m.as_str());
            match caps[1].to_ascii_lowercase().as_str() {
                "property" | "name" => key = value,
                "content" => content = value,
                _ => {}
            }
        }
        if key.is_some_and(|k| k.eq_ignore_ascii_case(property)) {
            non_empty(content.map(decode_entities).as_deref())
        } else {
            None
        }
    })
}

pub fn decode_entities(s: &str) -> String {
    ENTITY_RE
        .replace_all(s, |caps: &regex::Captures| {
            let entity = &caps[1];
            let decoded = if let Some(hex) = entity
                .strip_prefix("#x")
                .or_else(|| entity.strip_prefix("#X"))
            {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            } else if let Some(dec) = entity.strip_prefix('#') {
                dec.parse::<u32>().ok().and_then(char::from_u32)
            } else {
                named_entity(entity)
            };
            decoded.map_or_else(|| caps[0].to_string(), String::from)
        })
        .into_owned()
}
