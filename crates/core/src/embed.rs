//! Embed loader state machine.
//!
//! Finds embed anchors on a host page, fetches each widget's
//! `{config, testimonials}` bundle, renders it with [`crate::render::render`]
//! and mounts the markup into an isolated boundary supplied by the host.
//!
//! The loader owns its state explicitly instead of tagging DOM nodes:
//!
//! - a set of processed anchor ids, claimed synchronously before any fetch,
//!   so repeated scans and bursts of insertion events never mount twice;
//! - a set of font stylesheet URLs already requested, so a page with many
//!   widgets inserts each `<link>` once.
//!
//! The browser specifics (document queries, shadow roots, `fetch`,
//! `MutationObserver`) live behind [`WidgetFetcher`], [`MountHost`] and
//! [`InsertionFeed`], which keeps this module testable without a document.
//! Failures are logged and reported as [`MountOutcome::Failed`]; nothing is
//! ever propagated to the host page.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashSet};
use std::rc::Rc;

use async_trait::async_trait;
use futures::future::{join_all, LocalBoxFuture};
use serde::{Deserialize, Serialize};

use crate::render::render;
use crate::testimonial::WidgetTestimonial;
use crate::widget_config::WidgetConfig;

/// Attribute carrying the widget identifier on an embed anchor.
pub const WIDGET_ANCHOR_ATTR: &str = "data-kudos-widget";

/// CSS selector matching embed anchors.
pub const WIDGET_ANCHOR_SELECTOR: &str = "[data-kudos-widget]";

/// Longest widget identifier the loader will request.
const MAX_WIDGET_ID_LEN: usize = 64;

// ── Types ────────────────────────────────────────────────────────────

/// Host-assigned identity of an anchor element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnchorId(pub u64);

/// A candidate anchor reported by a scan or an insertion event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Anchor {
    pub id: AnchorId,
    /// Value of [`WIDGET_ANCHOR_ATTR`], if present.
    pub widget_id: Option<String>,
}

impl Anchor {
    pub fn new(id: u64, widget_id: impl Into<String>) -> Self {
        Self {
            id: AnchorId(id),
            widget_id: Some(widget_id.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductSummary {
    pub name: String,
}

/// Payload of `GET /widget/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetBundle {
    #[serde(default)]
    pub config: WidgetConfig,
    #[serde(default)]
    pub testimonials: Vec<WidgetTestimonial>,
    #[serde(default)]
    pub product: ProductSummary,
}

#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("Widget fetch failed: {0}")]
    Fetch(String),

    #[error("Widget {0} not found")]
    NotFound(String),

    #[error("Invalid widget payload: {0}")]
    Payload(String),

    #[error("Mount failed: {0}")]
    Mount(String),
}

/// Result of one anchor's mount attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountOutcome {
    Mounted { cards: usize },
    Failed(String),
}

// ── Host seams ───────────────────────────────────────────────────────

/// Fetches widget bundles from the backend.
#[async_trait(?Send)]
pub trait WidgetFetcher {
    async fn fetch_widget(&self, widget_id: &str) -> Result<WidgetBundle, EmbedError>;
}

/// Page-side effects: isolated mounting and stylesheet insertion.
pub trait MountHost {
    /// Replace the contents of the anchor's isolated rendering boundary.
    fn mount(&self, anchor: AnchorId, html: &str) -> Result<(), EmbedError>;

    /// Insert an external stylesheet into the host document.
    fn load_stylesheet(&self, url: &str) -> Result<(), EmbedError>;
}

/// Callback invoked with anchors found in newly inserted subtrees.
pub type InsertionHandler = Box<dyn FnMut(Vec<Anchor>)>;

/// Observes insertions under a root and reports candidate anchors.
pub trait InsertionFeed {
    fn subscribe(&self, handler: InsertionHandler);
}

/// Widget ids are UUIDs in practice; accept any short token of
/// `[A-Za-z0-9_-]` so the id can be placed in a URL path unescaped.
pub fn is_valid_widget_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= MAX_WIDGET_ID_LEN
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

// ── Loader ───────────────────────────────────────────────────────────

/// One loader per host page.
pub struct EmbedLoader<F, H> {
    fetcher: F,
    host: H,
    processed: RefCell<HashSet<AnchorId>>,
    loaded_fonts: RefCell<BTreeSet<String>>,
}

impl<F: WidgetFetcher, H: MountHost> EmbedLoader<F, H> {
    pub fn new(fetcher: F, host: H) -> Self {
        Self {
            fetcher,
            host,
            processed: RefCell::new(HashSet::new()),
            loaded_fonts: RefCell::new(BTreeSet::new()),
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn is_processed(&self, anchor: AnchorId) -> bool {
        self.processed.borrow().contains(&anchor)
    }

    /// Font stylesheet URLs requested so far.
    pub fn loaded_fonts(&self) -> Vec<String> {
        self.loaded_fonts.borrow().iter().cloned().collect()
    }

    /// Mark unprocessed anchors as processed and return the ones to mount,
    /// in the order given.
    ///
    /// Anchors without a widget id are ignored and stay unclaimed. Anchors
    /// with a malformed id are claimed (so they are reported only once) but
    /// not returned.
    pub fn claim(&self, anchors: impl IntoIterator<Item = Anchor>) -> Vec<(AnchorId, String)> {
        let mut processed = self.processed.borrow_mut();
        let mut claimed = Vec::new();
        for anchor in anchors {
            let Some(widget_id) = anchor.widget_id.as_deref().map(str::trim) else {
                continue;
            };
            if widget_id.is_empty() || !processed.insert(anchor.id) {
                continue;
            }
            if !is_valid_widget_id(widget_id) {
                tracing::warn!(widget_id, "Ignoring embed anchor with malformed widget id");
                continue;
            }
            claimed.push((anchor.id, widget_id.to_string()));
        }
        claimed
    }

    /// Claim and mount every new anchor in `anchors` (document order).
    ///
    /// Mounts run concurrently and may finish in any order.
    pub async fn scan(
        &self,
        anchors: impl IntoIterator<Item = Anchor>,
    ) -> Vec<(AnchorId, MountOutcome)> {
        let claimed = self.claim(anchors);
        self.mount_claimed(claimed).await
    }

    /// Same as [`EmbedLoader::scan`]; entry point for insertion events.
    pub async fn handle_insertions(&self, anchors: Vec<Anchor>) -> Vec<(AnchorId, MountOutcome)> {
        self.scan(anchors).await
    }

    pub async fn mount_claimed(
        &self,
        claimed: Vec<(AnchorId, String)>,
    ) -> Vec<(AnchorId, MountOutcome)> {
        let mounts = claimed.into_iter().map(|(anchor, widget_id)| async move {
            let outcome = self.mount_one(anchor, &widget_id).await;
            (anchor, outcome)
        });
        join_all(mounts).await
    }

    async fn mount_one(&self, anchor: AnchorId, widget_id: &str) -> MountOutcome {
        match self.try_mount(anchor, widget_id).await {
            Ok(cards) => {
                tracing::debug!(widget_id, cards, "Widget mounted");
                MountOutcome::Mounted { cards }
            }
            Err(e) => {
                tracing::warn!(widget_id, error = %e, "Widget failed to mount");
                MountOutcome::Failed(e.to_string())
            }
        }
    }

    async fn try_mount(&self, anchor: AnchorId, widget_id: &str) -> Result<usize, EmbedError> {
        let bundle = self.fetcher.fetch_widget(widget_id).await?;
        let rendered = render(&bundle.testimonials, &bundle.config);

        if let Some(url) = rendered.font_stylesheet.as_deref() {
            self.ensure_stylesheet(url);
        }

        self.host.mount(anchor, &rendered.to_html())?;
        Ok(rendered.card_count)
    }

    /// Request a stylesheet once per loader. A failed insertion is logged;
    /// the widget still mounts with the fallback font stack.
    fn ensure_stylesheet(&self, url: &str) {
        let first_request = self.loaded_fonts.borrow_mut().insert(url.to_string());
        if !first_request {
            return;
        }
        if let Err(e) = self.host.load_stylesheet(url) {
            tracing::warn!(url, error = %e, "Font stylesheet insertion failed");
        }
    }
}

impl<F, H> EmbedLoader<F, H>
where
    F: WidgetFetcher + 'static,
    H: MountHost + 'static,
{
    /// Subscribe to `feed` and mount anchors as they are inserted.
    ///
    /// Claiming happens inside the callback, before `spawn` runs the mount
    /// future, so overlapping events cannot issue duplicate fetches.
    pub fn watch(
        self: &Rc<Self>,
        feed: &impl InsertionFeed,
        spawn: impl Fn(LocalBoxFuture<'static, ()>) + 'static,
    ) {
        let loader = Rc::clone(self);
        feed.subscribe(Box::new(move |anchors| {
            let claimed = loader.claim(anchors);
            if claimed.is_empty() {
                return;
            }
            let loader = Rc::clone(&loader);
            spawn(Box::pin(async move {
                loader.mount_claimed(claimed).await;
            }));
        }));
    }
}
