//! `wasm-bindgen` entry point and DOM bindings for the embed loader.
//!
//! Only compiled on `wasm32` targets.

use std::cell::RefCell;
use std::io;
use std::rc::Rc;

use async_trait::async_trait;
use js_sys::Array;
use kudos_core::embed::{
    Anchor, AnchorId, EmbedError, EmbedLoader, InsertionFeed, InsertionHandler, MountHost,
    WidgetBundle, WidgetFetcher, WIDGET_ANCHOR_ATTR, WIDGET_ANCHOR_SELECTOR,
};
use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};
use web_sys::{
    Document, Element, MutationObserver, MutationObserverInit, MutationRecord, Response,
    ShadowRootInit, ShadowRootMode,
};

use crate::bundle::{decode_widget_response, widget_data_url};
use crate::registry::ElementRegistry;

type SharedRegistry = Rc<RefCell<ElementRegistry<Element>>>;
type PageLoader = EmbedLoader<FetchWidgetFetcher, DomHost>;

thread_local! {
    static LOADER: RefCell<Option<Rc<PageLoader>>> = const { RefCell::new(None) };
}

fn js_error(err: JsValue) -> String {
    err.as_string()
        .or_else(|| {
            err.dyn_ref::<js_sys::Error>()
                .map(|e| String::from(e.message()))
        })
        .unwrap_or_else(|| format!("{err:?}"))
}

/// Mount every widget anchor on the page and keep watching for new ones.
///
/// Calling it again on the same page is a no-op.
#[wasm_bindgen]
pub fn start(base_url: String) {
    if LOADER.with(|l| l.borrow().is_some()) {
        return;
    }
    init_console_logging();

    let Some(document) = web_sys::window().and_then(|w| w.document()) else {
        tracing::warn!("No document available, widgets not mounted");
        return;
    };

    let registry: SharedRegistry = Rc::new(RefCell::new(ElementRegistry::new()));
    let loader = Rc::new(EmbedLoader::new(
        FetchWidgetFetcher { base_url },
        DomHost {
            document: document.clone(),
            registry: Rc::clone(&registry),
        },
    ));
    LOADER.with(|l| *l.borrow_mut() = Some(Rc::clone(&loader)));

    if let Some(root) = document.document_element() {
        let feed = MutationFeed {
            root,
            registry: Rc::clone(&registry),
        };
        loader.watch(&feed, |mount| spawn_local(mount));
    }

    let mut anchors = Vec::new();
    match document.query_selector_all(WIDGET_ANCHOR_SELECTOR) {
        Ok(nodes) => {
            for i in 0..nodes.length() {
                if let Some(el) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                    anchors.push(anchor_for(&el, &registry));
                }
            }
        }
        Err(e) => tracing::warn!(error = %js_error(e), "Anchor query failed"),
    }

    spawn_local(async move {
        loader.scan(anchors).await;
    });
}

fn anchor_for(el: &Element, registry: &SharedRegistry) -> Anchor {
    Anchor {
        id: registry.borrow_mut().id_for(el),
        widget_id: el.get_attribute(WIDGET_ANCHOR_ATTR),
    }
}

/// `el` itself if it is an anchor, then anchors among its descendants.
fn collect_anchors(el: &Element, registry: &SharedRegistry, out: &mut Vec<Anchor>) {
    if el.matches(WIDGET_ANCHOR_SELECTOR).unwrap_or(false) {
        out.push(anchor_for(el, registry));
    }
    let Ok(nodes) = el.query_selector_all(WIDGET_ANCHOR_SELECTOR) else {
        return;
    };
    for i in 0..nodes.length() {
        if let Some(child) = nodes.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
            out.push(anchor_for(&child, registry));
        }
    }
}

// ── Fetch ────────────────────────────────────────────────────────────

struct FetchWidgetFetcher {
    base_url: String,
}

#[async_trait(?Send)]
impl WidgetFetcher for FetchWidgetFetcher {
    async fn fetch_widget(&self, widget_id: &str) -> Result<WidgetBundle, EmbedError> {
        let fetch_error = |e: JsValue| EmbedError::Fetch(js_error(e));

        let window = web_sys::window().ok_or_else(|| EmbedError::Fetch("no window".into()))?;
        let url = widget_data_url(&self.base_url, widget_id);
        let response: Response = JsFuture::from(window.fetch_with_str(&url))
            .await
            .map_err(fetch_error)?
            .dyn_into()
            .map_err(fetch_error)?;

        let body = JsFuture::from(response.text().map_err(fetch_error)?)
            .await
            .map_err(fetch_error)?
            .as_string()
            .unwrap_or_default();

        decode_widget_response(widget_id, response.status(), &body)
    }
}

// ── Mounting ─────────────────────────────────────────────────────────

struct DomHost {
    document: Document,
    registry: SharedRegistry,
}

impl MountHost for DomHost {
    fn mount(&self, anchor: AnchorId, html: &str) -> Result<(), EmbedError> {
        let mount_error = |e: JsValue| EmbedError::Mount(js_error(e));

        let el = self
            .registry
            .borrow()
            .get(anchor)
            .cloned()
            .ok_or_else(|| EmbedError::Mount(format!("unknown anchor {}", anchor.0)))?;

        let root = match el.shadow_root() {
            Some(root) => root,
            None => el
                .attach_shadow(&ShadowRootInit::new(ShadowRootMode::Open))
                .map_err(mount_error)?,
        };
        root.set_inner_html(html);
        Ok(())
    }

    fn load_stylesheet(&self, url: &str) -> Result<(), EmbedError> {
        let mount_error = |e: JsValue| EmbedError::Mount(js_error(e));

        let link = self.document.create_element("link").map_err(mount_error)?;
        link.set_attribute("rel", "stylesheet").map_err(mount_error)?;
        link.set_attribute("href", url).map_err(mount_error)?;
        let head = self
            .document
            .head()
            .ok_or_else(|| EmbedError::Mount("document has no <head>".into()))?;
        head.append_child(&link).map_err(mount_error)?;
        Ok(())
    }
}

// ── Insertions ───────────────────────────────────────────────────────

struct MutationFeed {
    root: Element,
    registry: SharedRegistry,
}

impl InsertionFeed for MutationFeed {
    fn subscribe(&self, mut handler: InsertionHandler) {
        let registry = Rc::clone(&self.registry);
        let callback = Closure::<dyn FnMut(Array, MutationObserver)>::new(
            move |records: Array, _observer: MutationObserver| {
                let mut anchors = Vec::new();
                for record in records.iter() {
                    let Ok(record) = record.dyn_into::<MutationRecord>() else {
                        continue;
                    };
                    let added = record.added_nodes();
                    for i in 0..added.length() {
                        if let Some(el) = added.item(i).and_then(|n| n.dyn_into::<Element>().ok()) {
                            collect_anchors(&el, &registry, &mut anchors);
                        }
                    }
                }
                if !anchors.is_empty() {
                    handler(anchors);
                }
            },
        );

        let observer = match MutationObserver::new(callback.as_ref().unchecked_ref()) {
            Ok(observer) => observer,
            Err(e) => {
                tracing::warn!(error = %js_error(e), "MutationObserver unavailable");
                return;
            }
        };
        let init = MutationObserverInit::new();
        init.set_child_list(true);
        init.set_subtree(true);
        if let Err(e) = observer.observe_with_options(&self.root, &init) {
            tracing::warn!(error = %js_error(e), "Failed to observe document");
            return;
        }
        // The observer lives as long as the page.
        callback.forget();
    }
}

// ── Console logging ──────────────────────────────────────────────────

fn init_console_logging() {
    let _ = tracing_subscriber::fmt()
        .with_writer(ConsoleMakeWriter)
        .with_ansi(false)
        .without_time()
        .with_target(false)
        .with_max_level(Level::WARN)
        .try_init();
}

struct ConsoleMakeWriter;

impl<'a> MakeWriter<'a> for ConsoleMakeWriter {
    type Writer = ConsoleWriter;

    fn make_writer(&'a self) -> Self::Writer {
        ConsoleWriter::new(Level::INFO)
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        ConsoleWriter::new(*meta.level())
    }
}

/// Buffers one formatted event and hands it to the console on drop.
struct ConsoleWriter {
    level: Level,
    buf: Vec<u8>,
}

impl ConsoleWriter {
    fn new(level: Level) -> Self {
        Self {
            level,
            buf: Vec::new(),
        }
    }
}

impl io::Write for ConsoleWriter {
    fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(bytes);
        Ok(bytes.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Drop for ConsoleWriter {
    fn drop(&mut self) {
        let text = String::from_utf8_lossy(&self.buf);
        let text = text.trim_end();
        if text.is_empty() {
            return;
        }
        let msg = JsValue::from_str(&format!("[kudos] {text}"));
        match self.level {
            Level::ERROR => web_sys::console::error_1(&msg),
            Level::WARN => web_sys::console::warn_1(&msg),
            _ => web_sys::console::log_1(&msg),
        }
    }
}
