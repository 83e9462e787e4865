#![forbid(unsafe_code)]

//! Browser runtime for Kudos embeds.
//!
//! `widget.js` imports the wasm-pack output of this crate and calls
//! [`start`] with the server's public base URL. From then on every
//! `data-kudos-widget` anchor on the page, present or inserted later, is
//! mounted once into its own shadow root.
//!
//! The loader logic lives in [`kudos_core::embed`]; this crate supplies the
//! DOM, `fetch` and `MutationObserver` bindings. Only [`registry`] and
//! [`bundle`] compile natively, so they carry the unit tests.

pub mod bundle;
pub mod registry;

#[cfg(target_arch = "wasm32")]
mod wasm;

#[cfg(target_arch = "wasm32")]
pub use wasm::start;
