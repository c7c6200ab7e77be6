//! # client
//!
//! Leptos + WASM single-page UI for the warranty assistant.
//!
//! The session itself lives in the `chat` crate; this crate holds it in a
//! signal, drives its two request flows over `gloo-net`, and renders the
//! view models it produces. Without the `csr` feature the network layer is
//! stubbed so components and helpers build and test natively.

pub mod app;
pub mod components;
pub mod net;
pub mod state;

/// WASM entry point: install logging and mount the app.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::mount_to_body(app::App);
}
