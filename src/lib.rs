/// XTab - New Tab Dashboard Extension
/// Built with Rust + WASM + Yew

pub mod chat;
pub mod clock;
pub mod config;
pub mod error;
pub mod preferences;
pub mod records;
pub mod search;
pub mod sites;
pub mod storage;
pub mod sync;
pub mod todos;
pub mod ui;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the Yew app for the new tab page
#[wasm_bindgen]
pub fn start_newtab() {
    log::info!("XTab {} starting", env!("CARGO_PKG_VERSION"));
    yew::Renderer::<ui::newtab::App>::new().render();
}
