//! Slide-in HTML sidebar for Streamlit pages.
//!
//! Runs inside a Streamlit custom component's iframe and injects a themed,
//! animated sidebar panel into the parent document. The host page's
//! light/dark styling is detected from its computed background color and
//! mapped onto CSS custom properties; the panel itself slides in from the
//! right and tracks the viewport height until it is closed.

pub mod sidebar;
pub mod style;
pub mod theme;

pub use sidebar::{Phase, SidebarHandle};
pub use theme::Theme;

use anyhow::{Result, anyhow};
use gloo_console::error as console_error;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::wasm_bindgen;

#[wasm_bindgen(start)]
fn start() {
    console_error_panic_hook::set_once();
}

/// Injects the sidebar styles into the host document and mounts the panel.
///
/// This is the entry point called from the component's bootstrap script.
/// It never throws; failures are logged to the browser console. The panel's
/// own event closures keep its state alive until the close transition
/// finishes, so the handle is not retained here.
#[wasm_bindgen(js_name = initSidebar)]
pub fn init_sidebar(sidebar_id: &str, width: &str, content: &str) {
    if let Err(err) = try_init(sidebar_id, width, content) {
        console_error!(format!("failed to initialize sidebar: {err}"));
    }
}

fn try_init(sidebar_id: &str, width: &str, content: &str) -> Result<()> {
    let window = web_sys::window().ok_or_else(|| anyhow!("no global window"))?;
    // In the component iframe the parent is the Streamlit page; at top level
    // it is the window itself.
    let host = window.parent().map_err(js_error)?.unwrap_or(window);
    let document = host
        .document()
        .ok_or_else(|| anyhow!("host window has no document"))?;

    style::inject(&document, width)?;
    sidebar::mount(&document, &host, sidebar_id, content)?;

    Ok(())
}

pub(crate) fn js_error(err: JsValue) -> anyhow::Error {
    anyhow!("{err:?}")
}
