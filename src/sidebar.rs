use std::cell::{Cell, RefCell};
use std::rc::Rc;

use anyhow::{Result, anyhow};
use constcat::concat;
use gloo_console::error as console_error;
use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{AddEventListenerOptions, Document, Element, HtmlElement, Window};

use crate::js_error;

/// Class shared by every sidebar panel; mounting removes all matches first.
pub const SIDEBAR_CLASS: &str = "sidebar";

/// Class whose addition and removal drives the slide transitions.
pub const VISIBLE_CLASS: &str = "visible";

/// Class of the close control injected ahead of the caller's content.
pub const CLOSE_BUTTON_CLASS: &str = "close-btn";

const SIDEBAR_SELECTOR: &str = concat!(".", SIDEBAR_CLASS);
const CLOSE_BUTTON_SELECTOR: &str = concat!(".", CLOSE_BUTTON_CLASS);
const CLOSE_BUTTON_MARKUP: &str = concat!(
    r#"<span class=""#,
    CLOSE_BUTTON_CLASS,
    r#"">&#215;</span>"#
);

/// Upper bound on the exit transition. If the browser never delivers
/// `transitionend` (no transition configured, or it was interrupted), the
/// panel is force-removed once this expires.
const CLOSE_FALLBACK_MS: u32 = 600;

/// Where the panel is in its lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Appended to the document, entrance transition not yet triggered.
    Mounting,
    /// Entrance transition triggered by the animation-frame callback.
    Visible,
    /// Exit transition running; further close calls are no-ops.
    Closing,
    /// Removed from the document.
    Absent,
}

/// Handle to a mounted sidebar panel.
///
/// Owns the panel's lifecycle state and every event closure wired up at
/// mount time. Clones share the same panel. The stored closures hold their
/// own clones, so the panel stays functional even after the caller drops
/// the handle; everything is released once the close transition finishes.
#[derive(Clone)]
pub struct SidebarHandle {
    inner: Rc<Inner>,
}

struct Inner {
    document: Document,
    host: Window,
    id: String,
    phase: Cell<Phase>,
    close_click: RefCell<Option<Closure<dyn FnMut()>>>,
    resize: RefCell<Option<ResizeListener>>,
    transition_end: RefCell<Option<Closure<dyn FnMut()>>>,
    fallback: RefCell<Option<Timeout>>,
}

/// Resize subscription on the host window; dropping it deregisters the
/// callback.
struct ResizeListener {
    window: Window,
    closure: Closure<dyn FnMut()>,
}

impl ResizeListener {
    fn register(window: &Window, closure: Closure<dyn FnMut()>) -> Result<Self> {
        window
            .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())
            .map_err(js_error)?;

        Ok(Self {
            window: window.clone(),
            closure,
        })
    }
}

impl Drop for ResizeListener {
    fn drop(&mut self) {
        let _ = self
            .window
            .remove_event_listener_with_callback("resize", self.closure.as_ref().unchecked_ref());
    }
}

/// Builds the sidebar panel and attaches it to the document body.
///
/// Any panel already carrying [`SIDEBAR_CLASS`] is removed first, keeping at
/// most one panel in the document even if an earlier close never finished.
/// The entrance transition is scheduled on the next animation frame, after a
/// forced layout read, so the browser treats the visible class as a discrete
/// change. The host window's resize events keep the panel at full viewport
/// height until the panel is gone.
pub fn mount(
    document: &Document,
    host: &Window,
    id: &str,
    content: &str,
) -> Result<SidebarHandle> {
    remove_existing(document);

    let panel: HtmlElement = document
        .create_element("div")
        .map_err(js_error)?
        .dyn_into()
        .map_err(|_| anyhow!("div element has an unexpected type"))?;
    panel.set_id(id);
    panel.set_class_name(SIDEBAR_CLASS);
    panel.set_inner_html(&format!("{CLOSE_BUTTON_MARKUP}{content}"));

    document
        .body()
        .ok_or_else(|| anyhow!("host document has no body"))?
        .append_child(&panel)
        .map_err(js_error)?;

    // Flush layout so the visible class added below starts a transition
    // instead of being folded into the initial style.
    let _ = panel.offset_height();

    let handle = SidebarHandle {
        inner: Rc::new(Inner {
            document: document.clone(),
            host: host.clone(),
            id: id.to_owned(),
            phase: Cell::new(Phase::Mounting),
            close_click: RefCell::new(None),
            resize: RefCell::new(None),
            transition_end: RefCell::new(None),
            fallback: RefCell::new(None),
        }),
    };

    let reveal = {
        let panel = panel.clone();
        let handle = handle.clone();
        Closure::once_into_js(move || {
            // A close may already be underway by the time this frame runs.
            if handle.inner.phase.get() == Phase::Mounting {
                let _ = panel.class_list().add_1(VISIBLE_CLASS);
                handle.inner.phase.set(Phase::Visible);
            }
        })
    };
    host.request_animation_frame(reveal.unchecked_ref::<js_sys::Function>())
        .map_err(js_error)?;

    let close_button = panel
        .query_selector(CLOSE_BUTTON_SELECTOR)
        .map_err(js_error)?
        .ok_or_else(|| anyhow!("close control missing from sidebar markup"))?;
    let on_click = {
        let handle = handle.clone();
        Closure::<dyn FnMut()>::new(move || handle.close())
    };
    close_button
        .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())
        .map_err(js_error)?;
    handle.inner.close_click.replace(Some(on_click));

    let on_resize = {
        let handle = handle.clone();
        Closure::<dyn FnMut()>::new(move || handle.sync_height())
    };
    handle
        .inner
        .resize
        .replace(Some(ResizeListener::register(host, on_resize)?));

    handle.sync_height();

    Ok(handle)
}

impl SidebarHandle {
    pub fn phase(&self) -> Phase {
        self.inner.phase.get()
    }

    pub fn id(&self) -> &str {
        &self.inner.id
    }

    /// Starts the exit transition and removes the panel once it finishes.
    ///
    /// Single-flight: while a close is in progress, further calls return
    /// before touching the document, and a handle that already finalized
    /// stays inert even if a successor panel was mounted under the same id.
    /// A missing panel is a silent no-op. Removal happens on
    /// `transitionend`, or after [`CLOSE_FALLBACK_MS`] if that event never
    /// arrives.
    pub fn close(&self) {
        if !matches!(self.inner.phase.get(), Phase::Mounting | Phase::Visible) {
            return;
        }

        let Some(panel) = self.lookup() else {
            return;
        };

        self.inner.phase.set(Phase::Closing);
        let _ = panel.class_list().remove_1(VISIBLE_CLASS);

        let on_transition_end = {
            let handle = self.clone();
            let panel = panel.clone();
            Closure::<dyn FnMut()>::new(move || handle.finalize(&panel))
        };
        let options = AddEventListenerOptions::new();
        options.set_once(true);
        if panel
            .add_event_listener_with_callback_and_add_event_listener_options(
                "transitionend",
                on_transition_end.as_ref().unchecked_ref(),
                &options,
            )
            .is_err()
        {
            self.finalize(&panel);
            return;
        }
        self.inner.transition_end.replace(Some(on_transition_end));

        let fallback = {
            let handle = self.clone();
            let panel = panel.clone();
            Timeout::new(CLOSE_FALLBACK_MS, move || handle.finalize(&panel))
        };
        self.inner.fallback.replace(Some(fallback));
    }

    /// Matches the panel height to the host viewport. No-op when the panel
    /// is not in the document.
    pub fn sync_height(&self) {
        let Some(panel) = self.lookup() else {
            return;
        };
        let Some(height) = self.inner.host.inner_height().ok().and_then(|h| h.as_f64()) else {
            return;
        };

        if let Err(err) = panel.style().set_property("height", &height_px(height)) {
            console_error!(format!("failed to set sidebar height: {err:?}"));
        }
    }

    fn lookup(&self) -> Option<HtmlElement> {
        self.inner
            .document
            .get_element_by_id(&self.inner.id)?
            .dyn_into()
            .ok()
    }

    /// Removes exactly the panel the close started on, never a successor
    /// mounted under the same id, then releases listeners and closures.
    fn finalize(&self, panel: &HtmlElement) {
        if self.inner.phase.get() != Phase::Closing {
            return;
        }

        panel.remove();
        self.inner.phase.set(Phase::Absent);

        self.inner.resize.take();
        self.inner.close_click.take();
        self.inner.transition_end.take();
        self.inner.fallback.take();
    }
}

fn remove_existing(document: &Document) {
    let Ok(existing) = document.query_selector_all(SIDEBAR_SELECTOR) else {
        return;
    };

    for index in 0..existing.length() {
        if let Some(node) = existing.item(index) {
            if let Some(element) = node.dyn_ref::<Element>() {
                element.remove();
            }
        }
    }
}

fn height_px(height: f64) -> String {
    format!("{height}px")
}
