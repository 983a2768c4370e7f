use live_debugger_common::SharedCell;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Event, Window};

use crate::inspect::InspectHost;

/// Class put on `<body>` while inspecting.
pub const INSPECT_MARKER_CLASS: &str = "live-debugger-inspect-mode";

/// A page-level listener: event type and callback.
pub type Listener = (&'static str, Closure<dyn FnMut(Event)>);

/// [`InspectHost`] over the live document.
///
/// The listeners are built by the bootstrap (they need a handle to the
/// debugger) and handed over with [`WebInspectHost::bind`]; `listen` and
/// `unlisten` only attach and detach them, in the capture phase.
pub struct WebInspectHost {
    window: Window,
    document: Document,
    listeners: SharedCell<Vec<Listener>>,
}

impl std::fmt::Debug for WebInspectHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebInspectHost")
            .field("listeners", &self.listeners.read().len())
            .finish_non_exhaustive()
    }
}

impl WebInspectHost {
    /// A host with no listeners bound yet.
    pub fn new(window: Window, document: Document) -> Self {
        Self {
            window,
            document,
            listeners: SharedCell::new(Vec::new()),
        }
    }

    /// Install the listeners attached by [`InspectHost::listen`].
    pub fn bind(&self, listeners: Vec<Listener>) {
        *self.listeners.write() = listeners;
    }
}

impl InspectHost for WebInspectHost {
    fn set_marker(&self, inspecting: bool) {
        if let Some(body) = self.document.body() {
            let _ = body
                .class_list()
                .toggle_with_force(INSPECT_MARKER_CLASS, inspecting);
        }
    }

    fn listen(&self) {
        for (event, callback) in self.listeners.read().iter() {
            if let Err(error) = self.document.add_event_listener_with_callback_and_bool(
                event,
                callback.as_ref().unchecked_ref(),
                true,
            ) {
                tracing::warn!("Unable to listen for {event}: {}", super::describe(&error));
            }
        }
    }

    fn unlisten(&self) {
        for (event, callback) in self.listeners.read().iter() {
            let _ = self.document.remove_event_listener_with_callback_and_bool(
                event,
                callback.as_ref().unchecked_ref(),
                true,
            );
        }
    }

    fn open(&self, url: &str) {
        if let Err(error) = self.window.open_with_url_and_target(url, "_blank") {
            tracing::warn!("Unable to open {url}: {}", super::describe(&error));
        }
    }
}
