//! Page bootstrap: wires the live document, the channel and the debug menu
//! to a [`Debugger`].

use std::rc::{Rc, Weak};
use std::sync::Arc;

use futures::channel::oneshot;
use js_sys::{Object, Reflect};
use live_debugger_common::SharedCell;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, Event, KeyboardEvent, MutationObserver, Window};

use super::{Listener, PhoenixChannel, WebInspectHost, WebSurface, read_config, window_id};
use crate::inspect::Disposition;
use crate::protocol::Inbound;
use crate::surface::Sessions;
use crate::{Debugger, LiveDebuggerError, MenuHooks, compute_fingerprint};

/// Global the [`DebuggerHandle`] is published under.
pub const HANDLE_GLOBAL: &str = "liveDebugger";

/// The client as assembled in a browser page.
pub type WebDebugger = Debugger<WebSurface, WebInspectHost, PhoenixChannel, JsMenu>;

/// [`MenuHooks`] forwarding to a callback the debug menu script registers
/// through [`DebuggerHandle::on_toggle_debug_button`].
#[derive(Debug, Default)]
pub struct JsMenu {
    toggle: SharedCell<Option<js_sys::Function>>,
}

impl MenuHooks for JsMenu {
    fn toggle_debug_button(&self) {
        match self.toggle.get() {
            Some(callback) => {
                if let Err(error) = callback.call0(&JsValue::UNDEFINED) {
                    tracing::warn!("Debug button toggle threw: {}", super::describe(&error));
                }
            }
            None => tracing::debug!("No debug button registered"),
        }
    }
}

/// What the page (and the debug menu) get to hold on to.
#[wasm_bindgen]
pub struct DebuggerHandle {
    debugger: Rc<WebDebugger>,
    channel: Arc<PhoenixChannel>,
    window: Window,
    observer: MutationObserver,
    _on_mutation: Closure<dyn FnMut(JsValue)>,
    window_listeners: Vec<Listener>,
}

#[wasm_bindgen]
impl DebuggerHandle {
    /// Enter inspect mode.
    #[wasm_bindgen(js_name = enableInspect)]
    pub fn enable_inspect(&self) {
        self.debugger.enable_inspect();
        deliver_later(&self.debugger);
    }

    /// Leave inspect mode.
    #[wasm_bindgen(js_name = disableInspect)]
    pub fn disable_inspect(&self) {
        self.debugger.disable_inspect();
        deliver_later(&self.debugger);
    }

    /// Whether inspect mode is on.
    #[wasm_bindgen(js_name = isInspecting)]
    pub fn is_inspecting(&self) -> bool {
        self.debugger.inspect().is_inspecting()
    }

    /// Register the callback that shows or hides the debug button.
    #[wasm_bindgen(js_name = onToggleDebugButton)]
    pub fn on_toggle_debug_button(&self, callback: js_sys::Function) {
        self.debugger.menu().toggle.replace(Some(callback));
    }

    /// The last session fingerprint the debugger acknowledged.
    #[wasm_bindgen(getter)]
    pub fn fingerprint(&self) -> String {
        self.debugger.fingerprint()
    }

    /// Stop observing the page, remove every overlay and close the socket.
    pub fn teardown(&self) {
        self.observer.disconnect();

        for (event, callback) in &self.window_listeners {
            let _ = self
                .window
                .remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
        }

        self.debugger.teardown();
        self.channel.close();
    }
}

/// Boot the client in the current page and publish its handle on
/// `window.liveDebugger`.
///
/// A missing config tag or a channel that cannot be joined leaves the page
/// untouched; the error is logged and returned.
#[wasm_bindgen]
pub async fn start() -> Result<(), JsValue> {
    match boot().await {
        Ok(()) => Ok(()),
        Err(error) => {
            tracing::error!("Debugger client unavailable: {error}");
            Err(error.into())
        }
    }
}

async fn boot() -> Result<(), LiveDebuggerError> {
    let window =
        web_sys::window().ok_or_else(|| LiveDebuggerError::Platform("No window".into()))?;
    let document = window
        .document()
        .ok_or_else(|| LiveDebuggerError::Platform("No document".into()))?;

    let config = read_config(&document)?;
    let config_version = config.version.clone();
    ready(&document).await;

    let surface = WebSurface::new(window.clone(), document.clone());
    let window_id = window_id(&window);
    let fingerprint = compute_fingerprint(surface.session_ids());

    let channel = Arc::new(PhoenixChannel::connect(&config, &window_id, &fingerprint).await?);
    let host = WebInspectHost::new(window.clone(), document.clone());
    let debugger = Rc::new(Debugger::create(
        config,
        surface,
        host,
        channel.clone(),
        JsMenu::default(),
    ));

    debugger
        .inspect()
        .host()
        .bind(inspect_listeners(&Rc::downgrade(&debugger)));

    for event in Inbound::EVENTS {
        let debugger = Rc::downgrade(&debugger);
        channel.subscribe(event, move |payload| {
            if let Some(debugger) = debugger.upgrade() {
                spawn_local(async move { debugger.receive(event, payload).await });
            }
        });
    }

    if let Err(error) = debugger.announce(&window_id).await {
        tracing::warn!("Window {window_id} was not acknowledged: {error}");
    }

    let (observer, on_mutation) = observe_mutations(&document, Rc::downgrade(&debugger))?;

    let weak = Rc::downgrade(&debugger);
    let window_listeners = vec![
        listener("resize", &weak, |debugger, _| debugger.on_resize()),
        listener("scroll", &weak, |debugger, _| debugger.on_scroll()),
    ];
    for (event, callback) in &window_listeners {
        window.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())?;
    }

    let handle = DebuggerHandle {
        debugger,
        channel,
        window: window.clone(),
        observer,
        _on_mutation: on_mutation,
        window_listeners,
    };
    Reflect::set(&window, &HANDLE_GLOBAL.into(), &JsValue::from(handle))?;

    match &config_version {
        Some(version) => tracing::info!("Debugger {version} client ready in window {window_id}"),
        None => tracing::info!("Debugger client ready in window {window_id}"),
    }

    Ok(())
}

/// Resolve once the document has been parsed.
async fn ready(document: &Document) {
    if document.ready_state() != "loading" {
        return;
    }

    let (sender, receiver) = oneshot::channel::<()>();
    let callback = Closure::once_into_js(move || {
        let _ = sender.send(());
    });

    if document
        .add_event_listener_with_callback("DOMContentLoaded", callback.unchecked_ref())
        .is_ok()
    {
        let _ = receiver.await;
    }
}

/// Send whatever the last handler parked in the outbox.
fn deliver_later(debugger: &Rc<WebDebugger>) {
    if debugger.pending() == 0 {
        return;
    }

    let debugger = debugger.clone();
    spawn_local(async move { debugger.deliver().await });
}

fn listener<F>(event: &'static str, debugger: &Weak<WebDebugger>, handler: F) -> Listener
where
    F: Fn(&WebDebugger, &Event) + 'static,
{
    let debugger = debugger.clone();
    let callback = Closure::wrap(Box::new(move |event: Event| {
        if let Some(debugger) = debugger.upgrade() {
            handler(debugger.as_ref(), &event);
            deliver_later(&debugger);
        }
    }) as Box<dyn FnMut(Event)>);

    (event, callback)
}

fn inspect_listeners(debugger: &Weak<WebDebugger>) -> Vec<Listener> {
    vec![
        listener("mouseover", debugger, |debugger, event| {
            if let Some(target) = target_element(event) {
                debugger.on_mouse_over(&target);
            }
        }),
        listener("click", debugger, |debugger, event| {
            if let Some(target) = target_element(event) {
                if debugger.on_click(&target) == Disposition::PreventDefault {
                    suppress(event);
                }
            }
        }),
        listener("contextmenu", debugger, |debugger, event| {
            if debugger.on_context_menu() == Disposition::PreventDefault {
                suppress(event);
            }
        }),
        listener("keydown", debugger, |debugger, event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                debugger.on_key_down(&event.key());
            }
        }),
    ]
}

fn observe_mutations(
    document: &Document,
    debugger: Weak<WebDebugger>,
) -> Result<(MutationObserver, Closure<dyn FnMut(JsValue)>), LiveDebuggerError> {
    let callback = Closure::wrap(Box::new(move |_records: JsValue| {
        if let Some(debugger) = debugger.upgrade() {
            spawn_local(async move {
                debugger.on_mutations().await;
            });
        }
    }) as Box<dyn FnMut(JsValue)>);

    let observer = MutationObserver::new(callback.as_ref().unchecked_ref())?;

    let options = Object::new();
    Reflect::set(&options, &"childList".into(), &JsValue::TRUE)?;
    Reflect::set(&options, &"subtree".into(), &JsValue::TRUE)?;

    let body = document
        .body()
        .ok_or_else(|| LiveDebuggerError::Platform("Document has no body".into()))?;
    observer.observe_with_options(&body, options.unchecked_ref())?;

    Ok((observer, callback))
}

fn target_element(event: &Event) -> Option<Element> {
    event.target()?.dyn_into::<Element>().ok()
}

fn suppress(event: &Event) {
    event.prevent_default();
    event.stop_propagation();
}
