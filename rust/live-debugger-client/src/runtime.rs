//! The constructed debugger client.
//!
//! A [`Debugger`] owns every piece of client state: the inspect controller,
//! the highlight overlay, the fingerprint baseline and the queue of intents
//! in between. It is created once per page (or per test) and torn down
//! explicitly, so independent instances never share state.
//!
//! Event handlers are synchronous and apply their visual effects before
//! returning. Anything that has to go over the channel is parked in an
//! outbox and sent by [`Debugger::deliver`].

use std::sync::Arc;

use live_debugger_common::SharedCell;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::fingerprint::compute_fingerprint;
use crate::highlight::HighlightRenderer;
use crate::inspect::{Ancestry, Disposition, InspectController, InspectHost, Origin};
use crate::intent::{Intent, IntentBus};
use crate::protocol::{Inbound, Outbound};
use crate::pulse::PulseAnimator;
use crate::surface::Surface;
use crate::transport::Transport;
use crate::watcher::{MutationWatcher, WatchOutcome};

/// The debug-button UI, as far as the client core needs it.
pub trait MenuHooks {
    /// Show the debug button if hidden, hide it if shown.
    fn toggle_debug_button(&self);
}

/// The debugger client for one page.
pub struct Debugger<S, H, T, M>
where
    S: Surface,
{
    config: ClientConfig,
    surface: S,
    transport: Arc<T>,
    menu: M,
    bus: Arc<IntentBus>,
    inspect: InspectController<H>,
    highlight: HighlightRenderer<S::Node>,
    pulse: PulseAnimator,
    watcher: MutationWatcher<Arc<T>>,
    outbox: SharedCell<Vec<Outbound>>,
    torn_down: SharedCell<bool>,
}

impl<S, H, T, M> Debugger<S, H, T, M>
where
    S: Surface + Ancestry<Target = <S as Surface>::Node>,
    H: InspectHost,
    T: Transport,
    M: MenuHooks,
{
    /// Create the client. The fingerprint baseline is taken from the
    /// sessions mounted right now, which is also what the channel should be
    /// joined with (see [`Debugger::fingerprint`]).
    pub fn create(config: ClientConfig, surface: S, host: H, transport: Arc<T>, menu: M) -> Self {
        let bus = Arc::new(IntentBus::new());
        let inspect = InspectController::new(host, bus.clone(), config.base_url.clone());
        let watcher = MutationWatcher::new(
            transport.clone(),
            compute_fingerprint(surface.session_ids()),
        );

        Self {
            config,
            surface,
            transport,
            menu,
            bus,
            inspect,
            highlight: HighlightRenderer::default(),
            pulse: PulseAnimator,
            watcher,
            outbox: SharedCell::new(Vec::new()),
            torn_down: SharedCell::new(false),
        }
    }

    /// The configuration this client was created with.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The page surface.
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// The inspect-mode controller.
    pub fn inspect(&self) -> &InspectController<H> {
        &self.inspect
    }

    /// The debug-button hooks.
    pub fn menu(&self) -> &M {
        &self.menu
    }

    /// The highlight renderer.
    pub fn highlight(&self) -> &HighlightRenderer<S::Node> {
        &self.highlight
    }

    /// The last fingerprint the debugger acknowledged.
    pub fn fingerprint(&self) -> String {
        self.watcher.baseline()
    }

    /// Whether [`Debugger::teardown`] has run.
    pub fn is_torn_down(&self) -> bool {
        *self.torn_down.read()
    }

    /// The debug menu asked to enter inspect mode.
    pub fn enable_inspect(&self) {
        if self.is_torn_down() {
            return;
        }
        self.inspect.enable(Origin::Local);
        self.flush();
    }

    /// The debug menu asked to leave inspect mode.
    pub fn disable_inspect(&self) {
        if self.is_torn_down() {
            return;
        }
        self.inspect.disable(Origin::Local);
        self.flush();
    }

    /// `mouseover` anywhere in the page while inspecting.
    pub fn on_mouse_over(&self, target: &S::Node) {
        self.inspect.on_mouse_over(&self.surface, target);
        self.flush();
    }

    /// `click` anywhere in the page while inspecting.
    pub fn on_click(&self, target: &S::Node) -> Disposition {
        let disposition = self.inspect.on_click(&self.surface, target);
        self.flush();
        disposition
    }

    /// `contextmenu` anywhere in the page while inspecting.
    pub fn on_context_menu(&self) -> Disposition {
        let disposition = self.inspect.on_context_menu();
        self.flush();
        disposition
    }

    /// `keydown` anywhere in the page while inspecting.
    pub fn on_key_down(&self, key: &str) {
        self.inspect.on_key_down(key);
        self.flush();
    }

    /// The window was resized.
    pub fn on_resize(&self) {
        self.highlight.on_resize(&self.surface);
    }

    /// The window was scrolled.
    pub fn on_scroll(&self) {
        self.highlight.on_scroll(&self.surface);
    }

    /// A batch of DOM mutations was observed.
    ///
    /// Re-syncs the overlay with the (possibly moved or removed) target, then
    /// reports the session set if it changed. Batches that land while a
    /// report is in flight return [`WatchOutcome::Deferred`]; the pending
    /// report picks their changes up.
    pub async fn on_mutations(&self) -> WatchOutcome {
        if self.is_torn_down() {
            return WatchOutcome::Unchanged;
        }

        self.highlight.on_resize(&self.surface);

        let outcome = self.watcher.observe(&self.surface).await;

        if let WatchOutcome::Committed {
            fingerprint,
            previous,
        } = &outcome
        {
            self.bus.emit(Intent::FingerprintChanged {
                fingerprint: fingerprint.clone(),
                previous: previous.clone(),
            });
            self.flush();
        }

        outcome
    }

    /// Handle an inbound channel event, then deliver any replies.
    pub async fn receive(&self, event: &str, payload: Value) {
        if self.is_torn_down() {
            return;
        }

        let inbound = match Inbound::decode(event, payload) {
            Ok(inbound) => inbound,
            Err(error) => {
                tracing::warn!("Ignoring channel event: {error}");
                return;
            }
        };

        self.dispatch(inbound);
        self.flush();
        self.deliver().await;
    }

    /// Tell the debugger this window is ready.
    pub async fn announce(&self, window_id: &str) -> Result<(), crate::LiveDebuggerError> {
        self.transport
            .push(Outbound::WindowInitialized {
                window_id: window_id.to_string(),
                socket_id: self.surface.primary_session_id(),
            })
            .await
    }

    /// Number of outbound events waiting for [`Debugger::deliver`].
    pub fn pending(&self) -> usize {
        self.outbox.read().len()
    }

    /// Push every parked outbound event, oldest first. Failures are logged
    /// and dropped.
    pub async fn deliver(&self) {
        let pending = self.outbox.take();

        for event in pending {
            let name = event.event_name();
            if let Err(error) = self.transport.push(event).await {
                tracing::error!("Failed to push '{name}': {error}");
            }
        }
    }

    /// Leave inspect mode, remove every overlay and stop reacting to
    /// events.
    pub fn teardown(&self) {
        if self.torn_down.replace(true) {
            return;
        }

        self.inspect.disable(Origin::Remote);
        self.bus.drain();
        self.highlight.clear(&self.surface);
        self.outbox.take();
    }

    fn dispatch(&self, inbound: Inbound) {
        match inbound {
            Inbound::Highlight(descriptor) => {
                if self.config.highlighting {
                    self.bus.emit(Intent::ShowHighlight(descriptor));
                }
            }
            Inbound::Pulse(descriptor) => {
                if self.config.highlighting {
                    self.bus.emit(Intent::Pulse(descriptor));
                }
            }
            Inbound::FindSuccessor => match self.surface.primary_session_id() {
                Some(socket_id) => self
                    .bus
                    .emit(Intent::Notify(Outbound::FoundSuccessor { socket_id })),
                None => tracing::debug!("No session to offer as successor"),
            },
            Inbound::InspectModeChanged { inspect_mode } => {
                if inspect_mode {
                    self.inspect.enable(Origin::Remote);
                } else {
                    self.inspect.disable(Origin::Remote);
                }
            }
            Inbound::ToggleDebugButton => {
                if self.config.debug_button {
                    self.bus.emit(Intent::ToggleDebugButton);
                }
            }
        }
    }

    /// Apply every pending intent in arrival order.
    fn flush(&self) {
        for intent in self.bus.drain() {
            match intent {
                Intent::ShowHighlight(descriptor) => {
                    let outcome = self.highlight.show(&self.surface, &descriptor);
                    tracing::debug!("Highlight {}: {outcome:?}", descriptor.selector);
                }
                Intent::ClearHighlight => self.highlight.clear(&self.surface),
                Intent::Pulse(descriptor) => {
                    self.pulse.play(&self.surface, &descriptor);
                }
                Intent::FingerprintChanged {
                    fingerprint,
                    previous,
                } => {
                    tracing::debug!("Fingerprint committed: '{previous}' -> '{fingerprint}'");

                    // The hovered element may have been replaced along with its session
                    if self.highlight.active().is_none() {
                        self.inspect.forget_hover();
                    }
                }
                Intent::Notify(event) => self.outbox.write().push(event),
                Intent::ToggleDebugButton => self.menu.toggle_debug_button(),
            }
        }
    }
}
