//! Page-wide inspect mode.
//!
//! While inspecting, hovering the page highlights the component under the
//! pointer and clicking opens that component in the debugger. The
//! controller is a two-state machine ([`InspectState`]); entering and
//! leaving are idempotent, so the page listeners are registered exactly
//! once per inspect session.

use std::sync::Arc;

use live_debugger_common::SharedCell;
use url::Url;

use crate::intent::{HighlightDescriptor, IdentityKind, Intent, IntentBus};
use crate::protocol::Outbound;
use crate::surface::Sessions;

/// Query parameter selecting a component in the debugger view.
pub const NODE_ID_PARAMETER: &str = "node_id";

/// Whether the page is currently in inspect mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InspectState {
    /// Normal interaction
    #[default]
    Idle,
    /// Pointer events pick components
    Inspecting,
}

/// Who asked for a transition. Local transitions are announced to the
/// debugger; remote ones came from it and are not echoed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// The page (debug menu, click, escape, right-click)
    Local,
    /// The debugger
    Remote,
}

/// What the caller should do with the DOM event it forwarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Let the event through
    Proceed,
    /// Call `preventDefault` and stop propagation
    PreventDefault,
}

/// Page-level effects of entering and leaving inspect mode.
pub trait InspectHost {
    /// Add or remove the body marker class.
    fn set_marker(&self, inspecting: bool);

    /// Register the page-level `click`, `mouseover`, `contextmenu` and
    /// `keydown` listeners.
    fn listen(&self);

    /// Unregister the listeners added by [`InspectHost::listen`].
    fn unlisten(&self);

    /// Open `url` in a new browsing context.
    fn open(&self, url: &str);
}

/// Walks from an event target towards the document root.
pub trait Ancestry: Sessions {
    /// An event target
    type Target: Clone;

    /// The parent element, if any.
    fn parent(&self, target: &Self::Target) -> Option<Self::Target>;

    /// The identity `target` itself carries, if any.
    fn identity(&self, target: &Self::Target) -> Option<HighlightDescriptor>;
}

/// Resolve the identity for an event target: the nearest ancestor
/// (inclusive) carrying one, else the page's primary view.
pub fn resolve_identity<A>(dom: &A, target: &A::Target) -> Option<HighlightDescriptor>
where
    A: Ancestry,
{
    let mut cursor = Some(target.clone());

    while let Some(node) = cursor {
        if let Some(identity) = dom.identity(&node) {
            return Some(identity);
        }
        cursor = dom.parent(&node);
    }

    dom.primary_session_id().map(HighlightDescriptor::view)
}

/// The debugger URL that shows `identity`.
pub fn inspect_url(base: &Url, identity: &HighlightDescriptor) -> Url {
    let mut url = base.clone();

    if identity.kind == IdentityKind::Component {
        url.query_pairs_mut()
            .append_pair(NODE_ID_PARAMETER, &identity.selector.value);
    }

    url
}

/// The inspect-mode state machine.
#[derive(Debug)]
pub struct InspectController<H> {
    host: H,
    bus: Arc<IntentBus>,
    base_url: Url,
    state: SharedCell<InspectState>,
    last_reported: SharedCell<Option<HighlightDescriptor>>,
}

impl<H> InspectController<H>
where
    H: InspectHost,
{
    /// A controller in the [`InspectState::Idle`] state.
    pub fn new(host: H, bus: Arc<IntentBus>, base_url: Url) -> Self {
        Self {
            host,
            bus,
            base_url,
            state: SharedCell::new(InspectState::Idle),
            last_reported: SharedCell::new(None),
        }
    }

    /// Current state.
    pub fn state(&self) -> InspectState {
        *self.state.read()
    }

    /// Whether inspect mode is on.
    pub fn is_inspecting(&self) -> bool {
        self.state() == InspectState::Inspecting
    }

    /// The host the controller drives.
    pub fn host(&self) -> &H {
        &self.host
    }

    /// Enter inspect mode. Returns `false` (and does nothing) if already
    /// inspecting.
    pub fn enable(&self, origin: Origin) -> bool {
        if self.state.replace(InspectState::Inspecting) == InspectState::Inspecting {
            return false;
        }

        self.host.set_marker(true);
        self.host.listen();

        if origin == Origin::Local {
            self.bus
                .emit(Intent::Notify(Outbound::inspect_mode_changed(true)));
        }

        true
    }

    /// Leave inspect mode. Returns `false` (and does nothing) if already
    /// idle.
    pub fn disable(&self, origin: Origin) -> bool {
        if self.state.replace(InspectState::Idle) == InspectState::Idle {
            return false;
        }

        self.host.set_marker(false);
        self.host.unlisten();
        self.last_reported.replace(None);
        self.bus.emit(Intent::ClearHighlight);

        if origin == Origin::Local {
            self.bus
                .emit(Intent::Notify(Outbound::inspect_mode_changed(false)));
        }

        true
    }

    /// Pointer entered `target`. Emits a highlight intent the first time the
    /// resolved identity differs from the last one reported.
    pub fn on_mouse_over<A>(&self, dom: &A, target: &A::Target)
    where
        A: Ancestry,
    {
        if !self.is_inspecting() {
            return;
        }

        let Some(identity) = resolve_identity(dom, target) else {
            return;
        };

        let mut last_reported = self.last_reported.write();
        if last_reported.as_ref() == Some(&identity) {
            return;
        }

        *last_reported = Some(identity.clone());
        drop(last_reported);

        self.bus.emit(Intent::ShowHighlight(identity));
    }

    /// Drop the memory of the last hovered identity so the next hover over
    /// it highlights again.
    pub fn forget_hover(&self) {
        self.last_reported.replace(None);
    }

    /// `target` was clicked: pulse it, open it in the debugger and leave
    /// inspect mode.
    pub fn on_click<A>(&self, dom: &A, target: &A::Target) -> Disposition
    where
        A: Ancestry,
    {
        if !self.is_inspecting() {
            return Disposition::Proceed;
        }

        if let Some(identity) = resolve_identity(dom, target) {
            let url = inspect_url(&self.base_url, &identity);

            self.bus.emit(Intent::Pulse(identity.clone()));
            self.bus
                .emit(Intent::Notify(Outbound::element_inspected(&identity)));
            self.host.open(url.as_str());
        }

        self.disable(Origin::Local);
        Disposition::PreventDefault
    }

    /// Right-click leaves inspect mode without navigating.
    pub fn on_context_menu(&self) -> Disposition {
        if self.disable(Origin::Local) {
            Disposition::PreventDefault
        } else {
            Disposition::Proceed
        }
    }

    /// `Escape` leaves inspect mode.
    pub fn on_key_down(&self, key: &str) {
        if key == "Escape" {
            self.disable(Origin::Local);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Rect, Viewport};
    use crate::helpers::{FakeHost, FakeSurface};

    fn base_url() -> Url {
        Url::parse("http://localhost:4007/transport_pid/0.123.0").unwrap()
    }

    fn controller() -> (InspectController<FakeHost>, Arc<IntentBus>) {
        let bus = Arc::new(IntentBus::new());
        (
            InspectController::new(FakeHost::default(), bus.clone(), base_url()),
            bus,
        )
    }

    #[test]
    fn it_registers_listeners_once_per_session() {
        let (controller, _bus) = controller();

        assert!(controller.enable(Origin::Local));
        assert!(!controller.enable(Origin::Local));
        assert_eq!(controller.host().listen_calls(), 1);
        assert!(controller.host().marker());

        assert!(controller.disable(Origin::Local));
        assert!(!controller.disable(Origin::Local));
        assert_eq!(controller.host().unlisten_calls(), 1);
        assert!(!controller.host().marker());
    }

    #[test]
    fn it_does_nothing_when_disabling_while_idle() {
        let (controller, bus) = controller();

        assert!(!controller.disable(Origin::Local));

        assert_eq!(controller.host().unlisten_calls(), 0);
        assert!(bus.is_empty());
    }

    #[test]
    fn it_announces_only_local_transitions() {
        let (controller, bus) = controller();

        controller.enable(Origin::Remote);
        assert!(bus.drain().is_empty());

        controller.disable(Origin::Remote);
        assert_eq!(bus.drain(), vec![Intent::ClearHighlight]);

        controller.enable(Origin::Local);
        assert_eq!(
            bus.drain(),
            vec![Intent::Notify(Outbound::inspect_mode_changed(true))]
        );
    }

    #[test]
    fn it_resolves_the_nearest_identified_ancestor() {
        let dom = FakeSurface::new(Viewport::new(1000.0, 800.0));
        let view = dom.insert_main_view("phx-F1", Rect::new(0.0, 0.0, 1000.0, 800.0));
        let component = dom.insert_component("3", Rect::new(0.0, 0.0, 100.0, 100.0));
        let button = dom.insert_plain(Rect::new(0.0, 0.0, 10.0, 10.0));
        let outside = dom.insert_plain(Rect::new(0.0, 0.0, 10.0, 10.0));
        dom.nest(&component, &view);
        dom.nest(&button, &component);

        assert_eq!(
            resolve_identity(&dom, &button),
            Some(HighlightDescriptor::component("3"))
        );
        assert_eq!(
            resolve_identity(&dom, &view),
            Some(HighlightDescriptor::view("phx-F1"))
        );
        assert_eq!(
            resolve_identity(&dom, &outside),
            Some(HighlightDescriptor::view("phx-F1"))
        );
    }

    #[test]
    fn it_reports_each_hovered_identity_once() {
        let (controller, bus) = controller();
        let dom = FakeSurface::new(Viewport::new(1000.0, 800.0));
        let view = dom.insert_main_view("phx-F1", Rect::new(0.0, 0.0, 1000.0, 800.0));
        let component = dom.insert_component("3", Rect::new(0.0, 0.0, 100.0, 100.0));
        let label = dom.insert_plain(Rect::new(0.0, 0.0, 10.0, 10.0));
        dom.nest(&component, &view);
        dom.nest(&label, &component);

        controller.on_mouse_over(&dom, &component);
        assert!(bus.is_empty(), "idle controllers ignore the pointer");

        controller.enable(Origin::Remote);
        controller.on_mouse_over(&dom, &component);
        controller.on_mouse_over(&dom, &label);
        controller.on_mouse_over(&dom, &component);
        controller.on_mouse_over(&dom, &view);

        assert_eq!(
            bus.drain(),
            vec![
                Intent::ShowHighlight(HighlightDescriptor::component("3")),
                Intent::ShowHighlight(HighlightDescriptor::view("phx-F1")),
            ]
        );
    }

    #[test]
    fn it_exits_on_escape_and_context_menu() {
        let (controller, _bus) = controller();

        controller.enable(Origin::Local);
        controller.on_key_down("a");
        assert!(controller.is_inspecting());
        controller.on_key_down("Escape");
        assert_eq!(controller.state(), InspectState::Idle);

        controller.enable(Origin::Local);
        assert_eq!(controller.on_context_menu(), Disposition::PreventDefault);
        assert_eq!(controller.state(), InspectState::Idle);
        assert_eq!(controller.on_context_menu(), Disposition::Proceed);
        assert!(controller.host().opened().is_empty());
    }

    #[test]
    fn it_builds_inspect_urls() {
        assert_eq!(
            inspect_url(&base_url(), &HighlightDescriptor::component("42")).as_str(),
            "http://localhost:4007/transport_pid/0.123.0?node_id=42"
        );
        assert_eq!(
            inspect_url(&base_url(), &HighlightDescriptor::view("phx-F1")).as_str(),
            "http://localhost:4007/transport_pid/0.123.0"
        );
    }
}
