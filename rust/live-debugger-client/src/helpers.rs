//! In-memory doubles for the page, the inspect host, the debug menu and the
//! debugger channel.

use std::collections::BTreeMap;

use async_trait::async_trait;
use futures::channel::oneshot;
use live_debugger_common::SharedCell;

use crate::error::LiveDebuggerError;
use crate::geometry::{Rect, Size, Viewport};
use crate::inspect::{Ancestry, InspectHost};
use crate::intent::{
    COMPONENT_ATTRIBUTE, HighlightDescriptor, IdentityKind, Selector, TooltipMetadata,
    VIEW_ATTRIBUTE,
};
use crate::protocol::Outbound;
use crate::pulse::PulseAnimation;
use crate::runtime::MenuHooks;
use crate::surface::{Layer, Sessions, Surface, Visibility};
use crate::tooltip::Arrow;

/// A synthetic element or drawn node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FakeNode(usize);

#[derive(Debug, Clone)]
struct FakeElement {
    selector: Option<Selector>,
    kind: Option<IdentityKind>,
    session: bool,
    main: bool,
    rect: Rect,
    visibility: Visibility,
    parent: Option<FakeNode>,
}

#[derive(Debug, Clone)]
struct Drawn {
    layer: Layer,
    frame: Option<Rect>,
    color: Option<String>,
    tag: Option<Selector>,
    tooltip: Option<TooltipMetadata>,
    arrow: Option<Arrow>,
    animation: Option<PulseAnimation>,
}

#[derive(Debug)]
struct PageState {
    next: usize,
    viewport: Viewport,
    tooltip_size: Size,
    elements: BTreeMap<FakeNode, FakeElement>,
    drawn: BTreeMap<FakeNode, Drawn>,
    mounts: BTreeMap<&'static str, usize>,
}

impl PageState {
    fn allocate(&mut self) -> FakeNode {
        self.next += 1;
        FakeNode(self.next)
    }
}

/// A page made of synthetic elements with fixed rects.
///
/// Element insertion order stands in for document order.
#[derive(Debug)]
pub struct FakeSurface {
    state: SharedCell<PageState>,
}

impl FakeSurface {
    /// An empty page.
    pub fn new(viewport: Viewport) -> Self {
        Self {
            state: SharedCell::new(PageState {
                next: 0,
                viewport,
                tooltip_size: Size::new(120.0, 30.0),
                elements: BTreeMap::new(),
                drawn: BTreeMap::new(),
                mounts: BTreeMap::new(),
            }),
        }
    }

    fn insert(&self, element: FakeElement) -> FakeNode {
        let mut state = self.state.write();
        let node = state.allocate();
        state.elements.insert(node, element);
        node
    }

    fn element(selector: Option<Selector>, kind: Option<IdentityKind>, rect: Rect) -> FakeElement {
        FakeElement {
            selector,
            kind,
            session: false,
            main: false,
            rect,
            visibility: Visibility::VISIBLE,
            parent: None,
        }
    }

    /// Add an element carrying `data-phx-component="{cid}"`.
    pub fn insert_component(&self, cid: &str, rect: Rect) -> FakeNode {
        self.insert(Self::element(
            Some(Selector::new(COMPONENT_ATTRIBUTE, cid)),
            Some(IdentityKind::Component),
            rect,
        ))
    }

    /// Add a mounted (non-primary) view with element id `id`.
    pub fn insert_view(&self, id: &str, rect: Rect) -> FakeNode {
        self.insert(FakeElement {
            session: true,
            ..Self::element(
                Some(Selector::new(VIEW_ATTRIBUTE, id)),
                Some(IdentityKind::View),
                rect,
            )
        })
    }

    /// Add the primary view with element id `id`.
    pub fn insert_main_view(&self, id: &str, rect: Rect) -> FakeNode {
        self.insert(FakeElement {
            session: true,
            main: true,
            ..Self::element(
                Some(Selector::new(VIEW_ATTRIBUTE, id)),
                Some(IdentityKind::View),
                rect,
            )
        })
    }

    /// Add an element with no identity.
    pub fn insert_plain(&self, rect: Rect) -> FakeNode {
        self.insert(Self::element(None, None, rect))
    }

    /// Make `parent` the parent of `child`.
    pub fn nest(&self, child: &FakeNode, parent: &FakeNode) {
        if let Some(element) = self.state.write().elements.get_mut(child) {
            element.parent = Some(*parent);
        }
    }

    /// Move or resize an element.
    pub fn set_rect(&self, node: &FakeNode, rect: Rect) {
        if let Some(element) = self.state.write().elements.get_mut(node) {
            element.rect = rect;
        }
    }

    /// Change an element's computed visibility.
    pub fn set_visibility(&self, node: &FakeNode, visibility: Visibility) {
        if let Some(element) = self.state.write().elements.get_mut(node) {
            element.visibility = visibility;
        }
    }

    /// Remove an element from the page.
    pub fn remove(&self, node: &FakeNode) {
        self.state.write().elements.remove(node);
    }

    /// Size reported for tooltip nodes.
    pub fn set_tooltip_size(&self, size: Size) {
        self.state.write().tooltip_size = size;
    }

    /// Change the viewport (size or scroll).
    pub fn set_viewport(&self, viewport: Viewport) {
        self.state.write().viewport = viewport;
    }

    /// Attached nodes drawn for `layer`, oldest first.
    pub fn mounted(&self, layer: Layer) -> Vec<FakeNode> {
        self.state
            .read()
            .drawn
            .iter()
            .filter(|(_, drawn)| drawn.layer == layer)
            .map(|(node, _)| *node)
            .collect()
    }

    /// How many nodes were ever mounted for `layer`.
    pub fn mount_count(&self, layer: Layer) -> usize {
        self.state
            .read()
            .mounts
            .get(layer.name())
            .copied()
            .unwrap_or_default()
    }

    /// Attached nodes with a running animation.
    pub fn animating(&self) -> Vec<FakeNode> {
        self.state
            .read()
            .drawn
            .iter()
            .filter(|(_, drawn)| drawn.animation.is_some())
            .map(|(node, _)| *node)
            .collect()
    }

    /// Let every running animation finish; finished nodes detach.
    pub fn finish_animations(&self) {
        self.state
            .write()
            .drawn
            .retain(|_, drawn| drawn.animation.is_none());
    }

    /// Document-space frame of a drawn node.
    pub fn frame(&self, node: &FakeNode) -> Option<Rect> {
        self.state.read().drawn.get(node).and_then(|drawn| drawn.frame)
    }

    /// Background color of a drawn node.
    pub fn color(&self, node: &FakeNode) -> Option<String> {
        self.state
            .read()
            .drawn
            .get(node)
            .and_then(|drawn| drawn.color.clone())
    }

    /// Target a drawn node was tagged with.
    pub fn tag_of(&self, node: &FakeNode) -> Option<Selector> {
        self.state
            .read()
            .drawn
            .get(node)
            .and_then(|drawn| drawn.tag.clone())
    }

    /// Metadata written into a tooltip node.
    pub fn tooltip_text(&self, node: &FakeNode) -> Option<TooltipMetadata> {
        self.state
            .read()
            .drawn
            .get(node)
            .and_then(|drawn| drawn.tooltip.clone())
    }

    /// Arrow direction of a tooltip node.
    pub fn arrow(&self, node: &FakeNode) -> Option<Arrow> {
        self.state.read().drawn.get(node).and_then(|drawn| drawn.arrow)
    }

    fn with_drawn(&self, node: &FakeNode, update: impl FnOnce(&mut Drawn)) {
        if let Some(drawn) = self.state.write().drawn.get_mut(node) {
            update(drawn);
        }
    }
}

impl Surface for FakeSurface {
    type Node = FakeNode;

    fn find(&self, selector: &Selector) -> Option<FakeNode> {
        self.state
            .read()
            .elements
            .iter()
            .find(|(_, element)| element.selector.as_ref() == Some(selector))
            .map(|(node, _)| *node)
    }

    fn visibility(&self, node: &FakeNode) -> Visibility {
        self.state
            .read()
            .elements
            .get(node)
            .map(|element| element.visibility)
            .unwrap_or(Visibility {
                display_none: true,
                ..Visibility::VISIBLE
            })
    }

    fn client_rect(&self, node: &FakeNode) -> Rect {
        self.state
            .read()
            .elements
            .get(node)
            .map(|element| element.rect)
            .unwrap_or_default()
    }

    fn viewport(&self) -> Viewport {
        self.state.read().viewport
    }

    fn mount(&self, layer: Layer) -> Result<FakeNode, LiveDebuggerError> {
        let mut state = self.state.write();
        let node = state.allocate();
        state.drawn.insert(
            node,
            Drawn {
                layer,
                frame: None,
                color: None,
                tag: None,
                tooltip: None,
                arrow: None,
                animation: None,
            },
        );
        *state.mounts.entry(layer.name()).or_default() += 1;
        Ok(node)
    }

    fn tag(&self, node: &FakeNode, selector: &Selector) {
        self.with_drawn(node, |drawn| drawn.tag = Some(selector.clone()));
    }

    fn place(&self, node: &FakeNode, frame: Rect) {
        self.with_drawn(node, |drawn| drawn.frame = Some(frame));
    }

    fn paint(&self, node: &FakeNode, color: &str) {
        self.with_drawn(node, |drawn| drawn.color = Some(color.to_string()));
    }

    fn write_tooltip(&self, node: &FakeNode, metadata: &TooltipMetadata) {
        self.with_drawn(node, |drawn| drawn.tooltip = Some(metadata.clone()));
    }

    fn measure(&self, node: &FakeNode) -> Size {
        let state = self.state.read();
        match state.drawn.get(node) {
            Some(drawn) if drawn.layer == Layer::Tooltip => state.tooltip_size,
            Some(drawn) => drawn.frame.map(|frame| frame.size()).unwrap_or_default(),
            None => Size::default(),
        }
    }

    fn point(&self, node: &FakeNode, arrow: Arrow) {
        self.with_drawn(node, |drawn| drawn.arrow = Some(arrow));
    }

    fn animate(&self, node: &FakeNode, animation: &PulseAnimation) {
        self.with_drawn(node, |drawn| drawn.animation = Some(animation.clone()));
    }

    fn unmount(&self, node: &FakeNode) {
        self.state.write().drawn.remove(node);
    }
}

impl Sessions for FakeSurface {
    fn session_ids(&self) -> Vec<String> {
        self.state
            .read()
            .elements
            .values()
            .filter(|element| element.session)
            .filter_map(|element| element.selector.as_ref())
            .map(|selector| selector.value.clone())
            .collect()
    }

    fn primary_session_id(&self) -> Option<String> {
        let state = self.state.read();
        let sessions = || state.elements.values().filter(|element| element.session);

        sessions()
            .find(|element| element.main)
            .or_else(|| sessions().next())
            .and_then(|element| element.selector.as_ref())
            .map(|selector| selector.value.clone())
    }
}

impl Ancestry for FakeSurface {
    type Target = FakeNode;

    fn parent(&self, target: &FakeNode) -> Option<FakeNode> {
        self.state
            .read()
            .elements
            .get(target)
            .and_then(|element| element.parent)
    }

    fn identity(&self, target: &FakeNode) -> Option<HighlightDescriptor> {
        let state = self.state.read();
        let element = state.elements.get(target)?;

        match (&element.selector, element.kind) {
            (Some(selector), Some(kind)) => Some(HighlightDescriptor::new(selector.clone(), kind)),
            _ => None,
        }
    }
}

/// Records what inspect mode did to the page.
#[derive(Debug, Default)]
pub struct FakeHost {
    marker: SharedCell<bool>,
    listens: SharedCell<usize>,
    unlistens: SharedCell<usize>,
    opened: SharedCell<Vec<String>>,
}

impl FakeHost {
    /// Whether the body marker class is set.
    pub fn marker(&self) -> bool {
        *self.marker.read()
    }

    /// Times the listeners were registered.
    pub fn listen_calls(&self) -> usize {
        *self.listens.read()
    }

    /// Times the listeners were removed.
    pub fn unlisten_calls(&self) -> usize {
        *self.unlistens.read()
    }

    /// URLs opened in new browsing contexts.
    pub fn opened(&self) -> Vec<String> {
        self.opened.get()
    }
}

impl InspectHost for FakeHost {
    fn set_marker(&self, inspecting: bool) {
        self.marker.replace(inspecting);
    }

    fn listen(&self) {
        *self.listens.write() += 1;
    }

    fn unlisten(&self) {
        *self.unlistens.write() += 1;
    }

    fn open(&self, url: &str) {
        self.opened.write().push(url.to_string());
    }
}

/// Counts debug-button toggles.
#[derive(Debug, Default)]
pub struct FakeMenu {
    toggles: SharedCell<usize>,
}

impl FakeMenu {
    /// Times the debug button was toggled.
    pub fn toggles(&self) -> usize {
        *self.toggles.read()
    }
}

impl MenuHooks for FakeMenu {
    fn toggle_debug_button(&self) {
        *self.toggles.write() += 1;
    }
}

/// Records every pushed event; can be told to reject pushes or to hold the
/// reply to the next one.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    pushed: SharedCell<Vec<Outbound>>,
    failing: SharedCell<bool>,
    gate: SharedCell<Option<oneshot::Receiver<()>>>,
}

impl RecordingTransport {
    /// Every event pushed so far, including rejected ones.
    pub fn pushed(&self) -> Vec<Outbound> {
        self.pushed.get()
    }

    /// Make subsequent pushes fail (or succeed again).
    pub fn fail_pushes(&self, failing: bool) {
        self.failing.replace(failing);
    }

    /// Keep the next push pending until the returned sender fires (or is
    /// dropped). Whether it fails is decided when it is sent.
    pub fn hold_next_push(&self) -> oneshot::Sender<()> {
        let (release, gate) = oneshot::channel();
        self.gate.replace(Some(gate));
        release
    }
}

#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
impl crate::transport::Transport for RecordingTransport {
    async fn push(&self, event: Outbound) -> Result<(), LiveDebuggerError> {
        self.pushed.write().push(event);
        let failing = *self.failing.read();

        let gate = self.gate.take();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        if failing {
            return Err(LiveDebuggerError::Transport("channel closed".into()));
        }

        Ok(())
    }
}
