//! The page, as far as the renderers are concerned.
//!
//! Renderers resolve targets, measure them and draw transient nodes through
//! [`Surface`]. The web implementation is backed by `web-sys`; the test
//! double in [`helpers`](crate::helpers) keeps synthetic elements and rects
//! in memory.

use std::fmt::Debug;

use crate::error::LiveDebuggerError;
use crate::geometry::{Rect, Size, Viewport};
use crate::intent::{Selector, TooltipMetadata};
use crate::pulse::PulseAnimation;
use crate::tooltip::Arrow;

/// Kinds of node the client draws on top of the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Layer {
    /// The box tracking the highlighted element
    Highlight,
    /// The info box anchored to the highlight
    Tooltip,
    /// The one-shot pulse ring
    Pulse,
}

impl Layer {
    /// Element id (highlight, tooltip) or class (pulse) for the node.
    pub fn name(&self) -> &'static str {
        match self {
            Layer::Highlight => "live-debugger-highlight",
            Layer::Tooltip => "live-debugger-tooltip",
            Layer::Pulse => "live-debugger-pulse",
        }
    }
}

/// The computed-style facts that decide whether an element can be seen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Visibility {
    /// `display: none`
    pub display_none: bool,
    /// `visibility: hidden`
    pub visibility_hidden: bool,
    /// `opacity`
    pub opacity: f64,
}

impl Visibility {
    /// A fully visible element.
    pub const VISIBLE: Visibility = Visibility {
        display_none: false,
        visibility_hidden: false,
        opacity: 1.0,
    };

    /// Whether an overlay for this element would make sense.
    pub fn is_visible(&self) -> bool {
        !self.display_none && !self.visibility_hidden && self.opacity > 0.0
    }
}

/// DOM capabilities needed by the highlight, tooltip and pulse renderers.
pub trait Surface {
    /// A handle to an element
    type Node: Clone + Debug;

    /// Resolve the first element matching `selector`.
    fn find(&self, selector: &Selector) -> Option<Self::Node>;

    /// Computed visibility of `node`.
    fn visibility(&self, node: &Self::Node) -> Visibility;

    /// Bounding rectangle of `node` in viewport space.
    fn client_rect(&self, node: &Self::Node) -> Rect;

    /// Current viewport size and scroll offsets.
    fn viewport(&self) -> Viewport;

    /// Create an absolutely positioned node for `layer` and attach it.
    fn mount(&self, layer: Layer) -> Result<Self::Node, LiveDebuggerError>;

    /// Record which target a node tracks.
    fn tag(&self, node: &Self::Node, selector: &Selector);

    /// Move and size `node`; `frame` is in document space.
    fn place(&self, node: &Self::Node, frame: Rect);

    /// Set the node's background color.
    fn paint(&self, node: &Self::Node, color: &str);

    /// Fill a tooltip node with its text.
    fn write_tooltip(&self, node: &Self::Node, metadata: &TooltipMetadata);

    /// Rendered size of `node`.
    fn measure(&self, node: &Self::Node) -> Size;

    /// Set which way the tooltip arrow points.
    fn point(&self, node: &Self::Node, arrow: Arrow);

    /// Start `animation` on `node`; the node detaches itself once it finishes.
    fn animate(&self, node: &Self::Node, animation: &PulseAnimation);

    /// Detach `node` from the page.
    fn unmount(&self, node: &Self::Node);
}

/// Which sessions are mounted in the page.
pub trait Sessions {
    /// Ids of every mounted view, in document order.
    fn session_ids(&self) -> Vec<String>;

    /// Id of the primary view, falling back to the first mounted one.
    fn primary_session_id(&self) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::Visibility;

    #[test]
    fn it_treats_hidden_or_transparent_elements_as_invisible() {
        assert!(Visibility::VISIBLE.is_visible());
        assert!(
            !Visibility {
                display_none: true,
                ..Visibility::VISIBLE
            }
            .is_visible()
        );
        assert!(
            !Visibility {
                visibility_hidden: true,
                ..Visibility::VISIBLE
            }
            .is_visible()
        );
        assert!(
            !Visibility {
                opacity: 0.0,
                ..Visibility::VISIBLE
            }
            .is_visible()
        );
    }
}
