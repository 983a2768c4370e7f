//! The info box shown next to a highlighted element.
//!
//! Placement is a pure function of the anchor rectangle, the tooltip's
//! rendered size and the viewport size ([`position_tooltip`]); the
//! [`TooltipRenderer`] only owns the node and feeds it the numbers.

use live_debugger_common::SharedCell;

use crate::geometry::{Rect, Size, Viewport};
use crate::intent::TooltipMetadata;
use crate::surface::{Layer, Surface};

/// Gap kept between the tooltip, its anchor and the viewport edges.
pub const TOOLTIP_MARGIN: f64 = 10.0;

/// Which way the tooltip's arrow points.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arrow {
    /// Tooltip sits above the anchor
    Down,
    /// Tooltip sits below (or over) the anchor
    Up,
}

impl Arrow {
    /// CSS class carried by the tooltip node.
    pub fn class_name(&self) -> &'static str {
        match self {
            Arrow::Down => "arrow-down",
            Arrow::Up => "arrow-up",
        }
    }
}

/// Where the tooltip goes, in viewport space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipPlacement {
    /// Left edge
    pub left: f64,
    /// Top edge
    pub top: f64,
    /// Arrow direction
    pub arrow: Arrow,
}

impl TooltipPlacement {
    /// The tooltip frame in document space.
    pub fn frame(&self, size: Size, viewport: &Viewport) -> Rect {
        viewport.to_document(Rect::new(self.left, self.top, size.width, size.height))
    }
}

/// Compute the tooltip position for an anchor, all in viewport space.
///
/// Prefers sitting above the anchor, left-aligned with it. Flips below when
/// there is no room above, goes back above (or pins to the top margin) when
/// below overflows, right-aligns when the right edge would overflow, and
/// finally clamps both axes so the box stays on screen. The arrow points
/// down when the tooltip ended up entirely above the anchor.
pub fn position_tooltip(anchor: Rect, tooltip: Size, viewport: Size) -> TooltipPlacement {
    let above = anchor.top - tooltip.height - TOOLTIP_MARGIN;
    let below = anchor.bottom() + TOOLTIP_MARGIN;

    let mut top = if above < TOOLTIP_MARGIN { below } else { above };

    if top + tooltip.height > viewport.height - TOOLTIP_MARGIN {
        top = if above >= TOOLTIP_MARGIN {
            above
        } else {
            TOOLTIP_MARGIN
        };
    }

    let mut left = anchor.left;

    if left + tooltip.width > viewport.width - TOOLTIP_MARGIN {
        left = viewport.width - tooltip.width - TOOLTIP_MARGIN;
        if left < TOOLTIP_MARGIN {
            left = TOOLTIP_MARGIN;
        }
    }

    let left = left
        .min(viewport.width - tooltip.width - TOOLTIP_MARGIN)
        .max(TOOLTIP_MARGIN);
    let top = top
        .min(viewport.height - tooltip.height - TOOLTIP_MARGIN)
        .max(TOOLTIP_MARGIN);

    let arrow = if top + tooltip.height <= anchor.top {
        Arrow::Down
    } else {
        Arrow::Up
    };

    TooltipPlacement { left, top, arrow }
}

/// Owns the (single) tooltip node.
#[derive(Debug)]
pub struct TooltipRenderer<N> {
    current: SharedCell<Option<N>>,
}

impl<N> Default for TooltipRenderer<N> {
    fn default() -> Self {
        Self {
            current: SharedCell::new(None),
        }
    }
}

impl<N> TooltipRenderer<N>
where
    N: Clone + std::fmt::Debug,
{
    /// Replace any current tooltip with one describing `metadata`, anchored
    /// to `anchor` (viewport space).
    pub fn show<S>(&self, surface: &S, anchor: Rect, metadata: &TooltipMetadata)
    where
        S: Surface<Node = N>,
    {
        self.remove(surface);

        let node = match surface.mount(Layer::Tooltip) {
            Ok(node) => node,
            Err(error) => {
                tracing::warn!("Unable to mount tooltip: {error}");
                return;
            }
        };

        surface.write_tooltip(&node, metadata);
        Self::layout(surface, &node, anchor);
        *self.current.write() = Some(node);
    }

    /// Move the current tooltip, if any, to follow `anchor`.
    pub fn reposition<S>(&self, surface: &S, anchor: Rect)
    where
        S: Surface<Node = N>,
    {
        if let Some(node) = self.current.get() {
            Self::layout(surface, &node, anchor);
        }
    }

    /// Remove the current tooltip, if any.
    pub fn remove<S>(&self, surface: &S)
    where
        S: Surface<Node = N>,
    {
        if let Some(node) = self.current.take() {
            surface.unmount(&node);
        }
    }

    /// Whether a tooltip is currently shown.
    pub fn is_shown(&self) -> bool {
        self.current.read().is_some()
    }

    fn layout<S>(surface: &S, node: &N, anchor: Rect)
    where
        S: Surface<Node = N>,
    {
        let viewport = surface.viewport();
        let size = surface.measure(node);
        let placement = position_tooltip(anchor, size, viewport.size);

        surface.place(node, placement.frame(size, &viewport));
        surface.point(node, placement.arrow);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::helpers::FakeSurface;
    use crate::intent::IdentityKind;

    const VIEWPORT: Size = Size {
        width: 1000.0,
        height: 800.0,
    };

    #[test]
    fn it_prefers_sitting_above_the_anchor() {
        let placement = position_tooltip(
            Rect::new(100.0, 300.0, 200.0, 50.0),
            Size::new(150.0, 40.0),
            VIEWPORT,
        );

        assert_eq!(placement.left, 100.0);
        assert_eq!(placement.top, 250.0);
        assert_eq!(placement.arrow, Arrow::Down);
    }

    #[test]
    fn it_flips_below_when_there_is_no_room_above() {
        let placement = position_tooltip(
            Rect::new(100.0, 20.0, 200.0, 50.0),
            Size::new(150.0, 40.0),
            VIEWPORT,
        );

        assert_eq!(placement.top, 80.0);
        assert_eq!(placement.arrow, Arrow::Up);
    }

    #[test]
    fn it_pins_to_the_top_margin_when_neither_side_fits() {
        // Anchor fills the viewport: above overflows the top, below the bottom.
        let placement = position_tooltip(
            Rect::new(100.0, 5.0, 200.0, 790.0),
            Size::new(150.0, 40.0),
            VIEWPORT,
        );

        assert_eq!(placement.top, TOOLTIP_MARGIN);
        assert_eq!(placement.arrow, Arrow::Up);
    }

    #[test]
    fn it_right_aligns_when_the_right_edge_overflows() {
        let placement = position_tooltip(
            Rect::new(900.0, 300.0, 80.0, 50.0),
            Size::new(200.0, 40.0),
            VIEWPORT,
        );

        assert_eq!(placement.left, VIEWPORT.width - 200.0 - TOOLTIP_MARGIN);
    }

    #[test]
    fn it_never_goes_past_the_left_margin() {
        let wide = position_tooltip(
            Rect::new(900.0, 300.0, 80.0, 50.0),
            Size::new(1200.0, 40.0),
            VIEWPORT,
        );
        assert_eq!(wide.left, TOOLTIP_MARGIN);

        let offscreen = position_tooltip(
            Rect::new(-300.0, 300.0, 80.0, 50.0),
            Size::new(100.0, 40.0),
            VIEWPORT,
        );
        assert_eq!(offscreen.left, TOOLTIP_MARGIN);
    }

    #[test]
    fn it_renders_in_document_space_and_repositions_in_place() {
        let surface = FakeSurface::new(Viewport::new(1000.0, 800.0).scrolled(0.0, 500.0));
        surface.set_tooltip_size(Size::new(150.0, 40.0));
        let renderer = TooltipRenderer::default();
        let metadata = TooltipMetadata {
            module: "MyAppWeb.Counter".into(),
            kind: IdentityKind::Component,
            id_key: "CID".into(),
            id_value: "42".into(),
        };

        renderer.show(&surface, Rect::new(100.0, 300.0, 200.0, 50.0), &metadata);

        let tooltip = surface.mounted(Layer::Tooltip);
        assert_eq!(tooltip.len(), 1);
        assert_eq!(
            surface.frame(&tooltip[0]),
            Some(Rect::new(100.0, 750.0, 150.0, 40.0))
        );
        assert_eq!(surface.arrow(&tooltip[0]), Some(Arrow::Down));
        assert_eq!(surface.tooltip_text(&tooltip[0]), Some(metadata.clone()));

        renderer.reposition(&surface, Rect::new(100.0, 20.0, 200.0, 50.0));

        assert_eq!(surface.mounted(Layer::Tooltip), tooltip);
        assert_eq!(surface.mount_count(Layer::Tooltip), 1);
        assert_eq!(surface.arrow(&tooltip[0]), Some(Arrow::Up));

        renderer.remove(&surface);
        assert!(surface.mounted(Layer::Tooltip).is_empty());
        assert!(!renderer.is_shown());
    }
}
