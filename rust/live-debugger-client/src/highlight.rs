//! The overlay tracking the highlighted element.
//!
//! There is at most one highlight at a time. Showing a new one always
//! removes the previous overlay (and tooltip) first, and an overlay node is
//! never reused for a different target.

use live_debugger_common::SharedCell;

use crate::geometry::Rect;
use crate::intent::{HighlightDescriptor, IdentityKind};
use crate::surface::{Layer, Surface};
use crate::tooltip::TooltipRenderer;

/// A four-stop alpha ramp over one base color.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    stops: [&'static str; 4],
}

impl Palette {
    /// Colors for whole views.
    pub const VIEW: Palette = Palette {
        stops: [
            "rgba(255, 164, 0, 0.1)",
            "rgba(255, 164, 0, 0.25)",
            "rgba(255, 164, 0, 0.45)",
            "rgba(255, 164, 0, 0.7)",
        ],
    };

    /// Colors for sub-components.
    pub const COMPONENT: Palette = Palette {
        stops: [
            "rgba(0, 122, 255, 0.1)",
            "rgba(0, 122, 255, 0.25)",
            "rgba(0, 122, 255, 0.45)",
            "rgba(0, 122, 255, 0.7)",
        ],
    };

    /// The palette for an identity kind.
    pub fn for_kind(kind: IdentityKind) -> &'static Palette {
        match kind {
            IdentityKind::View => &Palette::VIEW,
            IdentityKind::Component => &Palette::COMPONENT,
        }
    }

    /// Color at `index` (clamped to the last stop).
    pub fn stop(&self, index: usize) -> &'static str {
        self.stops[index.min(self.stops.len() - 1)]
    }

    /// Background of the steady highlight overlay.
    pub fn overlay(&self) -> &'static str {
        self.stop(1)
    }
}

/// What a call to [`HighlightRenderer::show`] ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightOutcome {
    /// A new overlay was drawn
    Shown,
    /// The same target (or a clear descriptor) removed the current overlay
    ToggledOff,
    /// Nothing was shown and nothing was drawn
    Cleared,
    /// The target is not in the page or cannot be seen
    Missing,
}

#[derive(Debug)]
struct ActiveOverlay<N> {
    node: N,
    descriptor: HighlightDescriptor,
}

/// Draws the highlight overlay and drives the tooltip next to it.
#[derive(Debug)]
pub struct HighlightRenderer<N> {
    active: SharedCell<Option<ActiveOverlay<N>>>,
    tooltip: TooltipRenderer<N>,
}

impl<N> Default for HighlightRenderer<N> {
    fn default() -> Self {
        Self {
            active: SharedCell::new(None),
            tooltip: TooltipRenderer::default(),
        }
    }
}

impl<N> HighlightRenderer<N>
where
    N: Clone + std::fmt::Debug,
{
    /// Highlight the target of `descriptor`.
    ///
    /// If an overlay is already shown it is removed first; when the new
    /// descriptor is a clear descriptor or names the same target, that
    /// removal is the whole effect (a toggle). The tooltip is only drawn
    /// when the descriptor carries complete metadata.
    pub fn show<S>(&self, surface: &S, descriptor: &HighlightDescriptor) -> HighlightOutcome
    where
        S: Surface<Node = N>,
    {
        if let Some(previous) = self.active.take() {
            surface.unmount(&previous.node);
            self.tooltip.remove(surface);

            if descriptor.is_clear() || previous.descriptor.selector == descriptor.selector {
                return HighlightOutcome::ToggledOff;
            }
        }

        if descriptor.is_clear() {
            self.tooltip.remove(surface);
            return HighlightOutcome::Cleared;
        }

        let Some(rect) = Self::locate(surface, descriptor) else {
            return HighlightOutcome::Missing;
        };

        let node = match surface.mount(Layer::Highlight) {
            Ok(node) => node,
            Err(error) => {
                tracing::warn!("Unable to mount highlight: {error}");
                return HighlightOutcome::Missing;
            }
        };

        surface.tag(&node, &descriptor.selector);
        surface.paint(&node, Palette::for_kind(descriptor.kind).overlay());
        surface.place(&node, surface.viewport().to_document(rect));

        *self.active.write() = Some(ActiveOverlay {
            node,
            descriptor: descriptor.clone(),
        });

        if let Some(metadata) = descriptor.tooltip() {
            self.tooltip.show(surface, rect, &metadata);
        }

        HighlightOutcome::Shown
    }

    /// Remove the overlay and tooltip, if any.
    pub fn clear<S>(&self, surface: &S)
    where
        S: Surface<Node = N>,
    {
        if let Some(previous) = self.active.take() {
            surface.unmount(&previous.node);
        }
        self.tooltip.remove(surface);
    }

    /// Re-measure the highlighted target and move the overlay and tooltip to
    /// match. Clears everything when the target has gone away or been
    /// hidden.
    pub fn on_resize<S>(&self, surface: &S)
    where
        S: Surface<Node = N>,
    {
        let Some((node, descriptor)) = self.current() else {
            return;
        };

        match Self::locate(surface, &descriptor) {
            Some(rect) => {
                surface.place(&node, surface.viewport().to_document(rect));
                self.tooltip.reposition(surface, rect);
            }
            None => {
                tracing::debug!("Highlighted element {} went away", descriptor.selector);
                self.clear(surface);
            }
        }
    }

    /// Keep the tooltip on screen after the page scrolled. The overlay is in
    /// document space and does not move.
    pub fn on_scroll<S>(&self, surface: &S)
    where
        S: Surface<Node = N>,
    {
        let Some((_, descriptor)) = self.current() else {
            return;
        };

        if let Some(rect) = Self::locate(surface, &descriptor) {
            self.tooltip.reposition(surface, rect);
        }
    }

    /// The descriptor currently highlighted, if any.
    pub fn active(&self) -> Option<HighlightDescriptor> {
        self.active
            .read()
            .as_ref()
            .map(|active| active.descriptor.clone())
    }

    /// Whether a tooltip is showing next to the overlay.
    pub fn has_tooltip(&self) -> bool {
        self.tooltip.is_shown()
    }

    fn current(&self) -> Option<(N, HighlightDescriptor)> {
        self.active
            .read()
            .as_ref()
            .map(|active| (active.node.clone(), active.descriptor.clone()))
    }

    fn locate<S>(surface: &S, descriptor: &HighlightDescriptor) -> Option<Rect>
    where
        S: Surface<Node = N>,
    {
        let target = surface.find(&descriptor.selector)?;

        if !surface.visibility(&target).is_visible() {
            return None;
        }

        Some(surface.client_rect(&target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Viewport;
    use crate::helpers::FakeSurface;
    use crate::surface::Visibility;
    use crate::tooltip::Arrow;

    fn surface() -> FakeSurface {
        FakeSurface::new(Viewport::new(1000.0, 800.0).scrolled(0.0, 200.0))
    }

    fn counter() -> HighlightDescriptor {
        HighlightDescriptor::component("42").with_metadata("MyAppWeb.Counter", "CID", "42")
    }

    #[test]
    fn it_places_the_overlay_in_document_space() {
        let surface = surface();
        surface.insert_component("42", Rect::new(50.0, 60.0, 300.0, 120.0));
        let renderer = HighlightRenderer::default();

        assert_eq!(renderer.show(&surface, &counter()), HighlightOutcome::Shown);

        let overlays = surface.mounted(Layer::Highlight);
        assert_eq!(overlays.len(), 1);
        assert_eq!(
            surface.frame(&overlays[0]),
            Some(Rect::new(50.0, 260.0, 300.0, 120.0))
        );
        assert_eq!(
            surface.color(&overlays[0]).as_deref(),
            Some(Palette::COMPONENT.overlay())
        );
        assert_eq!(
            surface.tag_of(&overlays[0]),
            Some(counter().selector.clone())
        );
        assert!(renderer.has_tooltip());
    }

    #[test]
    fn it_toggles_off_when_shown_twice() {
        let surface = surface();
        surface.insert_component("42", Rect::new(50.0, 60.0, 300.0, 120.0));
        let renderer = HighlightRenderer::default();

        renderer.show(&surface, &counter());
        assert_eq!(
            renderer.show(&surface, &counter()),
            HighlightOutcome::ToggledOff
        );

        assert!(surface.mounted(Layer::Highlight).is_empty());
        assert!(surface.mounted(Layer::Tooltip).is_empty());
        assert_eq!(renderer.active(), None);
    }

    #[test]
    fn it_replaces_rather_than_reuses_overlays() {
        let surface = surface();
        surface.insert_component("1", Rect::new(0.0, 0.0, 10.0, 10.0));
        surface.insert_component("2", Rect::new(20.0, 20.0, 10.0, 10.0));
        let renderer = HighlightRenderer::default();

        renderer.show(&surface, &HighlightDescriptor::component("1"));
        let first = surface.mounted(Layer::Highlight);
        renderer.show(&surface, &HighlightDescriptor::component("2"));
        let second = surface.mounted(Layer::Highlight);

        assert_eq!(second.len(), 1);
        assert_ne!(first, second);
        assert_eq!(renderer.active(), Some(HighlightDescriptor::component("2")));
    }

    #[test]
    fn it_treats_a_clear_descriptor_as_toggle_off() {
        let surface = surface();
        surface.insert_component("42", Rect::new(0.0, 0.0, 10.0, 10.0));
        let renderer = HighlightRenderer::default();

        assert_eq!(
            renderer.show(&surface, &HighlightDescriptor::component("")),
            HighlightOutcome::Cleared
        );

        renderer.show(&surface, &counter());
        assert_eq!(
            renderer.show(&surface, &HighlightDescriptor::component("")),
            HighlightOutcome::ToggledOff
        );
        assert!(surface.mounted(Layer::Highlight).is_empty());
    }

    #[test]
    fn it_skips_the_tooltip_for_partial_metadata() {
        let surface = surface();
        surface.insert_component("42", Rect::new(0.0, 0.0, 10.0, 10.0));
        let renderer = HighlightRenderer::default();
        let partial = HighlightDescriptor {
            module: Some("MyAppWeb.Counter".into()),
            ..HighlightDescriptor::component("42")
        };

        assert_eq!(renderer.show(&surface, &partial), HighlightOutcome::Shown);
        assert_eq!(surface.mounted(Layer::Highlight).len(), 1);
        assert!(surface.mounted(Layer::Tooltip).is_empty());
    }

    #[test]
    fn it_ignores_missing_or_hidden_targets() {
        let surface = surface();
        let hidden = surface.insert_component("9", Rect::new(0.0, 0.0, 10.0, 10.0));
        surface.set_visibility(
            &hidden,
            Visibility {
                display_none: true,
                ..Visibility::VISIBLE
            },
        );
        let renderer = HighlightRenderer::default();

        assert_eq!(
            renderer.show(&surface, &HighlightDescriptor::component("404")),
            HighlightOutcome::Missing
        );
        assert_eq!(
            renderer.show(&surface, &HighlightDescriptor::component("9")),
            HighlightOutcome::Missing
        );
        assert_eq!(surface.mount_count(Layer::Highlight), 0);
    }

    #[test]
    fn it_follows_the_target_on_resize_without_remounting_the_tooltip() {
        let surface = surface();
        let target = surface.insert_component("42", Rect::new(50.0, 60.0, 300.0, 120.0));
        let renderer = HighlightRenderer::default();
        renderer.show(&surface, &counter());

        surface.set_rect(&target, Rect::new(80.0, 400.0, 500.0, 90.0));
        renderer.on_resize(&surface);

        let overlays = surface.mounted(Layer::Highlight);
        assert_eq!(overlays.len(), 1);
        assert_eq!(
            surface.frame(&overlays[0]),
            Some(Rect::new(80.0, 600.0, 500.0, 90.0))
        );
        assert_eq!(surface.mount_count(Layer::Highlight), 1);
        assert_eq!(surface.mount_count(Layer::Tooltip), 1);
        assert_eq!(surface.mounted(Layer::Tooltip).len(), 1);
    }

    #[test]
    fn it_clears_on_resize_when_the_target_is_gone() {
        let surface = surface();
        let target = surface.insert_component("42", Rect::new(50.0, 60.0, 300.0, 120.0));
        let renderer = HighlightRenderer::default();
        renderer.show(&surface, &counter());

        surface.remove(&target);
        renderer.on_resize(&surface);

        assert!(surface.mounted(Layer::Highlight).is_empty());
        assert!(surface.mounted(Layer::Tooltip).is_empty());
        assert_eq!(renderer.active(), None);
    }

    #[test]
    fn it_moves_only_the_tooltip_on_scroll() {
        let surface = surface();
        let target = surface.insert_component("42", Rect::new(100.0, 300.0, 200.0, 50.0));
        let renderer = HighlightRenderer::default();
        renderer.show(&surface, &counter());

        let overlay = surface.mounted(Layer::Highlight)[0];
        let tooltip = surface.mounted(Layer::Tooltip)[0];
        assert_eq!(
            surface.frame(&tooltip),
            Some(Rect::new(100.0, 460.0, 120.0, 30.0))
        );
        assert_eq!(surface.arrow(&tooltip), Some(Arrow::Down));

        surface.set_viewport(Viewport::new(1000.0, 800.0).scrolled(0.0, 480.0));
        surface.set_rect(&target, Rect::new(100.0, 20.0, 200.0, 50.0));
        renderer.on_scroll(&surface);

        assert_eq!(
            surface.frame(&overlay),
            Some(Rect::new(100.0, 500.0, 200.0, 50.0))
        );
        assert_eq!(
            surface.frame(&tooltip),
            Some(Rect::new(100.0, 560.0, 120.0, 30.0))
        );
        assert_eq!(surface.arrow(&tooltip), Some(Arrow::Up));
        assert_eq!(surface.mount_count(Layer::Tooltip), 1);
        assert_eq!(surface.mounted(Layer::Tooltip), vec![tooltip]);
    }

    #[test]
    fn it_ignores_scrolls_without_an_overlay() {
        let surface = surface();
        surface.insert_component("42", Rect::new(100.0, 300.0, 200.0, 50.0));
        let renderer = HighlightRenderer::default();

        renderer.on_scroll(&surface);

        assert_eq!(surface.mount_count(Layer::Highlight), 0);
        assert_eq!(surface.mount_count(Layer::Tooltip), 0);
        assert_eq!(renderer.active(), None);
    }

    #[test]
    fn it_leaves_the_tooltip_alone_when_the_target_is_gone_on_scroll() {
        let surface = surface();
        let target = surface.insert_component("42", Rect::new(100.0, 300.0, 200.0, 50.0));
        let renderer = HighlightRenderer::default();
        renderer.show(&surface, &counter());
        let tooltip = surface.mounted(Layer::Tooltip)[0];

        surface.remove(&target);
        surface.set_viewport(Viewport::new(1000.0, 800.0).scrolled(0.0, 480.0));
        renderer.on_scroll(&surface);

        assert_eq!(surface.mounted(Layer::Highlight).len(), 1);
        assert_eq!(
            surface.frame(&tooltip),
            Some(Rect::new(100.0, 460.0, 120.0, 30.0))
        );
        assert_eq!(renderer.active(), Some(counter()));
    }
}
