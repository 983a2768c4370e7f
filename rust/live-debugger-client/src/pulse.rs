//! One-shot "flash" drawn over an element.

use std::time::Duration;

use crate::geometry::Rect;
use crate::highlight::Palette;
use crate::intent::HighlightDescriptor;
use crate::surface::{Layer, Surface};

/// How long the ring takes to expand and fade.
pub const PULSE_DURATION: Duration = Duration::from_millis(500);

/// How long the ring waits before it starts.
pub const PULSE_DELAY: Duration = Duration::from_millis(200);

/// How far the ring grows past the target on each side, at the end.
pub const PULSE_GROWTH: f64 = 12.0;

/// One step of the pulse animation.
#[derive(Debug, Clone, PartialEq)]
pub struct Keyframe {
    /// Position in the animation, `0.0..=1.0`
    pub offset: f64,
    /// Frame in document space
    pub frame: Rect,
    /// Background color
    pub color: &'static str,
}

/// An expand-and-fade animation: three keyframes, fixed delay and duration.
#[derive(Debug, Clone, PartialEq)]
pub struct PulseAnimation {
    /// Start, midpoint and end
    pub keyframes: [Keyframe; 3],
    /// Running time
    pub duration: Duration,
    /// Wait before starting
    pub delay: Duration,
}

impl PulseAnimation {
    /// Build the pulse for a target occupying `frame` (document space).
    pub fn new(frame: Rect, palette: &Palette) -> Self {
        Self {
            keyframes: [
                Keyframe {
                    offset: 0.0,
                    frame,
                    color: palette.stop(3),
                },
                Keyframe {
                    offset: 0.5,
                    frame: frame.inflate(PULSE_GROWTH / 2.0),
                    color: palette.stop(2),
                },
                Keyframe {
                    offset: 1.0,
                    frame: frame.inflate(PULSE_GROWTH),
                    color: palette.stop(0),
                },
            ],
            duration: PULSE_DURATION,
            delay: PULSE_DELAY,
        }
    }
}

/// Plays pulses. Holds no state: every pulse owns its node, and the node
/// removes itself when its animation finishes.
#[derive(Debug, Default, Clone, Copy)]
pub struct PulseAnimator;

impl PulseAnimator {
    /// Flash the element `descriptor` points at. Returns `false` when the
    /// target is missing or hidden.
    pub fn play<S>(&self, surface: &S, descriptor: &HighlightDescriptor) -> bool
    where
        S: Surface,
    {
        if descriptor.is_clear() {
            return false;
        }

        let Some(target) = surface.find(&descriptor.selector) else {
            return false;
        };

        if !surface.visibility(&target).is_visible() {
            return false;
        }

        let frame = surface
            .viewport()
            .to_document(surface.client_rect(&target));
        let animation = PulseAnimation::new(frame, Palette::for_kind(descriptor.kind));

        let node = match surface.mount(Layer::Pulse) {
            Ok(node) => node,
            Err(error) => {
                tracing::warn!("Unable to mount pulse: {error}");
                return false;
            }
        };

        surface.place(&node, frame);
        surface.paint(&node, animation.keyframes[0].color);
        surface.animate(&node, &animation);

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Viewport;
    use crate::helpers::FakeSurface;
    use crate::intent::IdentityKind;
    use crate::surface::Visibility;

    #[test]
    fn it_expands_and_fades_over_three_keyframes() {
        let animation = PulseAnimation::new(
            Rect::new(100.0, 100.0, 50.0, 20.0),
            Palette::for_kind(IdentityKind::Component),
        );

        let [start, middle, end] = &animation.keyframes;
        assert_eq!(start.frame, Rect::new(100.0, 100.0, 50.0, 20.0));
        assert!(middle.frame.width > start.frame.width);
        assert_eq!(end.frame, Rect::new(88.0, 88.0, 74.0, 44.0));
        assert_eq!(start.color, Palette::COMPONENT.stop(3));
        assert_eq!(end.color, Palette::COMPONENT.stop(0));
        assert_eq!(animation.duration, Duration::from_millis(500));
        assert_eq!(animation.delay, Duration::from_millis(200));
    }

    #[test]
    fn it_creates_an_independent_node_per_pulse() {
        let surface = FakeSurface::new(Viewport::new(1000.0, 800.0).scrolled(0.0, 100.0));
        surface.insert_component("42", Rect::new(10.0, 10.0, 100.0, 40.0));
        let descriptor = HighlightDescriptor::component("42");

        assert!(PulseAnimator.play(&surface, &descriptor));
        assert!(PulseAnimator.play(&surface, &descriptor));

        let pulses = surface.animating();
        assert_eq!(pulses.len(), 2);
        assert_ne!(pulses[0], pulses[1]);
        assert_eq!(
            surface.frame(&pulses[0]),
            Some(Rect::new(10.0, 110.0, 100.0, 40.0))
        );

        surface.finish_animations();
        assert!(surface.mounted(Layer::Pulse).is_empty());
    }

    #[test]
    fn it_skips_missing_and_hidden_targets() {
        let surface = FakeSurface::new(Viewport::new(1000.0, 800.0));
        let hidden = surface.insert_component("7", Rect::new(0.0, 0.0, 10.0, 10.0));
        surface.set_visibility(
            &hidden,
            Visibility {
                opacity: 0.0,
                ..Visibility::VISIBLE
            },
        );

        assert!(!PulseAnimator.play(&surface, &HighlightDescriptor::component("404")));
        assert!(!PulseAnimator.play(&surface, &HighlightDescriptor::component("7")));
        assert_eq!(surface.mount_count(Layer::Pulse), 0);
    }
}
