//! Viewport and document coordinate helpers.
//!
//! Bounding rectangles come out of the browser in viewport space
//! (`getBoundingClientRect`), while overlays are absolutely positioned in
//! document space. [`Viewport`] carries the scroll offsets needed to move
//! between the two.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Distance of the left edge from the origin
    pub left: f64,
    /// Distance of the top edge from the origin
    pub top: f64,
    /// Horizontal extent
    pub width: f64,
    /// Vertical extent
    pub height: f64,
}

impl Rect {
    /// Build a rectangle from its left/top corner and size.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// The right edge.
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    /// The bottom edge.
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    /// The size of the rectangle.
    pub fn size(&self) -> Size {
        Size {
            width: self.width,
            height: self.height,
        }
    }

    /// Move the rectangle by the given offsets.
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self {
            left: self.left + dx,
            top: self.top + dy,
            ..*self
        }
    }

    /// Grow the rectangle by `by` on every side, keeping it centered.
    pub fn inflate(&self, by: f64) -> Self {
        Self {
            left: self.left - by,
            top: self.top - by,
            width: self.width + by * 2.0,
            height: self.height + by * 2.0,
        }
    }
}

/// A width/height pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    /// Horizontal extent
    pub width: f64,
    /// Vertical extent
    pub height: f64,
}

impl Size {
    /// Build a size.
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// The visible window onto the document.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Viewport {
    /// `innerWidth` / `innerHeight`
    pub size: Size,
    /// `scrollX`
    pub scroll_x: f64,
    /// `scrollY`
    pub scroll_y: f64,
}

impl Viewport {
    /// A viewport of the given size scrolled to the origin.
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }

    /// The same viewport scrolled to the given offsets.
    pub fn scrolled(self, scroll_x: f64, scroll_y: f64) -> Self {
        Self {
            scroll_x,
            scroll_y,
            ..self
        }
    }

    /// Translate a viewport-space rectangle into document space.
    pub fn to_document(&self, rect: Rect) -> Rect {
        rect.translate(self.scroll_x, self.scroll_y)
    }
}
