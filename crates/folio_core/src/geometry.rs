//! Layout boxes supplied by the host
//!
//! Folio has no layout engine. Hosts report where elements sit in document
//! space and how large the viewport is; scroll bindings only do arithmetic on
//! these numbers.

/// Axis-aligned box in document coordinates (y grows downward)
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f32 {
        self.y
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center_y(&self) -> f32 {
        self.y + self.height * 0.5
    }

    /// Same box moved vertically
    pub fn translated_y(&self, dy: f32) -> Rect {
        Rect { y: self.y + dy, ..*self }
    }
}

/// Visible window onto the document
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    /// Document y at the top edge of the viewport
    pub scroll_y: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            scroll_y: 0.0,
        }
    }

    /// Whether any part of `rect` is on screen
    pub fn intersects(&self, rect: &Rect) -> bool {
        rect.bottom() > self.scroll_y && rect.top() < self.scroll_y + self.height
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(1280.0, 720.0)
    }
}
