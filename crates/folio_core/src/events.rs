//! Viewport events
//!
//! The host forwards scroll and resize notifications; the animation clock
//! batches them and recomputes scroll bindings at most once per frame.

/// Event type identifier
pub type EventType = u32;

/// Viewport event types
pub mod event_types {
    use super::EventType;

    pub const SCROLL: EventType = 30;
    pub const RESIZE: EventType = 40;
    pub const MOUNT: EventType = 60;
    pub const UNMOUNT: EventType = 61;
}

/// A viewport change reported by the host
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ViewportEvent {
    /// Absolute scroll offset of the document
    Scroll { y: f32 },
    /// Relative scroll (wheel / touch delta)
    ScrollBy { delta_y: f32 },
    Resize { width: f32, height: f32 },
}

impl ViewportEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            ViewportEvent::Scroll { .. } | ViewportEvent::ScrollBy { .. } => event_types::SCROLL,
            ViewportEvent::Resize { .. } => event_types::RESIZE,
        }
    }
}
