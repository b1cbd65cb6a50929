//! Folio Core
//!
//! The render-tree side of the Folio animation system:
//!
//! - **Values**: unit-carrying numbers and colors with interpolation
//! - **Targets**: the `Target` capability and query resolution
//! - **Node tree**: an in-memory, selector-addressable element list
//! - **Viewport**: layout boxes and scroll/resize events supplied by the host
//! - **Signals**: completion latches hosts can poll or subscribe to

pub mod events;
pub mod geometry;
pub mod node;
pub mod signal;
pub mod target;
pub mod value;

pub use events::{EventType, ViewportEvent};
pub use geometry::{Rect, Viewport};
pub use node::{Node, NodeTree};
pub use signal::Signal;
pub use target::{Target, TargetRef, TargetResolver, Targets, WeakTargetRef};
pub use value::{default_for, Color, ParseValueError, Unit, Value};
