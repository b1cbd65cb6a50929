//! Folio Animation System
//!
//! Frame-driven animation orchestration for pages built on `folio_core`
//! targets.
//!
//! # Features
//!
//! - **Clock**: one frame-driven time source owning every scheduled animation
//! - **Tweens**: property interpolation with easing, delay, repeat and yoyo
//! - **Timelines**: offset-based composition with relative positions and calls
//! - **Stagger**: one definition spread over many targets with growing delays
//! - **Scroll bindings**: one-shot, toggle and scrubbed playback tied to scroll
//! - **Scopes**: lifecycle ownership with a single synchronous `revert()`
//! - **Bootstrap**: the preloader sequence that gates the main page
//!
//! ```ignore
//! let clock = AnimationClock::new();
//! let handle = clock.handle();
//! let fade = Tween::build(&target).from_to("opacity", 0.0, 1.0).duration(1.0).finish()?;
//! let id = handle.add(fade);
//! clock.advance(frame_time);
//! ```

pub mod animation;
pub mod bootstrap;
pub mod callback;
pub mod clock;
pub mod easing;
pub mod error;
pub mod options;
pub mod presets;
pub mod repeat;
pub mod scope;
pub mod scroll;
pub mod stagger;
pub mod timeline;
pub mod tween;

pub use animation::Animation;
pub use bootstrap::{Bootstrap, BootstrapConfig, BootstrapPhase, BootstrapTargets, ProgressCell};
pub use clock::{
    AnimationClock, AnimationEvent, AnimationId, AnimationState, ClockHandle, MotionPreference,
};
pub use easing::Easing;
pub use error::{AnimationError, Result};
pub use options::{AnimationRequest, EndpointOption, RepeatOption, ScrollTriggerOptions, TweenOptions};
pub use presets::AnimationPreset;
pub use repeat::{Repeat, RepeatPolicy};
pub use scope::{Scope, ScopeGuard, ScopeId};
pub use scroll::{
    scrub_progress, Anchor, BindingId, ScrollCondition, ScrollMode, ScrollTrigger, ToggleActions,
};
pub use stagger::{stagger, Stagger, StaggerFrom};
pub use timeline::{Position, Timeline, TimelineChild, TimelineEntryId};
pub use tween::{Endpoint, PropertySpec, Tween, TweenBuilder};
