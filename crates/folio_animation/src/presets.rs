//! Animation presets for common page motion
//!
//! Each preset returns a [`TweenBuilder`] so callers can adjust timing or add
//! callbacks before calling `finish()`.

use crate::easing::Easing;
use crate::repeat::Repeat;
use crate::tween::{Endpoint, Tween, TweenBuilder};
use folio_core::{Targets, Value};

/// Pre-built tweens for the patterns the portfolio page uses
pub struct AnimationPreset;

impl AnimationPreset {
    // ========================================================================
    // Entrances
    // ========================================================================

    /// Fade in, rise and unblur; the scroll-reveal look
    pub fn reveal(targets: impl Into<Targets>, rise_px: f32) -> TweenBuilder {
        Tween::build(targets)
            .from_to("opacity", 0.0, 1.0)
            .from_to("y", Value::px(rise_px), Value::px(0.0))
            .from_to("blur", Value::px(10.0), Value::px(0.0))
            .duration(1.0)
            .ease(Easing::EaseOutCubic)
    }

    /// Fade in from transparent
    pub fn fade_in(targets: impl Into<Targets>, duration: f64) -> TweenBuilder {
        Tween::build(targets)
            .from_to("opacity", 0.0, 1.0)
            .duration(duration)
            .ease(Easing::EaseOut)
    }

    /// Fade out to transparent
    pub fn fade_out(targets: impl Into<Targets>, duration: f64) -> TweenBuilder {
        Tween::build(targets)
            .to("opacity", 0.0)
            .duration(duration)
            .ease(Easing::EaseIn)
    }

    /// Scale up from `from_scale` with fade
    pub fn scale_in(targets: impl Into<Targets>, from_scale: f32, duration: f64) -> TweenBuilder {
        Tween::build(targets)
            .from_to("opacity", 0.0, 1.0)
            .from_to("scale", from_scale, 1.0)
            .duration(duration)
            .ease(Easing::EaseOutCubic)
    }

    /// Scale in with overshoot
    pub fn pop_in(targets: impl Into<Targets>, duration: f64) -> TweenBuilder {
        Tween::build(targets)
            .from_to("opacity", 0.0, 1.0)
            .from_to("scale", 0.0, 1.0)
            .duration(duration)
            .ease(Easing::BackOut(1.7))
    }

    /// Slide up into place from `distance` pixels below
    pub fn slide_up(targets: impl Into<Targets>, distance: f32, duration: f64) -> TweenBuilder {
        Tween::build(targets)
            .from_to("opacity", 0.0, 1.0)
            .from_to("y", Value::px(distance), Value::px(0.0))
            .duration(duration)
            .ease(Easing::EaseOutCubic)
    }

    /// Slide in from `distance` pixels to the left
    pub fn slide_in_left(targets: impl Into<Targets>, distance: f32, duration: f64) -> TweenBuilder {
        Tween::build(targets)
            .from_to("opacity", 0.0, 1.0)
            .from_to("x", Value::px(-distance), Value::px(0.0))
            .duration(duration)
            .ease(Easing::EaseOutCubic)
    }

    /// Slide in from `distance` pixels to the right
    pub fn slide_in_right(targets: impl Into<Targets>, distance: f32, duration: f64) -> TweenBuilder {
        Tween::build(targets)
            .from_to("opacity", 0.0, 1.0)
            .from_to("x", Value::px(distance), Value::px(0.0))
            .duration(duration)
            .ease(Easing::EaseOutCubic)
    }

    /// Navigation bar dropping in from above the viewport
    pub fn nav_drop_in(targets: impl Into<Targets>) -> TweenBuilder {
        Tween::build(targets)
            .from_to("y", Value::px(-100.0), Value::px(0.0))
            .from_to("opacity", 0.0, 1.0)
            .duration(1.0)
            .ease(Easing::EaseOutCubic)
    }

    // ========================================================================
    // Scroll-driven
    // ========================================================================

    /// Linear vertical drift in percent of the element's height; meant to be
    /// scrubbed by a scroll binding
    pub fn parallax(targets: impl Into<Targets>, y_percent: f32) -> TweenBuilder {
        Tween::build(targets)
            .to("yPercent", Value::percent(y_percent))
            .duration(1.0)
            .ease(Easing::Linear)
    }

    /// Fill a bar from zero width to `percent`
    pub fn progress_fill(targets: impl Into<Targets>, percent: f32) -> TweenBuilder {
        Tween::build(targets)
            .from_to("width", Value::percent(0.0), Value::percent(percent))
            .duration(1.5)
            .ease(Easing::EaseOutCubic)
    }

    // ========================================================================
    // Loops
    // ========================================================================

    /// Endless drift by a relative offset and back, with a full turn
    pub fn float_orb(targets: impl Into<Targets>, dx: f32, dy: f32, duration: f64) -> TweenBuilder {
        Tween::build(targets)
            .to("x", Endpoint::Relative(dx))
            .to("y", Endpoint::Relative(dy))
            .to("rotation", 360.0)
            .duration(duration)
            .ease(Easing::EaseInOutQuad)
            .repeat(Repeat::Infinite)
            .yoyo(true)
    }

    /// Endless gentle swell and fade
    pub fn pulse(targets: impl Into<Targets>, duration: f64) -> TweenBuilder {
        Tween::build(targets)
            .to("scale", 1.2)
            .to("opacity", 0.8)
            .duration(duration)
            .ease(Easing::EaseInOutCubic)
            .repeat(Repeat::Infinite)
            .yoyo(true)
    }

    /// Small floating particle bobbing up and down forever
    pub fn particle(targets: impl Into<Targets>) -> TweenBuilder {
        Tween::build(targets)
            .to("y", Value::px(-20.0))
            .duration(3.0)
            .ease(Easing::EaseInOutQuad)
            .repeat(Repeat::Infinite)
            .yoyo(true)
    }

    // ========================================================================
    // Feedback
    // ========================================================================

    /// Quick press: scale to `scale` and back once
    pub fn press_feedback(targets: impl Into<Targets>, scale: f32) -> TweenBuilder {
        Tween::build(targets)
            .to("scale", scale)
            .duration(0.1)
            .ease(Easing::EaseOutCubic)
            .repeat(Repeat::Count(1))
            .yoyo(true)
    }

    /// Nudge toward a pointer offset (relative drift)
    pub fn pointer_drift(targets: impl Into<Targets>, dx: f32, dy: f32) -> TweenBuilder {
        Tween::build(targets)
            .to("x", Endpoint::Relative(dx))
            .to("y", Endpoint::Relative(dy))
            .duration(2.0)
            .ease(Easing::EaseOutQuad)
    }
}
