//! Scroll bindings
//!
//! A binding couples an animation to where a trigger element sits relative
//! to the viewport. Start and end conditions are written the way page scripts
//! write them: `"<element anchor> <viewport anchor>"`, e.g. `"top 80%"` means
//! "when the top of the element reaches 80% down the viewport". A single
//! number (`"0"`, `"1000px"`) is an absolute scroll offset.
//!
//! Bindings are recomputed once on attach, then at most once per frame after
//! any scroll or resize event.

use crate::clock::{AnimationId, ClockHandle, ClockInner, Frame};
use crate::error::{AnimationError, Result};
use folio_core::{Rect, TargetRef, Viewport, ViewportEvent, WeakTargetRef};
use slotmap::new_key_type;
use std::rc::Rc;
use std::str::FromStr;

new_key_type! {
    pub struct BindingId;
}

/// A point along a box: a fraction of its height plus a pixel offset
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Anchor {
    pub fraction: f32,
    pub offset_px: f32,
}

impl Anchor {
    pub const TOP: Anchor = Anchor::at(0.0);
    pub const CENTER: Anchor = Anchor::at(0.5);
    pub const BOTTOM: Anchor = Anchor::at(1.0);

    pub const fn at(fraction: f32) -> Self {
        Self {
            fraction,
            offset_px: 0.0,
        }
    }

    pub fn resolve(&self, extent: f32) -> f32 {
        extent * self.fraction + self.offset_px
    }

    /// `top`, `center`, `bottom`, `80%`, `120px`, optionally followed by
    /// `+=N` / `-=N` pixels (`top+=100`)
    fn parse(token: &str) -> Option<Anchor> {
        let (base, offset) = match token.find("+=").or_else(|| token.find("-=")) {
            Some(split) if split > 0 => {
                let sign = if token[split..].starts_with('-') { -1.0 } else { 1.0 };
                let delta = parse_px(&token[split + 2..])?;
                (&token[..split], sign * delta)
            }
            _ => (token, 0.0),
        };

        let anchor = match base {
            "top" | "left" => Anchor::TOP,
            "center" => Anchor::CENTER,
            "bottom" | "right" => Anchor::BOTTOM,
            other => {
                if let Some(percent) = other.strip_suffix('%') {
                    Anchor::at(percent.trim().parse::<f32>().ok()? / 100.0)
                } else {
                    Anchor {
                        fraction: 0.0,
                        offset_px: parse_px(other)?,
                    }
                }
            }
        };

        Some(Anchor {
            offset_px: anchor.offset_px + offset,
            ..anchor
        })
    }
}

fn parse_px(token: &str) -> Option<f32> {
    let token = token.trim();
    let number = token.strip_suffix("px").unwrap_or(token);
    number.parse::<f32>().ok().filter(|n| n.is_finite())
}

/// Where a binding starts or ends
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ScrollCondition {
    /// `element` anchor of the trigger meets `viewport` anchor of the screen
    Relative { element: Anchor, viewport: Anchor },
    /// Fixed document scroll offset in pixels
    Absolute(f32),
}

impl ScrollCondition {
    /// Default start: the element's top enters at the bottom of the screen
    pub const ENTER: ScrollCondition = ScrollCondition::Relative {
        element: Anchor::TOP,
        viewport: Anchor::BOTTOM,
    };

    /// Default end: the element's bottom leaves through the top of the screen
    pub const LEAVE: ScrollCondition = ScrollCondition::Relative {
        element: Anchor::BOTTOM,
        viewport: Anchor::TOP,
    };

    /// Scroll offset at which the condition holds
    pub fn resolve(&self, bounds: Rect, viewport_height: f32) -> f32 {
        match self {
            ScrollCondition::Relative { element, viewport } => {
                bounds.y + element.resolve(bounds.height) - viewport.resolve(viewport_height)
            }
            ScrollCondition::Absolute(px) => *px,
        }
    }
}

impl FromStr for ScrollCondition {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || AnimationError::InvalidCondition(s.to_string());
        let tokens: Vec<&str> = s.split_whitespace().collect();

        match tokens.as_slice() {
            [single] => {
                if let Some(px) = parse_px(single) {
                    return Ok(ScrollCondition::Absolute(px));
                }
                let anchor = Anchor::parse(single).ok_or_else(invalid)?;
                Ok(ScrollCondition::Relative {
                    element: anchor,
                    viewport: anchor,
                })
            }
            [element, viewport] => Ok(ScrollCondition::Relative {
                element: Anchor::parse(element).ok_or_else(invalid)?,
                viewport: Anchor::parse(viewport).ok_or_else(invalid)?,
            }),
            _ => Err(invalid()),
        }
    }
}

/// What a toggle binding does when the trigger scrolls back above its start
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToggleActions {
    /// `play none none reverse`
    #[default]
    PlayReverse,
    /// `play none none none`
    PlayNone,
}

impl FromStr for ToggleActions {
    type Err = AnimationError;

    /// Accepts `play-reverse` / `play-none` and the four-word form
    /// `"play none none reverse"`
    fn from_str(s: &str) -> Result<Self> {
        let words: Vec<&str> = s.split_whitespace().collect();
        match words.as_slice() {
            ["play-reverse"] | ["play", "none", "none", "reverse"] => Ok(ToggleActions::PlayReverse),
            ["play-none"] | ["play", "none", "none", "none"] => Ok(ToggleActions::PlayNone),
            _ => Err(AnimationError::InvalidCondition(s.to_string())),
        }
    }
}

/// How a binding drives its animation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollMode {
    /// Play forward the first time the start is reached, never again
    OneShot,
    /// Play when scrolling past the start, optionally reverse when scrolling back
    Toggle(ToggleActions),
    /// Progress follows scroll position between start and end
    Scrub,
}

/// Request to bind an animation to a trigger element
#[derive(Clone)]
pub struct ScrollTrigger {
    pub trigger: WeakTargetRef,
    pub start: ScrollCondition,
    pub end: ScrollCondition,
    pub mode: ScrollMode,
}

impl ScrollTrigger {
    pub fn new(trigger: &TargetRef, mode: ScrollMode) -> Self {
        Self {
            trigger: Rc::downgrade(trigger),
            start: ScrollCondition::ENTER,
            end: ScrollCondition::LEAVE,
            mode,
        }
    }

    pub fn start(mut self, condition: ScrollCondition) -> Self {
        self.start = condition;
        self
    }

    pub fn end(mut self, condition: ScrollCondition) -> Self {
        self.end = condition;
        self
    }

    /// Set both conditions from strings such as `"top 80%"`
    pub fn range(mut self, start: &str, end: &str) -> Result<Self> {
        self.start = start.parse()?;
        self.end = end.parse()?;
        Ok(self)
    }

    /// Start and end scroll offsets, `None` while the trigger has no box
    pub fn offsets(&self, viewport: &Viewport) -> Option<(f32, f32)> {
        resolve_offsets(&self.trigger, self.start, self.end, viewport)
    }

    /// Fails with `InvalidTimeRange` when the end resolves before the start
    pub fn validate(&self, viewport: &Viewport) -> Result<()> {
        match self.offsets(viewport) {
            Some((start, end)) if end < start => Err(AnimationError::InvalidTimeRange { start, end }),
            _ => Ok(()),
        }
    }
}

fn resolve_offsets(
    trigger: &WeakTargetRef,
    start: ScrollCondition,
    end: ScrollCondition,
    viewport: &Viewport,
) -> Option<(f32, f32)> {
    let target = trigger.upgrade()?;
    let bounds = target.try_borrow().ok()?.bounds()?;
    Some((
        start.resolve(bounds, viewport.height),
        end.resolve(bounds, viewport.height),
    ))
}

impl std::fmt::Debug for ScrollTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollTrigger")
            .field("start", &self.start)
            .field("end", &self.end)
            .field("mode", &self.mode)
            .finish()
    }
}

/// Outcome of recomputing one binding
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum BindingAction {
    Nothing,
    Play,
    Reverse,
    Progress(f64),
    /// Trigger gone: remove the binding
    Unregister,
}

/// An installed binding
pub(crate) struct ScrollBinding {
    pub(crate) animation: AnimationId,
    trigger: WeakTargetRef,
    start: ScrollCondition,
    end: ScrollCondition,
    mode: ScrollMode,
    /// Whether the scroll position was past the start at the last recompute
    inside: Option<bool>,
    played: bool,
    last_progress: Option<f64>,
}

impl ScrollBinding {
    fn new(animation: AnimationId, trigger: ScrollTrigger) -> Self {
        Self {
            animation,
            trigger: trigger.trigger,
            start: trigger.start,
            end: trigger.end,
            mode: trigger.mode,
            inside: None,
            played: false,
            last_progress: None,
        }
    }

    /// Start and end scroll offsets, `None` once the trigger is gone
    fn range(&self, viewport: &Viewport) -> Option<(f32, f32)> {
        resolve_offsets(&self.trigger, self.start, self.end, viewport)
    }

    fn reset(&mut self) {
        self.inside = None;
        self.played = false;
        self.last_progress = None;
    }

    pub(crate) fn evaluate(&mut self, viewport: &Viewport) -> BindingAction {
        let Some((start, end)) = self.range(viewport) else {
            return BindingAction::Unregister;
        };
        let scroll = viewport.scroll_y;

        match self.mode {
            ScrollMode::OneShot => {
                if !self.played && scroll >= start {
                    self.played = true;
                    BindingAction::Play
                } else {
                    BindingAction::Nothing
                }
            }
            ScrollMode::Toggle(actions) => {
                let inside = scroll >= start;
                let previous = self.inside.replace(inside);
                match (previous, inside) {
                    (Some(true), true) => BindingAction::Nothing,
                    (_, true) => BindingAction::Play,
                    (Some(true), false) if actions == ToggleActions::PlayReverse => {
                        BindingAction::Reverse
                    }
                    _ => BindingAction::Nothing,
                }
            }
            ScrollMode::Scrub => {
                let progress = scrub_progress(scroll, start, end);
                if self.last_progress == Some(progress) {
                    BindingAction::Nothing
                } else {
                    self.last_progress = Some(progress);
                    BindingAction::Progress(progress)
                }
            }
        }
    }
}

/// Fraction of the way from `start` to `end`, clamped to `0..=1`
pub fn scrub_progress(scroll: f32, start: f32, end: f32) -> f64 {
    let range = (end - start) as f64;
    let offset = (scroll - start) as f64;
    if range > 0.0 {
        (offset / range).clamp(0.0, 1.0)
    } else if offset >= 0.0 {
        1.0
    } else {
        0.0
    }
}

// ============================================================================
// Clock integration
// ============================================================================

impl ClockInner {
    pub(crate) fn recompute_bindings(&mut self, frame: &mut Frame) {
        let ids = self.binding_order.clone();
        for id in ids {
            self.recompute_binding(id, frame);
        }
    }

    pub(crate) fn recompute_binding(&mut self, id: BindingId, frame: &mut Frame) {
        let viewport = self.viewport;
        let Some(binding) = self.bindings.get(id) else {
            return;
        };
        let animation = binding.animation;

        let action = if self.contains(animation) {
            match self.bindings.get_mut(id) {
                Some(binding) => binding.evaluate(&viewport),
                None => return,
            }
        } else {
            BindingAction::Unregister
        };

        match action {
            BindingAction::Nothing => {}
            BindingAction::Play => {
                tracing::trace!(?id, "scroll binding plays");
                self.play_entry(animation);
            }
            BindingAction::Reverse => {
                tracing::trace!(?id, "scroll binding reverses");
                self.reverse_entry(animation);
            }
            BindingAction::Progress(progress) => {
                self.set_progress_entry(animation, progress, frame);
            }
            BindingAction::Unregister => {
                tracing::warn!(?id, "scroll trigger detached, unregistering binding");
                self.remove_binding(id);
            }
        }
    }

    pub(crate) fn remove_binding(&mut self, id: BindingId) -> bool {
        if self.bindings.remove(id).is_none() {
            return false;
        }
        self.binding_order.retain(|other| *other != id);
        tracing::debug!(?id, "scroll binding removed");
        true
    }

    fn install_binding(
        &mut self,
        animation: AnimationId,
        trigger: ScrollTrigger,
        frame: &mut Frame,
    ) -> Result<BindingId> {
        if !self.contains(animation) {
            // Killed or reverted: nothing to drive
            tracing::debug!(?animation, "scroll binding for missing animation ignored");
            return Ok(BindingId::default());
        }

        trigger.validate(&self.viewport)?;
        let binding = ScrollBinding::new(animation, trigger);

        match binding.mode {
            ScrollMode::Scrub => self.mark_scrubbed(animation),
            _ => self.disable_autoplay(animation),
        }

        let mode = binding.mode;
        let id = self.bindings.insert(binding);
        self.binding_order.push(id);
        if let Some(scope) = self.scope_stack.last().copied() {
            if let Some(record) = self.scopes.get_mut(scope) {
                record.bindings.push(id);
            }
        }
        tracing::debug!(?id, ?animation, ?mode, "scroll binding attached");

        self.recompute_binding(id, frame);
        Ok(id)
    }
}

impl ClockHandle {
    /// Bind `animation` to scroll position.
    ///
    /// The animation stops autoplaying; the binding decides when it plays.
    /// Fails with `InvalidTimeRange` (and installs nothing) when the end
    /// condition resolves before the start.
    pub fn attach_scroll(&self, animation: AnimationId, trigger: ScrollTrigger) -> Result<BindingId> {
        self.update(|inner, frame| inner.install_binding(animation, trigger, frame))
            .unwrap_or(Ok(BindingId::default()))
    }

    pub fn detach_scroll(&self, binding: BindingId) {
        self.update(|inner, _| inner.remove_binding(binding));
    }

    /// Re-arm a one-shot binding and forget toggle history
    pub fn reset_binding(&self, binding: BindingId) {
        self.update(|inner, frame| {
            if let Some(entry) = inner.bindings.get_mut(binding) {
                entry.reset();
                inner.recompute_binding(binding, frame);
            }
        });
    }

    /// Recompute every binding now (after layout changes)
    pub fn refresh_scroll(&self) {
        self.update(|inner, frame| {
            inner.viewport_dirty = false;
            inner.recompute_bindings(frame);
        });
    }

    /// Forward a host viewport event; bindings update on the next frame
    pub fn handle_event(&self, event: ViewportEvent) {
        self.update(|inner, _| {
            match event {
                ViewportEvent::Scroll { y } => inner.viewport.scroll_y = y.max(0.0),
                ViewportEvent::ScrollBy { delta_y } => {
                    inner.viewport.scroll_y = (inner.viewport.scroll_y + delta_y).max(0.0)
                }
                ViewportEvent::Resize { width, height } => {
                    inner.viewport.width = width;
                    inner.viewport.height = height;
                }
            }
            inner.viewport_dirty = true;
        });
    }

    pub fn scroll_to(&self, y: f32) {
        self.handle_event(ViewportEvent::Scroll { y });
    }

    pub fn resize(&self, width: f32, height: f32) {
        self.handle_event(ViewportEvent::Resize { width, height });
    }

    pub fn viewport(&self) -> Viewport {
        self.read(|inner| inner.viewport).unwrap_or_default()
    }

    pub fn binding_count(&self) -> usize {
        self.read(|inner| inner.bindings.len()).unwrap_or(0)
    }

    pub fn has_binding(&self, binding: BindingId) -> bool {
        self.read(|inner| inner.bindings.contains_key(binding))
            .unwrap_or(false)
    }
}
