//! Animation clock
//!
//! The single time source for every tween and timeline. The host calls
//! [`AnimationClock::advance`] once per display frame with a monotonic frame
//! time; the clock steps every active animation in creation order, recomputes
//! scroll bindings if the viewport changed since the previous frame, and then
//! runs the callbacks and completion signals the frame produced.
//!
//! Components schedule work through a [`ClockHandle`], a weak reference that
//! turns every operation into a no-op once the clock is gone.

use crate::animation::Animation;
use crate::callback::{run_all, Fired};
use crate::scope::{ScopeId, ScopeRecord};
use crate::scroll::{BindingId, ScrollBinding};
use crate::timeline::{Position, Timeline};
use folio_core::{Signal, Viewport};
use serde::{Deserialize, Serialize};
use slotmap::{new_key_type, SlotMap};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::{Rc, Weak};

new_key_type! {
    pub struct AnimationId;
}

/// Events kept for [`ClockHandle::drain_events`]
const MAX_EVENTS: usize = 256;

/// Retired transient ids that still report `Complete`
const MAX_RETIRED: usize = 256;

/// Playheads this close to either end are snapped onto it (seconds)
const SNAP_EPSILON: f64 = 1e-9;

/// Playback state of a scheduled animation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationState {
    /// Added but not yet activated by a frame
    Pending,
    Active,
    Paused,
    Complete,
    /// Killed, reverted, or never existed
    Killed,
}

/// Global motion preference
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MotionPreference {
    #[default]
    Full,
    /// Non-essential animations jump straight to their end state
    Reduced,
}

/// Lifecycle notification produced by the clock
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AnimationEvent {
    Started(AnimationId),
    Completed(AnimationId),
    /// Played backward all the way to the start
    ReverseCompleted(AnimationId),
    Killed(AnimationId),
}

/// Work queued while the clock is borrowed, run once it is released
#[derive(Default)]
pub(crate) struct Frame {
    pub(crate) fired: Vec<Fired>,
    pub(crate) completions: Vec<Signal>,
}

impl Frame {
    fn flush(self) {
        run_all(self.fired);
        for signal in self.completions {
            signal.emit();
        }
    }
}

struct Entry {
    animation: Animation,
    state: AnimationState,
    /// Playhead in seconds, `0..=total`
    time: f64,
    reversed: bool,
    autoplay: bool,
    /// Progress is driven by a scroll binding, not by time
    scrubbed: bool,
    started: bool,
    /// Dropped from the clock once it completes forward
    transient: bool,
    signal: Signal,
}

pub(crate) struct ClockInner {
    now: f64,
    frame: u64,
    time_scale: f64,
    motion: MotionPreference,
    entries: SlotMap<AnimationId, Entry>,
    /// Creation order, used for per-frame write order
    order: Vec<AnimationId>,
    events: VecDeque<AnimationEvent>,
    /// Transient entries that completed this frame
    retiring: Vec<AnimationId>,
    retired: VecDeque<(AnimationId, Signal)>,

    pub(crate) viewport: Viewport,
    pub(crate) viewport_dirty: bool,
    pub(crate) bindings: SlotMap<BindingId, ScrollBinding>,
    pub(crate) binding_order: Vec<BindingId>,

    pub(crate) scopes: SlotMap<ScopeId, ScopeRecord>,
    pub(crate) scope_stack: Vec<ScopeId>,
}

impl ClockInner {
    fn new(viewport: Viewport) -> Self {
        Self {
            now: 0.0,
            frame: 0,
            time_scale: 1.0,
            motion: MotionPreference::Full,
            entries: SlotMap::with_key(),
            order: Vec::new(),
            events: VecDeque::new(),
            retiring: Vec::new(),
            retired: VecDeque::new(),
            viewport,
            viewport_dirty: false,
            bindings: SlotMap::with_key(),
            binding_order: Vec::new(),
            scopes: SlotMap::with_key(),
            scope_stack: Vec::new(),
        }
    }

    fn push_event(&mut self, event: AnimationEvent) {
        if self.events.len() == MAX_EVENTS {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }

    pub(crate) fn contains(&self, id: AnimationId) -> bool {
        self.entries.contains_key(id)
    }

    fn insert(&mut self, mut animation: Animation, autoplay: bool, transient: bool) -> AnimationId {
        if self.motion == MotionPreference::Reduced {
            animation.reduce_motion();
        }
        animation.prime();

        let id = self.entries.insert(Entry {
            animation,
            state: AnimationState::Pending,
            time: 0.0,
            reversed: false,
            autoplay,
            scrubbed: false,
            started: false,
            transient,
            signal: Signal::new(),
        });
        self.order.push(id);

        if let Some(scope) = self.scope_stack.last().copied() {
            if let Some(record) = self.scopes.get_mut(scope) {
                record.animations.push(id);
            }
        }

        tracing::debug!(?id, autoplay, transient, "animation added");
        id
    }

    /// Advance to `frame_time`
    fn step(&mut self, frame_time: f64, frame: &mut Frame) {
        let dt = if frame_time.is_finite() {
            let dt = (frame_time - self.now).max(0.0);
            self.now = self.now.max(frame_time);
            dt
        } else {
            0.0
        };
        self.frame += 1;
        let dt = dt * self.time_scale;

        // Scroll and resize events since the last frame collapse into one pass
        if self.viewport_dirty {
            self.viewport_dirty = false;
            self.recompute_bindings(frame);
        }

        let order = self.order.clone();
        for id in order {
            self.step_entry(id, dt, frame);
        }
        self.retire_finished();

        tracing::trace!(frame = self.frame, now = self.now, "clock advanced");
    }

    fn step_entry(&mut self, id: AnimationId, dt: f64, frame: &mut Frame) {
        let Some(entry) = self.entries.get_mut(id) else {
            return;
        };
        if entry.scrubbed {
            return;
        }

        match entry.state {
            AnimationState::Pending if entry.autoplay => {
                entry.state = AnimationState::Active;
                let first = !entry.started;
                entry.started = true;
                entry.animation.render(entry.time, &mut frame.fired);
                if first {
                    self.push_event(AnimationEvent::Started(id));
                }
                self.settle(id, frame);
            }
            AnimationState::Active => {
                let total = entry.animation.total_duration();
                entry.time = if entry.reversed {
                    (entry.time - dt).max(0.0)
                } else {
                    (entry.time + dt).min(total)
                };
                // Accumulated frame deltas can stop a hair short of either end
                if entry.time < SNAP_EPSILON {
                    entry.time = 0.0;
                } else if total - entry.time < SNAP_EPSILON {
                    entry.time = total;
                }
                entry.animation.render(entry.time, &mut frame.fired);
                self.settle(id, frame);
            }
            _ => {}
        }
    }

    /// Transition an active entry that reached either end
    fn settle(&mut self, id: AnimationId, frame: &mut Frame) {
        let Some(entry) = self.entries.get_mut(id) else {
            return;
        };
        if entry.state != AnimationState::Active || entry.scrubbed {
            return;
        }

        let total = entry.animation.total_duration();
        let event = if !entry.reversed && entry.time >= total {
            frame.completions.push(entry.signal.clone());
            if entry.transient {
                self.retiring.push(id);
            }
            AnimationEvent::Completed(id)
        } else if entry.reversed && entry.time <= 0.0 {
            AnimationEvent::ReverseCompleted(id)
        } else {
            return;
        };

        entry.state = AnimationState::Complete;
        tracing::debug!(?id, ?event, "animation settled");
        self.push_event(event);
    }

    /// Drop transient entries that finished forward and are not scroll-bound
    fn retire_finished(&mut self) {
        if self.retiring.is_empty() {
            return;
        }
        let mut retired = Vec::new();
        for id in std::mem::take(&mut self.retiring) {
            let finished = self.entries.get(id).is_some_and(|entry| {
                entry.state == AnimationState::Complete && !entry.reversed
            });
            let bound = self.bindings.values().any(|binding| binding.animation == id);
            if !finished || bound {
                continue;
            }
            if let Some(entry) = self.entries.remove(id) {
                if self.retired.len() == MAX_RETIRED {
                    self.retired.pop_front();
                }
                self.retired.push_back((id, entry.signal));
                retired.push(id);
            }
        }
        if retired.is_empty() {
            return;
        }

        self.order.retain(|id| !retired.contains(id));
        for record in self.scopes.values_mut() {
            record.animations.retain(|id| !retired.contains(id));
        }
        tracing::trace!(count = retired.len(), "transient animations retired");
    }

    fn retired_signal(&self, id: AnimationId) -> Option<&Signal> {
        self.retired
            .iter()
            .find(|(retired, _)| *retired == id)
            .map(|(_, signal)| signal)
    }

    pub(crate) fn play_entry(&mut self, id: AnimationId) {
        let Some(entry) = self.entries.get_mut(id) else {
            return;
        };
        if entry.scrubbed {
            tracing::trace!(?id, "play ignored on scrubbed animation");
            return;
        }

        entry.reversed = false;
        if entry.state == AnimationState::Complete
            && entry.time >= entry.animation.total_duration()
        {
            return;
        }
        entry.state = AnimationState::Active;
        let first = !entry.started;
        entry.started = true;
        if first {
            self.push_event(AnimationEvent::Started(id));
        }
    }

    pub(crate) fn pause_entry(&mut self, id: AnimationId) {
        if let Some(entry) = self.entries.get_mut(id) {
            if matches!(
                entry.state,
                AnimationState::Active | AnimationState::Pending
            ) && !entry.scrubbed
            {
                entry.state = AnimationState::Paused;
            }
        }
    }

    pub(crate) fn reverse_entry(&mut self, id: AnimationId) {
        let Some(entry) = self.entries.get_mut(id) else {
            return;
        };
        if entry.scrubbed {
            return;
        }
        entry.reversed = true;
        // Nothing to play back from
        if entry.time <= 0.0 {
            return;
        }
        entry.state = AnimationState::Active;
    }

    pub(crate) fn restart_entry(&mut self, id: AnimationId, frame: &mut Frame) {
        let Some(entry) = self.entries.get_mut(id) else {
            return;
        };
        entry.reversed = false;
        entry.time = 0.0;
        entry.animation.render(0.0, &mut frame.fired);
        if !entry.scrubbed {
            entry.state = AnimationState::Active;
            entry.started = true;
        }
        self.settle(id, frame);
    }

    pub(crate) fn seek_entry(&mut self, id: AnimationId, time: f64, frame: &mut Frame) {
        let Some(entry) = self.entries.get_mut(id) else {
            return;
        };
        if !time.is_finite() {
            tracing::warn!(?id, time, "ignoring non-finite seek");
            return;
        }

        let total = entry.animation.total_duration();
        entry.time = time.clamp(0.0, total);
        entry.animation.render(entry.time, &mut frame.fired);

        if entry.state == AnimationState::Complete && entry.time < total {
            entry.state = AnimationState::Paused;
        }
        self.settle(id, frame);
    }

    pub(crate) fn set_progress_entry(&mut self, id: AnimationId, progress: f64, frame: &mut Frame) {
        let Some(entry) = self.entries.get(id) else {
            return;
        };
        let span = entry.animation.progress_span();
        let progress = if progress.is_nan() {
            0.0
        } else {
            progress.clamp(0.0, 1.0)
        };
        self.seek_entry(id, progress * span, frame);
    }

    /// Remove an entry without rendering or running callbacks
    pub(crate) fn kill_entry(&mut self, id: AnimationId) -> bool {
        if self.entries.remove(id).is_none() {
            return false;
        }
        self.order.retain(|other| *other != id);

        let orphaned: Vec<BindingId> = self
            .bindings
            .iter()
            .filter(|(_, binding)| binding.animation == id)
            .map(|(binding_id, _)| binding_id)
            .collect();
        for binding in orphaned {
            self.remove_binding(binding);
        }

        tracing::debug!(?id, "animation killed");
        self.push_event(AnimationEvent::Killed(id));
        true
    }

    pub(crate) fn mark_scrubbed(&mut self, id: AnimationId) {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.scrubbed = true;
            entry.autoplay = false;
            entry.state = AnimationState::Active;
            entry.started = true;
        }
    }

    pub(crate) fn disable_autoplay(&mut self, id: AnimationId) {
        if let Some(entry) = self.entries.get_mut(id) {
            entry.autoplay = false;
        }
    }

    fn progress(&self, id: AnimationId) -> f64 {
        let Some(entry) = self.entries.get(id) else {
            return if self.retired_signal(id).is_some() { 1.0 } else { 0.0 };
        };
        let total = entry.animation.total_duration();
        if total.is_finite() {
            return if total > 0.0 {
                (entry.time / total).clamp(0.0, 1.0)
            } else if entry.started {
                1.0
            } else {
                0.0
            };
        }

        // Endless: progress through the current iteration
        let span = entry.animation.iteration_span();
        if span > 0.0 {
            (entry.time % span) / span
        } else {
            0.0
        }
    }
}

// ============================================================================
// Clock (owner)
// ============================================================================

/// The animation clock. Owns every scheduled animation.
pub struct AnimationClock {
    inner: Rc<RefCell<ClockInner>>,
}

impl AnimationClock {
    pub fn new() -> Self {
        Self::with_viewport(Viewport::default())
    }

    pub fn with_viewport(viewport: Viewport) -> Self {
        Self {
            inner: Rc::new(RefCell::new(ClockInner::new(viewport))),
        }
    }

    /// Get a handle to this clock for passing to components
    pub fn handle(&self) -> ClockHandle {
        ClockHandle {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Advance to `frame_time` seconds.
    ///
    /// Frame times that go backward leave the clock where it is.
    pub fn advance(&self, frame_time: f64) {
        let mut frame = Frame::default();
        {
            let Ok(mut inner) = self.inner.try_borrow_mut() else {
                tracing::warn!("advance called re-entrantly, skipping frame");
                return;
            };
            inner.step(frame_time, &mut frame);
        }
        frame.flush();
    }

    /// Advance by `dt` seconds from the current frame time
    pub fn tick(&self, dt: f64) {
        let now = self.now();
        self.advance(now + dt.max(0.0));
    }

    /// Current frame time in seconds
    pub fn now(&self) -> f64 {
        self.inner.borrow().now
    }

    /// Number of frames advanced so far
    pub fn frame_count(&self) -> u64 {
        self.inner.borrow().frame
    }
}

impl Default for AnimationClock {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Handle
// ============================================================================

/// A weak handle to the animation clock
///
/// Every operation is a no-op (returning a neutral value) once the clock has
/// been dropped, or for ids that were killed or reverted.
#[derive(Clone)]
pub struct ClockHandle {
    inner: Weak<RefCell<ClockInner>>,
}

impl ClockHandle {
    /// A handle that is not attached to any clock
    pub fn detached() -> Self {
        Self { inner: Weak::new() }
    }

    pub fn is_alive(&self) -> bool {
        self.inner.strong_count() > 0
    }

    /// Mutate the clock, then run whatever callbacks the change produced
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut ClockInner, &mut Frame) -> R) -> Option<R> {
        let inner = self.inner.upgrade()?;
        let mut frame = Frame::default();
        let result = {
            let Ok(mut guard) = inner.try_borrow_mut() else {
                tracing::warn!("clock busy, dropping operation");
                return None;
            };
            f(&mut guard, &mut frame)
        };
        frame.flush();
        Some(result)
    }

    pub(crate) fn read<R>(&self, f: impl FnOnce(&ClockInner) -> R) -> Option<R> {
        let inner = self.inner.upgrade()?;
        let guard = inner.try_borrow().ok()?;
        Some(f(&guard))
    }

    // =========================================================================
    // Scheduling
    // =========================================================================

    /// Schedule an animation; it activates on the next frame
    pub fn add(&self, animation: impl Into<Animation>) -> AnimationId {
        let animation = animation.into();
        self.update(|inner, _| inner.insert(animation, true, false))
            .unwrap_or_default()
    }

    /// Schedule a fire-and-forget animation.
    ///
    /// Once it completes forward it leaves the clock: `state` keeps reporting
    /// `Complete` for a while, but it can no longer be reversed or restarted.
    pub fn add_transient(&self, animation: impl Into<Animation>) -> AnimationId {
        let animation = animation.into();
        self.update(|inner, _| inner.insert(animation, true, true))
            .unwrap_or_default()
    }

    /// Schedule an animation that waits for [`play`](Self::play)
    pub fn add_paused(&self, animation: impl Into<Animation>) -> AnimationId {
        let animation = animation.into();
        self.update(|inner, _| inner.insert(animation, false, false))
            .unwrap_or_default()
    }

    /// Run `f` after `delay` seconds of clock time
    pub fn delayed_call<F: FnMut() + 'static>(&self, delay: f64, f: F) -> AnimationId {
        let mut timeline = Timeline::new();
        timeline.call(f, Position::Absolute(delay.max(0.0)));
        self.add_transient(timeline)
    }

    // =========================================================================
    // Playback control
    // =========================================================================

    pub fn play(&self, id: AnimationId) {
        self.update(|inner, _| inner.play_entry(id));
    }

    pub fn pause(&self, id: AnimationId) {
        self.update(|inner, _| inner.pause_entry(id));
    }

    /// Play backward from the current position
    pub fn reverse(&self, id: AnimationId) {
        self.update(|inner, _| inner.reverse_entry(id));
    }

    /// Jump to the start and play forward
    pub fn restart(&self, id: AnimationId) {
        self.update(|inner, frame| inner.restart_entry(id, frame));
    }

    /// Stop immediately. No further writes, no callbacks.
    pub fn kill(&self, id: AnimationId) {
        self.update(|inner, _| inner.kill_entry(id));
    }

    /// Move the playhead to `time` seconds and render there
    pub fn seek(&self, id: AnimationId, time: f64) {
        self.update(|inner, frame| inner.seek_entry(id, time, frame));
    }

    /// Seek to a fraction of the animation
    pub fn set_progress(&self, id: AnimationId, progress: f64) {
        self.update(|inner, frame| inner.set_progress_entry(id, progress, frame));
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn state(&self, id: AnimationId) -> AnimationState {
        self.read(|inner| match inner.entries.get(id) {
            Some(entry) => entry.state,
            None if inner.retired_signal(id).is_some() => AnimationState::Complete,
            None => AnimationState::Killed,
        })
        .unwrap_or(AnimationState::Killed)
    }

    pub fn is_complete(&self, id: AnimationId) -> bool {
        self.state(id) == AnimationState::Complete
    }

    pub fn is_reversed(&self, id: AnimationId) -> bool {
        self.read(|inner| inner.entries.get(id).map(|entry| entry.reversed))
            .flatten()
            .unwrap_or(false)
    }

    /// Fraction of the animation played, `0.0..=1.0`
    pub fn progress(&self, id: AnimationId) -> f64 {
        self.read(|inner| inner.progress(id)).unwrap_or(0.0)
    }

    /// Playhead in seconds
    pub fn time(&self, id: AnimationId) -> Option<f64> {
        self.read(|inner| inner.entries.get(id).map(|entry| entry.time))
            .flatten()
    }

    /// Delay plus all iterations
    pub fn duration(&self, id: AnimationId) -> Option<f64> {
        self.read(|inner| {
            inner
                .entries
                .get(id)
                .map(|entry| entry.animation.total_duration())
        })
        .flatten()
    }

    /// Signal emitted when the animation completes forward.
    ///
    /// Unknown ids get a signal that never fires.
    pub fn completion(&self, id: AnimationId) -> Signal {
        self.read(|inner| {
            inner
                .entries
                .get(id)
                .map(|entry| &entry.signal)
                .or_else(|| inner.retired_signal(id))
                .cloned()
        })
        .flatten()
        .unwrap_or_default()
    }

    /// Number of scheduled animations (any state but killed; retired
    /// transients are gone)
    pub fn len(&self) -> usize {
        self.read(|inner| inner.entries.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of animations currently playing
    pub fn active_count(&self) -> usize {
        self.read(|inner| {
            inner
                .entries
                .values()
                .filter(|entry| entry.state == AnimationState::Active)
                .count()
        })
        .unwrap_or(0)
    }

    pub fn now(&self) -> f64 {
        self.read(|inner| inner.now).unwrap_or(0.0)
    }

    /// Take all lifecycle events recorded since the last drain
    pub fn drain_events(&self) -> Vec<AnimationEvent> {
        self.update(|inner, _| inner.events.drain(..).collect())
            .unwrap_or_default()
    }

    // =========================================================================
    // Global settings
    // =========================================================================

    /// Global speed multiplier (1.0 is real time)
    pub fn set_time_scale(&self, scale: f64) {
        if !scale.is_finite() || scale < 0.0 {
            tracing::warn!(scale, "ignoring invalid time scale");
            return;
        }
        self.update(|inner, _| inner.time_scale = scale);
    }

    pub fn time_scale(&self) -> f64 {
        self.read(|inner| inner.time_scale).unwrap_or(1.0)
    }

    /// Applies to animations added afterwards
    pub fn set_motion_preference(&self, motion: MotionPreference) {
        self.update(|inner, _| {
            tracing::debug!(?motion, "motion preference changed");
            inner.motion = motion;
        });
    }

    pub fn motion_preference(&self) -> MotionPreference {
        self.read(|inner| inner.motion).unwrap_or_default()
    }
}

impl std::fmt::Debug for ClockHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClockHandle")
            .field("alive", &self.is_alive())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repeat::Repeat;
    use crate::tween::Tween;
    use folio_core::{Node, Target, TargetRef, Value};
    use std::cell::Cell;

    fn node(id: &str) -> (Rc<RefCell<Node>>, TargetRef) {
        let node = Rc::new(RefCell::new(Node::new(id)));
        let target: TargetRef = node.clone();
        (node, target)
    }

    fn fade(target: &TargetRef, seconds: f64) -> Tween {
        Tween::build(target)
            .from_to("opacity", 0.0, 1.0)
            .duration(seconds)
            .finish()
            .unwrap()
    }

    #[test]
    fn test_activates_on_next_frame_and_completes() {
        let clock = AnimationClock::new();
        let handle = clock.handle();
        let (node, target) = node("a");

        let id = handle.add(fade(&target, 1.0));
        assert_eq!(handle.state(id), AnimationState::Pending);

        clock.advance(0.0);
        assert_eq!(handle.state(id), AnimationState::Active);
        clock.advance(0.5);
        assert_eq!(node.borrow().number("opacity"), Some(0.5));
        clock.advance(1.0);
        assert_eq!(handle.state(id), AnimationState::Complete);
        assert!(handle.completion(id).is_set());

        assert_eq!(
            handle.drain_events(),
            vec![AnimationEvent::Started(id), AnimationEvent::Completed(id)]
        );
    }

    #[test]
    fn test_kill_is_idempotent_and_stops_writes() {
        let clock = AnimationClock::new();
        let handle = clock.handle();
        let (node, target) = node("a");

        let id = handle.add(fade(&target, 1.0));
        clock.advance(0.0);
        clock.advance(0.2);
        let writes = node.borrow().write_count();

        handle.kill(id);
        handle.kill(id);
        clock.advance(0.4);
        assert_eq!(node.borrow().write_count(), writes);
        assert_eq!(handle.state(id), AnimationState::Killed);
    }

    #[test]
    fn test_pause_and_resume() {
        let clock = AnimationClock::new();
        let handle = clock.handle();
        let (node, target) = node("a");

        let id = handle.add(fade(&target, 1.0));
        clock.advance(0.0);
        clock.advance(0.25);
        handle.pause(id);
        clock.advance(0.75);
        assert_eq!(node.borrow().number("opacity"), Some(0.25));

        handle.play(id);
        clock.advance(1.0);
        assert_eq!(node.borrow().number("opacity"), Some(0.5));
    }

    #[test]
    fn test_reverse_returns_to_start() {
        let clock = AnimationClock::new();
        let handle = clock.handle();
        let (node, target) = node("a");

        let id = handle.add(fade(&target, 0.5));
        clock.advance(0.0);
        clock.advance(1.0);
        assert!(handle.is_complete(id));

        handle.reverse(id);
        clock.advance(1.25);
        assert_eq!(handle.state(id), AnimationState::Active);
        clock.advance(2.0);
        assert_eq!(node.borrow().number("opacity"), Some(0.0));
        assert!(handle
            .drain_events()
            .contains(&AnimationEvent::ReverseCompleted(id)));
    }

    #[test]
    fn test_seek_and_progress() {
        let clock = AnimationClock::new();
        let handle = clock.handle();
        let (node, target) = node("a");

        let id = handle.add_paused(fade(&target, 2.0));
        handle.set_progress(id, 0.25);
        assert_eq!(node.borrow().number("opacity"), Some(0.25));
        assert_eq!(handle.progress(id), 0.25);

        clock.advance(1.0);
        assert_eq!(handle.state(id), AnimationState::Pending);
    }

    #[test]
    fn test_time_scale() {
        let clock = AnimationClock::new();
        let handle = clock.handle();
        let (node, target) = node("a");
        handle.set_time_scale(0.5);

        handle.add(fade(&target, 1.0));
        clock.advance(0.0);
        clock.advance(1.0);
        assert_eq!(node.borrow().number("opacity"), Some(0.5));
    }

    #[test]
    fn test_callbacks_can_reenter_clock() {
        let clock = AnimationClock::new();
        let handle = clock.handle();
        let (node, target) = node("a");

        let chained = Rc::new(Cell::new(None));
        let (inner_handle, inner_target, slot) = (handle.clone(), target.clone(), chained.clone());
        let first = Tween::build(&target)
            .to("x", 10.0)
            .duration(0.1)
            .on_complete(move || {
                let next = Tween::build(&inner_target)
                    .to("x", 20.0)
                    .duration(0.1)
                    .finish()
                    .unwrap();
                slot.set(Some(inner_handle.add(next)));
            })
            .finish()
            .unwrap();
        handle.add(first);

        for frame in 0..20 {
            clock.advance(frame as f64 * 0.05);
        }
        assert!(chained.get().is_some());
        assert_eq!(node.borrow().number("x"), Some(20.0));
    }

    #[test]
    fn test_infinite_repeat_never_completes() {
        let clock = AnimationClock::new();
        let handle = clock.handle();
        let (_node, target) = node("orb");

        let id = handle.add(
            Tween::build(&target)
                .to("rotation", 360.0)
                .duration(1.0)
                .repeat(Repeat::Infinite)
                .yoyo(true)
                .finish()
                .unwrap(),
        );
        for frame in 0..600 {
            clock.advance(frame as f64 / 60.0);
        }
        assert_eq!(handle.state(id), AnimationState::Active);
        assert!(handle.progress(id) < 1.0);
    }

    #[test]
    fn test_reduced_motion_collapses_non_essential() {
        let clock = AnimationClock::new();
        let handle = clock.handle();
        handle.set_motion_preference(MotionPreference::Reduced);
        let (node, target) = node("a");
        let (gate, gate_target) = self::node("gate");

        let decorative = handle.add(fade(&target, 2.0));
        let essential = handle.add(
            Tween::build(&gate_target)
                .from_to("progress", 0.0, 100.0)
                .duration(2.0)
                .essential()
                .finish()
                .unwrap(),
        );

        clock.advance(0.0);
        assert!(handle.is_complete(decorative));
        assert_eq!(node.borrow().number("opacity"), Some(1.0));
        assert!(!handle.is_complete(essential));
        assert_eq!(gate.borrow().number("progress"), Some(0.0));
    }

    #[test]
    fn test_dead_clock_handle_is_noop() {
        let handle = {
            let clock = AnimationClock::new();
            clock.handle()
        };
        let (_node, target) = node("a");
        let id = handle.add(fade(&target, 1.0));
        handle.play(id);
        assert_eq!(handle.state(id), AnimationState::Killed);
        assert!(!handle.is_alive());
    }

    #[test]
    fn test_transient_animations_leave_the_clock() {
        let clock = AnimationClock::new();
        let handle = clock.handle();
        let (node, target) = node("a");

        let mut first = AnimationId::default();
        for frame in 0..1000 {
            let id = handle.add_transient(fade(&target, 0.05));
            if frame == 0 {
                first = id;
            }
            clock.advance(frame as f64 * 0.1);
            assert!(handle.len() <= 2, "{} scheduled at frame {}", handle.len(), frame);
        }
        clock.advance(1000.0);
        assert!(handle.is_empty());
        assert_eq!(node.borrow().number("opacity"), Some(1.0));

        // Old ids fall out of the tombstones and read as gone
        assert_eq!(handle.state(first), AnimationState::Killed);
        let completed = handle
            .drain_events()
            .iter()
            .filter(|event| matches!(event, AnimationEvent::Completed(_)))
            .count();
        assert!(completed > 0);
    }

    #[test]
    fn test_retired_transient_still_reports_complete() {
        let clock = AnimationClock::new();
        let handle = clock.handle();
        let (_node, target) = node("a");

        let id = handle.add_transient(fade(&target, 0.5));
        let kept = handle.add(fade(&target, 0.5));
        clock.advance(0.0);
        clock.advance(1.0);

        assert_eq!(handle.len(), 1);
        assert_eq!(handle.state(id), AnimationState::Complete);
        assert!(handle.is_complete(id));
        assert_eq!(handle.progress(id), 1.0);
        assert!(handle.completion(id).is_set());
        // Regular animations stay for reverse and restart
        assert!(handle.is_complete(kept));
        assert_eq!(handle.time(kept), Some(0.5));
    }

    #[test]
    fn test_delayed_call_leaves_the_clock() {
        let clock = AnimationClock::new();
        let handle = clock.handle();
        let calls = Rc::new(Cell::new(0));
        let counter = calls.clone();

        let id = handle.delayed_call(0.5, move || counter.set(counter.get() + 1));
        clock.advance(0.0);
        clock.advance(0.25);
        assert_eq!(handle.len(), 1);
        clock.advance(0.5);
        clock.advance(2.0);

        assert_eq!(calls.get(), 1);
        assert!(handle.is_empty());
        assert!(handle.is_complete(id));
    }

    #[test]
    fn test_writes_follow_creation_order() {
        let clock = AnimationClock::new();
        let handle = clock.handle();
        let (node, target) = node("a");
        node.borrow_mut().set("x", Value::number(0.0));

        handle.add(Tween::set(&target, &[("x", Value::number(1.0))]));
        handle.add(Tween::set(&target, &[("x", Value::number(2.0))]));
        clock.advance(0.0);
        assert_eq!(node.borrow().number("x"), Some(2.0));
    }
}
