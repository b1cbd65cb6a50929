//! Timeline orchestration for multiple animations
//!
//! Children are placed at offsets from the timeline start. Offsets are given
//! as [`Position`]s: absolute, relative to the end of the previously added
//! child (`"+=0.2"`, `"-=0.3"`, `">"`), or relative to its start (`"<"`).
//! Rendering the timeline at a time renders every child whose local time
//! changed; zero-length call children fire when the playhead crosses them
//! moving forward.

use crate::animation::Animation;
use crate::callback::{callback, progress_callback, Callback, Callbacks, Fired};
use crate::error::{AnimationError, Result};
use crate::repeat::{Repeat, RepeatPolicy};
use slotmap::{new_key_type, SlotMap};
use std::str::FromStr;

new_key_type! {
    pub struct TimelineEntryId;
}

/// Where a child is placed inside a timeline
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Position {
    /// Seconds from the timeline start
    Absolute(f64),
    /// Offset from the end of the previously added child
    AfterPrevious(f64),
    /// Offset from the start of the previously added child
    WithPrevious(f64),
}

impl Default for Position {
    fn default() -> Self {
        Position::AfterPrevious(0.0)
    }
}

impl FromStr for Position {
    type Err = AnimationError;

    fn from_str(s: &str) -> Result<Self> {
        let input = s.trim();
        let invalid = || AnimationError::InvalidPosition(input.to_string());

        let offset = |rest: &str| -> Result<f64> {
            let rest = rest.trim();
            if rest.is_empty() {
                return Ok(0.0);
            }
            let (sign, number) = if let Some(n) = rest.strip_prefix("+=") {
                (1.0, n)
            } else if let Some(n) = rest.strip_prefix("-=") {
                (-1.0, n)
            } else {
                (1.0, rest)
            };
            number
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(|n| sign * n)
                .ok_or_else(invalid)
        };

        if input.is_empty() {
            return Ok(Position::default());
        }
        if let Some(rest) = input.strip_prefix('<') {
            return offset(rest).map(Position::WithPrevious);
        }
        if let Some(rest) = input.strip_prefix('>') {
            return offset(rest).map(Position::AfterPrevious);
        }
        if input.starts_with("+=") || input.starts_with("-=") {
            return offset(input).map(Position::AfterPrevious);
        }
        input
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .map(Position::Absolute)
            .ok_or_else(invalid)
    }
}

impl From<f64> for Position {
    fn from(seconds: f64) -> Self {
        Position::Absolute(seconds)
    }
}

/// A child of a timeline
pub enum TimelineChild {
    Animation(Animation),
    /// Zero-length callback
    Call(Callback),
}

/// An entry in a timeline
struct TimelineEntry {
    /// Offset in seconds from timeline start
    offset: f64,
    child: TimelineChild,
    /// Local time the child was last rendered at
    last_time: Option<f64>,
}

impl TimelineEntry {
    fn render(&mut self, timeline_time: f64, fired: &mut Vec<Fired>) {
        let local = timeline_time - self.offset;
        match &mut self.child {
            TimelineChild::Animation(animation) => {
                let time = local.min(animation.total_duration());
                let changed = match self.last_time {
                    None => time >= 0.0,
                    Some(prev) => prev != time && !(prev < 0.0 && time < 0.0),
                };
                if changed {
                    animation.render(time, fired);
                    self.last_time = Some(time);
                }
            }
            TimelineChild::Call(cb) => {
                let crossed = local >= 0.0 && self.last_time.map_or(true, |prev| prev < 0.0);
                if crossed {
                    fired.push(Fired::Plain(cb.clone()));
                }
                self.last_time = Some(local);
            }
        }
    }
}

/// A timeline that orchestrates multiple animations
pub struct Timeline {
    entries: SlotMap<TimelineEntryId, TimelineEntry>,
    order: Vec<TimelineEntryId>,
    /// Length of one iteration (end of the last-ending child)
    period: f64,
    last_start: f64,
    last_end: f64,
    delay: f64,
    repeat: RepeatPolicy,
    callbacks: Callbacks,

    started: bool,
    completed: bool,
    child_time: Option<f64>,
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            entries: SlotMap::with_key(),
            order: Vec::new(),
            period: 0.0,
            last_start: 0.0,
            last_end: 0.0,
            delay: 0.0,
            repeat: RepeatPolicy::ONCE,
            callbacks: Callbacks::default(),
            started: false,
            completed: false,
            child_time: None,
        }
    }

    /// Delay before the first iteration (negative or non-finite becomes 0)
    pub fn with_delay(mut self, seconds: f64) -> Self {
        if !seconds.is_finite() || seconds < 0.0 {
            tracing::warn!(seconds, "ignoring invalid timeline delay");
            self.delay = 0.0;
        } else {
            self.delay = seconds;
        }
        self
    }

    pub fn with_repeat(mut self, repeat: Repeat) -> Self {
        self.repeat.repeat = repeat;
        self
    }

    pub fn with_yoyo(mut self, yoyo: bool) -> Self {
        self.repeat.yoyo = yoyo;
        self
    }

    pub fn on_start<F: FnMut() + 'static>(mut self, f: F) -> Self {
        self.callbacks.on_start = Some(callback(f));
        self
    }

    pub fn on_update<F: FnMut(f64) + 'static>(mut self, f: F) -> Self {
        self.callbacks.on_update = Some(progress_callback(f));
        self
    }

    pub fn on_complete<F: FnMut() + 'static>(mut self, f: F) -> Self {
        self.callbacks.on_complete = Some(callback(f));
        self
    }

    pub(crate) fn set_callbacks(&mut self, callbacks: Callbacks) {
        self.callbacks = callbacks;
    }

    /// Add an animation at `position`
    pub fn add(&mut self, child: impl Into<Animation>, position: Position) -> TimelineEntryId {
        let child = child.into();
        let offset = self.resolve_position(position);
        let span = child.total_duration();
        self.push(offset, span, TimelineChild::Animation(child))
    }

    /// Add an animation right after the previously added child
    pub fn then(&mut self, child: impl Into<Animation>) -> TimelineEntryId {
        self.add(child, Position::default())
    }

    /// Add an animation at a position string such as `"-=0.3"` or `"<"`
    pub fn add_at(&mut self, child: impl Into<Animation>, position: &str) -> Result<TimelineEntryId> {
        let position = position.parse::<Position>()?;
        Ok(self.add(child, position))
    }

    /// Add a zero-length callback
    pub fn call<F: FnMut() + 'static>(&mut self, f: F, position: Position) -> TimelineEntryId {
        let offset = self.resolve_position(position);
        self.push(offset, 0.0, TimelineChild::Call(callback(f)))
    }

    fn resolve_position(&self, position: Position) -> f64 {
        let at = match position {
            Position::Absolute(seconds) => seconds,
            Position::AfterPrevious(delta) => self.last_end + delta,
            Position::WithPrevious(delta) => self.last_start + delta,
        };
        if at.is_finite() {
            at.max(0.0)
        } else {
            // Placing after an endless child
            self.last_start
        }
    }

    fn push(&mut self, offset: f64, span: f64, child: TimelineChild) -> TimelineEntryId {
        let id = self.entries.insert(TimelineEntry {
            offset,
            child,
            last_time: None,
        });
        self.order.push(id);

        self.last_start = offset;
        self.last_end = offset + span;
        self.period = self.period.max(offset + span);
        id
    }

    /// Offset of a child in seconds
    pub fn offset(&self, id: TimelineEntryId) -> Option<f64> {
        self.entries.get(id).map(|entry| entry.offset)
    }

    /// Offsets of every child in insertion order
    pub fn offsets(&self) -> Vec<f64> {
        self.order
            .iter()
            .filter_map(|id| self.offset(*id))
            .collect()
    }

    pub fn child(&self, id: TimelineEntryId) -> Option<&TimelineChild> {
        self.entries.get(id).map(|entry| &entry.child)
    }

    /// Children in insertion order
    pub fn children(&self) -> impl Iterator<Item = &TimelineChild> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.entries.get(*id).map(|entry| &entry.child))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Length of one iteration, excluding delay
    pub fn duration(&self) -> f64 {
        self.period
    }

    pub fn delay(&self) -> f64 {
        self.delay
    }

    pub fn repeat_policy(&self) -> RepeatPolicy {
        self.repeat
    }

    pub fn total_duration(&self) -> f64 {
        self.delay + self.repeat.total_duration(self.period)
    }

    pub fn iteration_span(&self) -> f64 {
        self.delay + self.period
    }

    pub(crate) fn prime(&mut self) {
        for entry in self.entries.values_mut() {
            if let TimelineChild::Animation(animation) = &mut entry.child {
                animation.prime();
            }
        }
    }

    /// Collapse non-essential children; offsets are kept
    pub(crate) fn reduce_motion(&mut self) {
        let mut period: f64 = 0.0;
        for entry in self.entries.values_mut() {
            let span = match &mut entry.child {
                TimelineChild::Animation(animation) => {
                    animation.reduce_motion();
                    animation.total_duration()
                }
                TimelineChild::Call(_) => 0.0,
            };
            period = period.max(entry.offset + span);
        }
        self.period = period;
        if self.period <= 0.0 {
            self.repeat = RepeatPolicy::ONCE;
        }
    }

    /// Render the timeline at `time` seconds from its start (delay included)
    pub(crate) fn render(&mut self, time: f64, fired: &mut Vec<Fired>) {
        if time < self.delay {
            if self.started {
                self.render_children(-1.0, fired);
                self.started = false;
                self.completed = false;
                self.callbacks.update(0.0, fired);
            }
            return;
        }

        if !self.started {
            self.started = true;
            self.callbacks.start(fired);
        }

        let cycle = self.repeat.locate(time - self.delay, self.period);
        let child_time = if cycle.reversed {
            self.period - cycle.local
        } else {
            cycle.local
        };
        self.render_children(child_time, fired);
        self.callbacks.update(cycle.fraction(self.period), fired);

        if cycle.finished {
            if !self.completed {
                self.completed = true;
                self.callbacks.complete(fired);
            }
        } else {
            self.completed = false;
        }
    }

    fn render_children(&mut self, time: f64, fired: &mut Vec<Fired>) {
        // Moving backward, later children rewind first so that earlier
        // children's start values win on shared properties.
        let backward = self.child_time.is_some_and(|prev| time < prev);
        self.child_time = Some(time);

        let count = self.order.len();
        for step in 0..count {
            let index = if backward { count - 1 - step } else { step };
            let id = self.order[index];
            if let Some(entry) = self.entries.get_mut(id) {
                entry.render(time, fired);
            }
        }
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Timeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Timeline")
            .field("children", &self.order.len())
            .field("duration", &self.period)
            .field("delay", &self.delay)
            .field("repeat", &self.repeat)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::run_all;
    use crate::tween::Tween;
    use folio_core::{Node, Target, TargetRef, Value};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    fn node(id: &str) -> (Rc<RefCell<Node>>, TargetRef) {
        let node = Rc::new(RefCell::new(Node::new(id)));
        let target: TargetRef = node.clone();
        (node, target)
    }

    fn slide(target: &TargetRef, seconds: f64) -> Tween {
        Tween::build(target)
            .from_to("x", 0.0, 100.0)
            .duration(seconds)
            .immediate_render(false)
            .finish()
            .unwrap()
    }

    fn render(timeline: &mut Timeline, time: f64) {
        let mut fired = Vec::new();
        timeline.render(time, &mut fired);
        run_all(fired);
    }

    #[test]
    fn test_parse_positions() {
        assert_eq!("".parse::<Position>(), Ok(Position::AfterPrevious(0.0)));
        assert_eq!(">".parse::<Position>(), Ok(Position::AfterPrevious(0.0)));
        assert_eq!("-=0.3".parse::<Position>(), Ok(Position::AfterPrevious(-0.3)));
        assert_eq!("+=1".parse::<Position>(), Ok(Position::AfterPrevious(1.0)));
        assert_eq!("<".parse::<Position>(), Ok(Position::WithPrevious(0.0)));
        assert_eq!("<0.2".parse::<Position>(), Ok(Position::WithPrevious(0.2)));
        assert_eq!("2.5".parse::<Position>(), Ok(Position::Absolute(2.5)));
        assert!(matches!(
            "soon".parse::<Position>(),
            Err(AnimationError::InvalidPosition(_))
        ));
    }

    #[test]
    fn test_sequencing_and_overlap() {
        let (_a, a) = node("a");
        let (_b, b) = node("b");
        let mut timeline = Timeline::new();
        let first = timeline.then(slide(&a, 0.5));
        let second = timeline.add_at(slide(&b, 1.0), "-=0.3").unwrap();
        let third = timeline.add(slide(&a, 1.0), Position::WithPrevious(0.0));

        assert_eq!(timeline.offset(first), Some(0.0));
        assert!((timeline.offset(second).unwrap() - 0.2).abs() < 1e-9);
        assert_eq!(timeline.offset(third), timeline.offset(second));
        assert!((timeline.duration() - 1.2).abs() < 1e-9);
    }

    #[test]
    fn test_offsets_clamp_at_zero() {
        let (_a, a) = node("a");
        let mut timeline = Timeline::new();
        let id = timeline.add_at(slide(&a, 0.5), "-=2").unwrap();
        assert_eq!(timeline.offset(id), Some(0.0));
    }

    #[test]
    fn test_children_render_at_local_time() {
        let (a_node, a) = node("a");
        let (b_node, b) = node("b");
        let mut timeline = Timeline::new();
        timeline.then(slide(&a, 1.0));
        timeline.then(slide(&b, 1.0));

        render(&mut timeline, 0.5);
        assert_eq!(a_node.borrow().number("x"), Some(50.0));
        assert_eq!(b_node.borrow().get("x"), None);

        render(&mut timeline, 1.5);
        assert_eq!(a_node.borrow().number("x"), Some(100.0));
        assert_eq!(b_node.borrow().number("x"), Some(50.0));
    }

    #[test]
    fn test_call_fires_on_forward_crossing() {
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        let mut timeline = Timeline::new();
        timeline.call(move || counter.set(counter.get() + 1), Position::Absolute(1.0));

        render(&mut timeline, 0.5);
        assert_eq!(hits.get(), 0);
        render(&mut timeline, 1.0);
        render(&mut timeline, 1.0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn test_backward_restores_shared_property() {
        let (node, target) = node("a");
        node.borrow_mut().set("x", Value::number(0.0));

        let mut timeline = Timeline::new();
        timeline.then(
            Tween::build(&target)
                .to("x", 100.0)
                .duration(1.0)
                .finish()
                .unwrap(),
        );
        timeline.then(
            Tween::build(&target)
                .to("x", 300.0)
                .duration(1.0)
                .finish()
                .unwrap(),
        );

        for frame in 0..=20 {
            render(&mut timeline, frame as f64 * 0.1);
        }
        assert_eq!(node.borrow().number("x"), Some(300.0));

        render(&mut timeline, 0.0);
        assert_eq!(node.borrow().number("x"), Some(0.0));
    }

    #[test]
    fn test_repeat_and_complete() {
        let (_n, target) = node("a");
        let completes = Rc::new(Cell::new(0));
        let counter = completes.clone();
        let mut timeline = Timeline::new()
            .with_repeat(Repeat::Count(1))
            .on_complete(move || counter.set(counter.get() + 1));
        timeline.then(slide(&target, 0.5));
        assert_eq!(timeline.total_duration(), 1.0);

        render(&mut timeline, 0.75);
        assert_eq!(completes.get(), 0);
        render(&mut timeline, 1.0);
        render(&mut timeline, 1.2);
        assert_eq!(completes.get(), 1);
    }
}
