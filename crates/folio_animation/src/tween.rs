//! Property tweens
//!
//! A [`Tween`] interpolates one or more properties of a set of targets over a
//! duration. Endpoints that are not given explicitly (or are relative, `+=N`)
//! are read from the target the first time the tween activates, so a tween
//! chained after another one starts from wherever the first one left off.

use crate::callback::{callback, progress_callback, Callbacks, Fired};
use crate::easing::Easing;
use crate::error::{AnimationError, Result};
use crate::repeat::{Repeat, RepeatPolicy};
use folio_core::{default_for, Targets, Value, WeakTargetRef};
use smallvec::SmallVec;

/// Duration used when none is given (seconds)
pub const DEFAULT_DURATION: f64 = 0.5;

/// One end of a property interpolation
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Endpoint {
    Absolute(Value),
    /// Offset from the target's value at activation (`+=N` / `-=N`)
    Relative(f32),
    /// The target's value at activation
    Current,
}

impl Endpoint {
    /// Parse `"1"`, `"-100px"`, `"#ff0000"`, `"+=20"` or `"-=0.5"`
    pub fn parse(property: &str, input: &str) -> Result<Endpoint> {
        let s = input.trim();
        let invalid = || AnimationError::InvalidProperty {
            property: property.to_string(),
            value: input.to_string(),
        };

        let relative = |rest: &str| -> Option<f32> { rest.trim().parse::<Value>().ok()?.as_f32() };
        if let Some(rest) = s.strip_prefix("+=") {
            return relative(rest).map(Endpoint::Relative).ok_or_else(invalid);
        }
        if let Some(rest) = s.strip_prefix("-=") {
            return relative(rest)
                .map(|delta| Endpoint::Relative(-delta))
                .ok_or_else(invalid);
        }

        s.parse::<Value>()
            .map(Endpoint::Absolute)
            .map_err(|_| invalid())
    }

    fn resolve(&self, base: Value) -> Value {
        match self {
            Endpoint::Absolute(value) => *value,
            Endpoint::Relative(delta) => base.offset(*delta),
            Endpoint::Current => base,
        }
    }

    fn absolute(&self) -> Option<Value> {
        match self {
            Endpoint::Absolute(value) => Some(*value),
            _ => None,
        }
    }
}

impl From<f32> for Endpoint {
    fn from(value: f32) -> Self {
        Endpoint::Absolute(Value::number(value))
    }
}

impl From<Value> for Endpoint {
    fn from(value: Value) -> Self {
        Endpoint::Absolute(value)
    }
}

/// Requested interpolation for one property
#[derive(Clone, Debug, PartialEq)]
pub struct PropertySpec {
    pub property: String,
    pub from: Endpoint,
    pub to: Endpoint,
}

/// Resolved interpolation for one (target, property) pair
#[derive(Clone)]
struct Track {
    target: WeakTargetRef,
    property: String,
    from: Value,
    to: Value,
    /// Explicit start value, written immediately when the tween is added
    primes: bool,
}

/// A property tween over a set of targets
#[derive(Clone)]
pub struct Tween {
    targets: Targets,
    properties: SmallVec<[PropertySpec; 4]>,
    duration: f64,
    delay: f64,
    easing: Easing,
    repeat: RepeatPolicy,
    essential: bool,
    immediate_render: bool,
    callbacks: Callbacks,

    tracks: Vec<Track>,
    resolved: bool,
    started: bool,
    completed: bool,
}

impl Tween {
    /// Start building a tween over `targets`
    pub fn build(targets: impl Into<Targets>) -> TweenBuilder {
        TweenBuilder::new(targets.into())
    }

    /// Zero-duration tween that jumps `targets` to the given values
    pub fn set(targets: impl Into<Targets>, values: &[(&str, Value)]) -> Tween {
        let mut tween = Tween::new(targets.into());
        tween.duration = 0.0;
        for (property, value) in values {
            tween.spec_mut(property).to = Endpoint::Absolute(*value);
        }
        tween
    }

    fn new(targets: Targets) -> Self {
        Self {
            targets,
            properties: SmallVec::new(),
            duration: DEFAULT_DURATION,
            delay: 0.0,
            easing: Easing::default(),
            repeat: RepeatPolicy::ONCE,
            essential: false,
            immediate_render: false,
            callbacks: Callbacks::default(),
            tracks: Vec::new(),
            resolved: false,
            started: false,
            completed: false,
        }
    }

    fn spec_mut(&mut self, property: &str) -> &mut PropertySpec {
        let index = match self.properties.iter().position(|p| p.property == property) {
            Some(index) => index,
            None => {
                self.properties.push(PropertySpec {
                    property: property.to_string(),
                    from: Endpoint::Current,
                    to: Endpoint::Current,
                });
                self.properties.len() - 1
            }
        };
        &mut self.properties[index]
    }

    pub fn targets(&self) -> &Targets {
        &self.targets
    }

    pub fn properties(&self) -> &[PropertySpec] {
        &self.properties
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    pub fn delay(&self) -> f64 {
        self.delay
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    pub fn repeat_policy(&self) -> RepeatPolicy {
        self.repeat
    }

    pub fn is_essential(&self) -> bool {
        self.essential
    }

    pub fn callbacks(&self) -> &Callbacks {
        &self.callbacks
    }

    /// Delay plus every iteration (infinite for endless repeats)
    pub fn total_duration(&self) -> f64 {
        self.delay + self.repeat.total_duration(self.duration)
    }

    /// Delay plus a single iteration
    pub fn iteration_span(&self) -> f64 {
        self.delay + self.duration
    }

    pub(crate) fn set_delay(&mut self, delay: f64) {
        self.delay = delay.max(0.0);
    }

    pub(crate) fn take_callbacks(&mut self) -> Callbacks {
        std::mem::take(&mut self.callbacks)
    }

    /// Copy of this tween over different targets, unresolved
    pub(crate) fn retarget(&self, targets: Targets) -> Tween {
        Tween {
            targets,
            tracks: Vec::new(),
            resolved: false,
            started: false,
            completed: false,
            ..self.clone()
        }
    }

    /// Collapse to an instant jump (reduced motion)
    pub(crate) fn reduce_motion(&mut self) {
        if self.essential {
            return;
        }
        self.duration = 0.0;
        self.repeat = RepeatPolicy::ONCE;
    }

    /// Write explicit start values right away
    pub(crate) fn prime(&mut self) {
        if !self.immediate_render {
            return;
        }
        self.resolve();
        for track in self.tracks.iter().filter(|t| t.primes) {
            write_track(track, track.from);
        }
    }

    fn resolve(&mut self) {
        if self.resolved {
            return;
        }
        self.resolved = true;

        for handle in self.targets.iter() {
            let Some(target) = handle.upgrade() else {
                continue;
            };
            let Ok(target_ref) = target.try_borrow() else {
                tracing::warn!("target busy while resolving tween, skipping");
                continue;
            };
            for spec in &self.properties {
                let hint = spec.from.absolute().or_else(|| spec.to.absolute());
                let base = target_ref
                    .get(&spec.property)
                    .unwrap_or_else(|| default_for(&spec.property, hint.as_ref()));
                self.tracks.push(Track {
                    target: handle.clone(),
                    property: spec.property.clone(),
                    from: spec.from.resolve(base),
                    to: spec.to.resolve(base),
                    primes: spec.from.absolute().is_some(),
                });
            }
        }

        tracing::trace!(
            tracks = self.tracks.len(),
            query = self.targets.query_str().unwrap_or(""),
            "tween resolved"
        );
    }

    fn write(&self, eased: f32) {
        for track in &self.tracks {
            write_track(track, track.from.lerp(&track.to, eased));
        }
    }

    /// Render the tween at `time` seconds from its start (delay included)
    pub(crate) fn render(&mut self, time: f64, fired: &mut Vec<Fired>) {
        if time < self.delay {
            if self.started {
                // Rewound past the start
                self.write(0.0);
                self.started = false;
                self.completed = false;
                self.callbacks.update(0.0, fired);
            }
            return;
        }

        if !self.started {
            self.resolve();
            self.started = true;
            self.callbacks.start(fired);
        }

        let cycle = self.repeat.locate(time - self.delay, self.duration);
        let fraction = cycle.fraction(self.duration);
        self.write(self.easing.apply(fraction as f32));
        self.callbacks.update(fraction, fired);

        if cycle.finished {
            if !self.completed {
                self.completed = true;
                self.callbacks.complete(fired);
            }
        } else {
            self.completed = false;
        }
    }
}

fn write_track(track: &Track, value: Value) {
    let Some(target) = track.target.upgrade() else {
        return;
    };
    match target.try_borrow_mut() {
        Ok(mut target) => target.set(&track.property, value),
        Err(_) => tracing::warn!(property = %track.property, "target busy, dropping write"),
    };
}

impl std::fmt::Debug for Tween {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tween")
            .field("targets", &self.targets)
            .field("properties", &self.properties)
            .field("duration", &self.duration)
            .field("delay", &self.delay)
            .field("easing", &self.easing)
            .field("repeat", &self.repeat)
            .finish()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`Tween`]. Configuration errors are reported by [`finish`].
///
/// [`finish`]: TweenBuilder::finish
pub struct TweenBuilder {
    tween: Tween,
    immediate_render: Option<bool>,
    require_match: bool,
    error: Option<AnimationError>,
}

impl TweenBuilder {
    fn new(targets: Targets) -> Self {
        Self {
            tween: Tween::new(targets),
            immediate_render: None,
            require_match: false,
            error: None,
        }
    }

    /// Start value for `property`
    pub fn from(mut self, property: &str, endpoint: impl Into<Endpoint>) -> Self {
        self.tween.spec_mut(property).from = endpoint.into();
        self
    }

    /// End value for `property`
    pub fn to(mut self, property: &str, endpoint: impl Into<Endpoint>) -> Self {
        self.tween.spec_mut(property).to = endpoint.into();
        self
    }

    pub fn from_to(
        self,
        property: &str,
        from: impl Into<Endpoint>,
        to: impl Into<Endpoint>,
    ) -> Self {
        self.from(property, from).to(property, to)
    }

    /// Duration of one iteration in seconds
    pub fn duration(mut self, seconds: f64) -> Self {
        self.tween.duration = seconds;
        self
    }

    /// Delay before the first iteration in seconds
    pub fn delay(mut self, seconds: f64) -> Self {
        self.tween.delay = seconds;
        self
    }

    pub fn ease(mut self, easing: Easing) -> Self {
        self.tween.easing = easing;
        self
    }

    /// Easing by name, e.g. `"power2.out"`
    pub fn ease_named(mut self, name: &str) -> Self {
        match name.parse::<Easing>() {
            Ok(easing) => self.tween.easing = easing,
            Err(err) => {
                self.error.get_or_insert(err);
            }
        }
        self
    }

    pub fn repeat(mut self, repeat: Repeat) -> Self {
        self.tween.repeat.repeat = repeat;
        self
    }

    pub fn yoyo(mut self, yoyo: bool) -> Self {
        self.tween.repeat.yoyo = yoyo;
        self
    }

    /// Keep full motion even under reduced-motion preference
    pub fn essential(mut self) -> Self {
        self.tween.essential = true;
        self
    }

    /// Fail with `InvalidTarget` instead of animating nothing
    pub fn require_match(mut self) -> Self {
        self.require_match = true;
        self
    }

    /// Whether explicit start values are written as soon as the tween is
    /// added. Defaults to on when any start value is given.
    pub fn immediate_render(mut self, immediate: bool) -> Self {
        self.immediate_render = Some(immediate);
        self
    }

    pub fn on_start<F: FnMut() + 'static>(mut self, f: F) -> Self {
        self.tween.callbacks.on_start = Some(callback(f));
        self
    }

    pub fn on_update<F: FnMut(f64) + 'static>(mut self, f: F) -> Self {
        self.tween.callbacks.on_update = Some(progress_callback(f));
        self
    }

    pub fn on_complete<F: FnMut() + 'static>(mut self, f: F) -> Self {
        self.tween.callbacks.on_complete = Some(callback(f));
        self
    }

    /// Validate and produce the tween
    pub fn finish(self) -> Result<Tween> {
        if let Some(err) = self.error {
            return Err(err);
        }

        let mut tween = self.tween;
        if !tween.duration.is_finite() || tween.duration < 0.0 {
            return Err(AnimationError::InvalidDuration(tween.duration));
        }
        if !tween.delay.is_finite() || tween.delay < 0.0 {
            return Err(AnimationError::InvalidDelay(tween.delay));
        }

        if tween.targets.is_empty() {
            let query = tween.targets.query_str().unwrap_or("<none>").to_string();
            if self.require_match {
                return Err(AnimationError::InvalidTarget(query));
            }
            // Nothing to animate: complete on the next frame
            tracing::debug!(query = %query, "tween matched no targets");
            tween.duration = 0.0;
            tween.delay = 0.0;
            tween.repeat = RepeatPolicy::ONCE;
        }

        let has_explicit_from = tween
            .properties
            .iter()
            .any(|spec| spec.from.absolute().is_some());
        tween.immediate_render = self.immediate_render.unwrap_or(has_explicit_from);

        Ok(tween)
    }
}
