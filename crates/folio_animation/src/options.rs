//! Declarative animation options
//!
//! The option bag page scripts pass when creating a tween, as serde types so
//! hosts can load them from configuration or scenario files. Keys are
//! camelCase (`requireMatch`, `scrollTrigger`, `toggleActions`); `ease` is
//! accepted as an alias of `easing`.
//!
//! ```json
//! {
//!   "targets": ".reveal",
//!   "from": { "opacity": 0, "y": "50px" },
//!   "to": { "opacity": 1, "y": "0px" },
//!   "duration": 1.0,
//!   "easing": "power2.out",
//!   "scrollTrigger": { "start": "top 80%", "toggleActions": "play none none reverse" }
//! }
//! ```

use crate::animation::Animation;
use crate::clock::{AnimationId, ClockHandle};
use crate::error::{AnimationError, Result};
use crate::repeat::Repeat;
use crate::scroll::{ScrollMode, ScrollTrigger, ToggleActions};
use crate::stagger::{stagger, Stagger};
use crate::tween::{Endpoint, Tween, TweenBuilder};
use folio_core::{TargetRef, TargetResolver, Targets};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A property endpoint as written in options: a bare number or a string
/// such as `"50px"`, `"#ff0000"` or `"+=20"`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum EndpointOption {
    Number(f32),
    Text(String),
}

impl EndpointOption {
    pub fn endpoint(&self, property: &str) -> Result<Endpoint> {
        match self {
            EndpointOption::Number(n) => Ok(Endpoint::from(*n)),
            EndpointOption::Text(s) => Endpoint::parse(property, s),
        }
    }
}

impl From<f32> for EndpointOption {
    fn from(n: f32) -> Self {
        EndpointOption::Number(n)
    }
}

impl From<&str> for EndpointOption {
    fn from(s: &str) -> Self {
        EndpointOption::Text(s.to_string())
    }
}

/// Repeat as written in options: a count (`-1` for endless) or `"infinite"`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RepeatOption {
    Count(i64),
    Keyword(String),
}

impl Default for RepeatOption {
    fn default() -> Self {
        RepeatOption::Count(0)
    }
}

impl RepeatOption {
    pub fn to_repeat(&self) -> Result<Repeat> {
        match self {
            RepeatOption::Count(n) => Repeat::from_count(*n),
            RepeatOption::Keyword(s) => s.parse(),
        }
    }
}

/// Scroll trigger options
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScrollTriggerOptions {
    /// Trigger element query; defaults to the first animated target
    pub trigger: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub scrub: bool,
    pub toggle_actions: Option<String>,
    /// Play the first time the start is reached and never again
    pub once: bool,
}

impl ScrollTriggerOptions {
    pub fn mode(&self) -> Result<ScrollMode> {
        if self.scrub {
            return Ok(ScrollMode::Scrub);
        }
        if self.once {
            return Ok(ScrollMode::OneShot);
        }
        // Without toggle actions the animation plays once and stays played
        let actions = match &self.toggle_actions {
            Some(actions) => actions.parse()?,
            None => ToggleActions::PlayNone,
        };
        Ok(ScrollMode::Toggle(actions))
    }

    /// Build the trigger request for `trigger`
    pub fn to_trigger(&self, trigger: &TargetRef) -> Result<ScrollTrigger> {
        let mut request = ScrollTrigger::new(trigger, self.mode()?);
        if let Some(start) = &self.start {
            request = request.start(start.parse()?);
        }
        if let Some(end) = &self.end {
            request = request.end(end.parse()?);
        }
        Ok(request)
    }
}

/// Timing and playback options for one tween
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct TweenOptions {
    pub duration: Option<f64>,
    pub delay: f64,
    #[serde(alias = "ease")]
    pub easing: Option<String>,
    pub repeat: RepeatOption,
    pub yoyo: bool,
    /// Seconds between consecutive targets
    pub stagger: Option<f64>,
    pub require_match: bool,
    /// Add without autoplay
    pub paused: bool,
    /// Keep full motion under reduced-motion preference
    pub essential: bool,
    pub scroll_trigger: Option<ScrollTriggerOptions>,
}

impl TweenOptions {
    /// Apply the timing options to a builder
    pub fn apply(&self, mut builder: TweenBuilder) -> Result<TweenBuilder> {
        if let Some(duration) = self.duration {
            builder = builder.duration(duration);
        }
        builder = builder
            .delay(self.delay)
            .repeat(self.repeat.to_repeat()?)
            .yoyo(self.yoyo);
        if let Some(easing) = &self.easing {
            builder = builder.ease_named(easing);
        }
        if self.require_match {
            builder = builder.require_match();
        }
        if self.essential {
            builder = builder.essential();
        }
        Ok(builder)
    }
}

/// Everything needed to create one tween from data
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnimationRequest {
    /// Target query, e.g. `".skill-item"`
    pub targets: String,
    pub from: BTreeMap<String, EndpointOption>,
    pub to: BTreeMap<String, EndpointOption>,
    #[serde(flatten)]
    pub options: TweenOptions,
}

impl AnimationRequest {
    /// Build the tween (or staggered timeline) this request describes
    pub fn build(&self, resolver: &dyn TargetResolver) -> Result<Animation> {
        let mut builder = Tween::build(Targets::query(resolver, &self.targets));
        for (property, endpoint) in &self.from {
            builder = builder.from(property, endpoint.endpoint(property)?);
        }
        for (property, endpoint) in &self.to {
            builder = builder.to(property, endpoint.endpoint(property)?);
        }
        let tween = self.options.apply(builder)?.finish()?;

        Ok(match self.options.stagger {
            Some(interval) if interval > 0.0 && tween.targets().len() > 1 => {
                stagger(tween, &Stagger::new(interval)).into()
            }
            _ => tween.into(),
        })
    }

    fn trigger(&self, resolver: &dyn TargetResolver) -> Result<Option<ScrollTrigger>> {
        let Some(options) = &self.options.scroll_trigger else {
            return Ok(None);
        };
        let query = options.trigger.as_deref().unwrap_or(&self.targets);
        match resolver.resolve(query).first() {
            Some(element) => options.to_trigger(element).map(Some),
            None if self.options.require_match => {
                Err(AnimationError::InvalidTarget(query.to_string()))
            }
            None => {
                tracing::debug!(query, "scroll trigger matched nothing, playing unbound");
                Ok(None)
            }
        }
    }
}

impl ClockHandle {
    /// Create, schedule and (optionally) scroll-bind an animation described
    /// by `request`.
    ///
    /// Nothing is scheduled when the request is invalid.
    pub fn animate(
        &self,
        resolver: &dyn TargetResolver,
        request: &AnimationRequest,
    ) -> Result<AnimationId> {
        let animation = request.build(resolver)?;
        let trigger = request.trigger(resolver)?;
        // Adding primes explicit `from` values, so reject bad ranges first
        if let Some(trigger) = &trigger {
            trigger.validate(&self.viewport())?;
        }

        let id = if request.options.paused {
            self.add_paused(animation)
        } else {
            self.add(animation)
        };

        if let Some(trigger) = trigger {
            if let Err(err) = self.attach_scroll(id, trigger) {
                self.kill(id);
                return Err(err);
            }
        }
        Ok(id)
    }
}
