//! Stagger sequencing
//!
//! Expands one tween definition over N targets into N single-target tweens
//! with incremental delays, collected into a timeline so the group can be
//! scheduled, scrubbed, or killed as one unit. Children keep the input order.

use crate::timeline::{Position, Timeline};
use crate::tween::Tween;
use std::rc::Rc;

/// Which end of the sequence starts first
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StaggerFrom {
    #[default]
    Start,
    End,
    /// Middle elements first, spreading outward
    Center,
}

type DelayFn = Rc<dyn Fn(usize, usize) -> f64>;

/// Per-index delay rule
#[derive(Clone)]
pub struct Stagger {
    interval: f64,
    from: StaggerFrom,
    delay_fn: Option<DelayFn>,
}

impl Stagger {
    /// Linear stagger: `index * interval`
    pub fn new(interval: f64) -> Self {
        Self {
            interval: if interval.is_finite() { interval.max(0.0) } else { 0.0 },
            from: StaggerFrom::Start,
            delay_fn: None,
        }
    }

    /// Custom delay: `f(index, count)` seconds
    pub fn with_fn<F: Fn(usize, usize) -> f64 + 'static>(f: F) -> Self {
        Self {
            interval: 0.0,
            from: StaggerFrom::Start,
            delay_fn: Some(Rc::new(f)),
        }
    }

    pub fn origin(mut self, from: StaggerFrom) -> Self {
        self.from = from;
        self
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    /// Extra delay for the element at `index` out of `count`
    pub fn delay_for(&self, index: usize, count: usize) -> f64 {
        if let Some(f) = &self.delay_fn {
            let delay = f(index, count);
            return if delay.is_finite() { delay.max(0.0) } else { 0.0 };
        }

        let steps = match self.from {
            StaggerFrom::Start => index as f64,
            StaggerFrom::End => count.saturating_sub(index + 1) as f64,
            StaggerFrom::Center => {
                let middle = count.saturating_sub(1) as f64 / 2.0;
                (index as f64 - middle).abs()
            }
        };
        steps * self.interval
    }
}

impl From<f64> for Stagger {
    fn from(interval: f64) -> Self {
        Stagger::new(interval)
    }
}

impl std::fmt::Debug for Stagger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Stagger")
            .field("interval", &self.interval)
            .field("from", &self.from)
            .field("custom", &self.delay_fn.is_some())
            .finish()
    }
}

/// One tween per target of `base`, each delayed by `base.delay() + stagger`.
///
/// The base tween's callbacks move to the returned timeline, so `on_complete`
/// fires once for the whole group.
pub fn stagger(mut base: Tween, stagger: &Stagger) -> Timeline {
    let callbacks = base.take_callbacks();
    let targets = base.targets().split();
    let count = targets.len();

    let mut timeline = Timeline::new();
    timeline.set_callbacks(callbacks);
    for (index, single) in targets.into_iter().enumerate() {
        let mut tween = base.retarget(single);
        tween.set_delay(base.delay() + stagger.delay_for(index, count));
        timeline.add(tween, Position::Absolute(0.0));
    }

    tracing::debug!(count, interval = stagger.interval(), "stagger expanded");
    timeline
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Animation;
    use crate::timeline::TimelineChild;
    use folio_core::{Node, TargetRef, Targets};
    use std::cell::RefCell;

    fn delays(timeline: &Timeline) -> Vec<f64> {
        timeline
            .children()
            .filter_map(|child| match child {
                TimelineChild::Animation(Animation::Tween(tween)) => Some(tween.delay()),
                _ => None,
            })
            .collect()
    }

    fn targets(n: usize) -> Vec<TargetRef> {
        (0..n)
            .map(|i| Rc::new(RefCell::new(Node::new(format!("t{i}")))) as TargetRef)
            .collect()
    }

    #[test]
    fn test_linear_delays_in_input_order() {
        let list = targets(3);
        let base = Tween::build(&list)
            .from("opacity", 0.0)
            .duration(0.5)
            .finish()
            .unwrap();
        let timeline = stagger(base, &Stagger::new(0.1));
        assert_eq!(delays(&timeline), vec![0.0, 0.1, 0.2]);
        assert_eq!(timeline.len(), 3);
    }

    #[test]
    fn test_base_delay_is_added() {
        let list = targets(2);
        let base = Tween::build(&list)
            .to("y", 0.0)
            .delay(0.25)
            .finish()
            .unwrap();
        let timeline = stagger(base, &Stagger::new(0.5));
        assert_eq!(delays(&timeline), vec![0.25, 0.75]);
    }

    #[test]
    fn test_from_end_and_center() {
        let end = Stagger::new(1.0).origin(StaggerFrom::End);
        assert_eq!(
            (0..3).map(|i| end.delay_for(i, 3)).collect::<Vec<_>>(),
            vec![2.0, 1.0, 0.0]
        );
        let center = Stagger::new(1.0).origin(StaggerFrom::Center);
        assert_eq!(
            (0..3).map(|i| center.delay_for(i, 3)).collect::<Vec<_>>(),
            vec![1.0, 0.0, 1.0]
        );
    }

    #[test]
    fn test_custom_delay_fn() {
        let custom = Stagger::with_fn(|index, _| index as f64 * 0.5);
        assert_eq!(custom.delay_for(3, 4), 1.5);
    }

    #[test]
    fn test_empty_targets_give_empty_timeline() {
        let base = Tween::build(Targets::new())
            .to("opacity", 1.0)
            .finish()
            .unwrap();
        let timeline = stagger(base, &Stagger::new(0.1));
        assert!(timeline.is_empty());
        assert_eq!(timeline.total_duration(), 0.0);
    }
}
