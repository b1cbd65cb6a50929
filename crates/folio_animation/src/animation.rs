//! Anything the clock can play

use crate::callback::Fired;
use crate::timeline::Timeline;
use crate::tween::Tween;

/// A tween or a timeline
pub enum Animation {
    Tween(Tween),
    Timeline(Timeline),
}

impl Animation {
    /// Delay plus all iterations (infinite for endless repeats)
    pub fn total_duration(&self) -> f64 {
        match self {
            Animation::Tween(tween) => tween.total_duration(),
            Animation::Timeline(timeline) => timeline.total_duration(),
        }
    }

    /// Delay plus one iteration
    pub fn iteration_span(&self) -> f64 {
        match self {
            Animation::Tween(tween) => tween.iteration_span(),
            Animation::Timeline(timeline) => timeline.iteration_span(),
        }
    }

    /// Length used to map progress onto time: the whole animation when it
    /// ends, a single iteration when it repeats forever
    pub fn progress_span(&self) -> f64 {
        let total = self.total_duration();
        if total.is_finite() {
            total
        } else {
            self.iteration_span()
        }
    }

    pub fn as_tween(&self) -> Option<&Tween> {
        match self {
            Animation::Tween(tween) => Some(tween),
            Animation::Timeline(_) => None,
        }
    }

    pub fn as_timeline(&self) -> Option<&Timeline> {
        match self {
            Animation::Timeline(timeline) => Some(timeline),
            Animation::Tween(_) => None,
        }
    }

    pub(crate) fn render(&mut self, time: f64, fired: &mut Vec<Fired>) {
        match self {
            Animation::Tween(tween) => tween.render(time, fired),
            Animation::Timeline(timeline) => timeline.render(time, fired),
        }
    }

    pub(crate) fn prime(&mut self) {
        match self {
            Animation::Tween(tween) => tween.prime(),
            Animation::Timeline(timeline) => timeline.prime(),
        }
    }

    pub(crate) fn reduce_motion(&mut self) {
        match self {
            Animation::Tween(tween) => tween.reduce_motion(),
            Animation::Timeline(timeline) => timeline.reduce_motion(),
        }
    }
}

impl From<Tween> for Animation {
    fn from(tween: Tween) -> Self {
        Animation::Tween(tween)
    }
}

impl From<Timeline> for Animation {
    fn from(timeline: Timeline) -> Self {
        Animation::Timeline(timeline)
    }
}

impl std::fmt::Debug for Animation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Animation::Tween(tween) => std::fmt::Debug::fmt(tween, f),
            Animation::Timeline(timeline) => std::fmt::Debug::fmt(timeline, f),
        }
    }
}
